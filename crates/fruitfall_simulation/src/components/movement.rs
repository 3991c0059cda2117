//! Movement компоненты: поза агента, конвертация yaw ↔ direction

use bevy::prelude::*;

/// Поза агента в мире
///
/// Только горизонтальный поворот (yaw): агенты всегда стоят вертикально.
/// Yaw = 0 смотрит в -Z (Bevy forward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct Pose {
    pub position: Vec3,
    /// Радианы, вокруг оси Y
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    pub fn forward(&self) -> Vec3 {
        direction_from_yaw(self.yaw)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }
}

/// Горизонтальная проекция направления (y = 0), normalized или ZERO
pub fn flatten(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero()
}

pub fn direction_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// `None` для нулевого/вертикального направления
pub fn yaw_from_direction(direction: Vec3) -> Option<f32> {
    let flat = flatten(direction);
    if flat == Vec3::ZERO {
        None
    } else {
        Some((-flat.x).atan2(-flat.z))
    }
}

/// Повернуть horizontal direction на угол (радианы) вокруг Y
pub fn rotate_horizontal(direction: Vec3, angle: f32) -> Vec3 {
    flatten(Quat::from_rotation_y(angle) * flatten(direction))
}

/// Кратчайшая разница углов в диапазоне [-π, π]
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_yaw_direction_roundtrip_axes() {
        assert!(direction_from_yaw(0.0).abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!(direction_from_yaw(FRAC_PI_2).abs_diff_eq(Vec3::NEG_X, 1e-5));

        let yaw = yaw_from_direction(Vec3::X).unwrap();
        assert!(direction_from_yaw(yaw).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_pose_rotation_matches_forward() {
        let pose = Pose::new(Vec3::ZERO, 1.2);
        let rotated = pose.rotation() * Vec3::NEG_Z;
        assert!(rotated.abs_diff_eq(pose.forward(), 1e-5));
    }

    #[test]
    fn test_flatten_drops_pitch() {
        let flat = flatten(Vec3::new(1.0, 5.0, 0.0));
        assert!(flat.abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(yaw_from_direction(Vec3::Y), None);
    }

    #[test]
    fn test_shortest_angle_wraps() {
        let diff = shortest_angle(3.0, -3.0);
        assert!((diff - (std::f32::consts::TAU - 6.0)).abs() < 1e-5);
        assert!((shortest_angle(0.5, 0.25) + 0.25).abs() < 1e-6);
    }
}
