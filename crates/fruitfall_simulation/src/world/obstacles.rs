//! Obstacle field + ray casts (line-of-sight, sensor fan, collision clamp).

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Collision layers для ray casts
///
/// Маска проверяется побитово: луч видит obstacle если `mask & layer != 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
#[serde(transparent)]
pub struct ObstacleMask(pub u32);

impl ObstacleMask {
    pub const NONE: Self = Self(0);
    /// Стены, мебель, статичная геометрия
    pub const ENVIRONMENT: Self = Self(1 << 0);
    /// Ловушки (наносят урон при контакте, но тоже блокируют движение)
    pub const TRAPS: Self = Self(1 << 1);
    /// Другие акторы
    pub const ACTORS: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for ObstacleMask {
    fn default() -> Self {
        Self(Self::ENVIRONMENT.0 | Self::TRAPS.0)
    }
}

impl std::ops::BitOr for ObstacleMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Результат ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Расстояние от origin до точки попадания
    pub distance: f32,
    pub point: Vec3,
    pub layer: ObstacleMask,
}

/// Sensor query interface.
///
/// `direction` не обязан быть нормализован, нулевой вектор → `None`.
pub trait RayCaster {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ObstacleMask,
    ) -> Option<RayHit>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    Box { center: Vec3, half_size: Vec3 },
    Sphere { center: Vec3, radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub layer: ObstacleMask,
}

impl Obstacle {
    pub fn wall(center: Vec3, half_size: Vec3) -> Self {
        Self {
            shape: ObstacleShape::Box { center, half_size },
            layer: ObstacleMask::ENVIRONMENT,
        }
    }

    pub fn pillar(center: Vec3, radius: f32) -> Self {
        Self {
            shape: ObstacleShape::Sphere { center, radius },
            layer: ObstacleMask::ENVIRONMENT,
        }
    }

    pub fn with_layer(mut self, layer: ObstacleMask) -> Self {
        self.layer = layer;
        self
    }

    fn intersection(&self, ray: &RayCast3d) -> Option<f32> {
        match self.shape {
            ObstacleShape::Box { center, half_size } => {
                ray.aabb_intersection_at(&Aabb3d::new(center, half_size))
            }
            ObstacleShape::Sphere { center, radius } => {
                ray.sphere_intersection_at(&BoundingSphere::new(center, radius))
            }
        }
    }
}

/// Статичная геометрия уровня (headless замена physics world)
///
/// Пустое поле — ничего не блокирует.
#[derive(Resource, Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn add(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

impl RayCaster for ObstacleField {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ObstacleMask,
    ) -> Option<RayHit> {
        if max_distance <= 0.0 {
            return None;
        }
        let Ok(dir) = Dir3::new(direction) else {
            return None;
        };
        let ray = RayCast3d::new(origin, dir, max_distance);

        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.layer.intersects(mask))
            .filter_map(|obstacle| {
                obstacle
                    .intersection(&ray)
                    .map(|distance| (distance, obstacle.layer))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(distance, layer)| RayHit {
                distance,
                point: origin + *dir * distance,
                layer,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at_x(x: f32) -> ObstacleField {
        ObstacleField::new(vec![Obstacle::wall(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(0.5, 2.0, 5.0),
        )])
    }

    #[test]
    fn test_ray_hits_nearest_face() {
        let field = wall_at_x(5.0);
        let hit = field
            .cast_ray(Vec3::ZERO, Vec3::X, 10.0, ObstacleMask::ALL)
            .expect("wall must block the ray");

        assert!((hit.distance - 4.5).abs() < 1e-4, "distance = {}", hit.distance);
        assert!((hit.point.x - 4.5).abs() < 1e-4);
        assert_eq!(hit.layer, ObstacleMask::ENVIRONMENT);
    }

    #[test]
    fn test_ray_respects_max_distance() {
        let field = wall_at_x(5.0);
        assert!(field.cast_ray(Vec3::ZERO, Vec3::X, 3.0, ObstacleMask::ALL).is_none());
    }

    #[test]
    fn test_ray_ignores_masked_layers() {
        let field = wall_at_x(5.0);
        assert!(field.cast_ray(Vec3::ZERO, Vec3::X, 10.0, ObstacleMask::TRAPS).is_none());
    }

    #[test]
    fn test_zero_direction_never_hits() {
        let field = wall_at_x(1.0);
        assert!(field.cast_ray(Vec3::ZERO, Vec3::ZERO, 10.0, ObstacleMask::ALL).is_none());
    }

    #[test]
    fn test_nearest_of_several_obstacles() {
        let mut field = wall_at_x(8.0);
        field.add(Obstacle::pillar(Vec3::new(3.0, 0.0, 0.0), 1.0));

        let hit = field
            .cast_ray(Vec3::ZERO, Vec3::X, 20.0, ObstacleMask::ALL)
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-4);
    }
}
