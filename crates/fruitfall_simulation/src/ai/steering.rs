//! Steering: локальный obstacle avoidance + stuck detection.
//!
//! Никакого глобального планировщика: primary луч вдоль желаемого направления,
//! при блокировке — веер из N лучей по кругу, greedy выбор лучшего.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::components::{flatten, rotate_horizontal, shortest_angle, yaw_from_direction};
use crate::config::{SensorConfig, StuckConfig};
use crate::world::{ObstacleMask, RayCaster};

/// Углы для Reroute (градусы), в порядке предпочтения
const REROUTE_OFFSETS_DEGREES: [f32; 6] = [30.0, -30.0, 60.0, -60.0, 90.0, -90.0];

/// Состояние stuck detection между сэмплами
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StuckState {
    pub last_position: Vec3,
    pub check_timer: f32,
    pub is_stuck: bool,
    /// Скорость, скомандованная на последнем тике
    pub last_commanded_speed: f32,
    /// В этом окне был хотя бы один тик без движения (остановились намеренно)
    pub held_in_window: bool,
}

#[derive(Debug, Clone)]
pub struct Steering {
    sensors: SensorConfig,
    stuck_config: StuckConfig,
    mask: ObstacleMask,
    stuck: StuckState,
}

impl Steering {
    pub fn new(sensors: SensorConfig, stuck_config: StuckConfig, mask: ObstacleMask, position: Vec3) -> Self {
        Self {
            sensors,
            stuck_config,
            mask,
            stuck: StuckState {
                last_position: position,
                ..Default::default()
            },
        }
    }

    pub fn sensors(&self) -> &SensorConfig {
        &self.sensors
    }

    pub fn stuck_state(&self) -> &StuckState {
        &self.stuck
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck.is_stuck
    }

    /// Скорректированное направление (горизонтальное, normalized или ZERO)
    pub fn compute_direction(
        &self,
        world: &dyn RayCaster,
        origin: Vec3,
        desired: Vec3,
        rng: &mut impl Rng,
    ) -> Vec3 {
        let desired = flatten(desired);
        if desired == Vec3::ZERO {
            return Vec3::ZERO;
        }

        let range = self.sensors.detection_range;
        let mut chosen = match world.cast_ray(origin, desired, range, self.mask) {
            None => desired,
            Some(_) => self.best_fan_direction(world, origin, desired),
        };

        // Стена прямо перед носом → боковой jitter (ломает deadlock у параллельных стен)
        if self.sensors.lateral_jitter > 0.0
            && world
                .cast_ray(origin, chosen, self.sensors.wall_check_distance, self.mask)
                .is_some()
        {
            let lateral = Vec3::Y.cross(chosen);
            let jitter = rng.gen_range(-self.sensors.lateral_jitter..=self.sensors.lateral_jitter);
            let jittered = flatten(chosen + lateral * jitter);
            if jittered != Vec3::ZERO {
                chosen = jittered;
            }
        }

        chosen
    }

    /// Веер лучей по кругу; score = clearance + alignment bias
    fn best_fan_direction(&self, world: &dyn RayCaster, origin: Vec3, desired: Vec3) -> Vec3 {
        let range = self.sensors.detection_range.max(f32::EPSILON);
        let rays = self.sensors.ray_count.max(1);

        let mut best = desired;
        let mut best_score = f32::NEG_INFINITY;
        for i in 0..rays {
            let angle = TAU * i as f32 / rays as f32;
            let candidate = rotate_horizontal(desired, angle);
            let clearance = world
                .cast_ray(origin, candidate, range, self.mask)
                .map_or(range, |hit| hit.distance);

            let score = clearance / range + self.sensors.alignment_bias * candidate.dot(desired);
            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }
        best
    }

    /// Recovery heading к `toward`: лучший clearance среди ±30/±60/±90
    pub fn reroute_heading(&self, world: &dyn RayCaster, origin: Vec3, toward: Vec3, fallback: Vec3) -> Vec3 {
        let mut base = flatten(toward - origin);
        if base == Vec3::ZERO {
            base = flatten(fallback);
        }
        if base == Vec3::ZERO {
            return Vec3::ZERO;
        }

        let range = self.sensors.detection_range;
        let mut best = base;
        let mut best_clearance = f32::NEG_INFINITY;
        for degrees in REROUTE_OFFSETS_DEGREES {
            let candidate = rotate_horizontal(base, degrees.to_radians());
            let clearance = world
                .cast_ray(origin, candidate, range, self.mask)
                .map_or(range, |hit| hit.distance);
            if clearance > best_clearance {
                best_clearance = clearance;
                best = candidate;
            }
        }
        best
    }

    /// Displacement step: упираемся в препятствие с учётом body_radius
    pub fn step(&self, world: &dyn RayCaster, position: Vec3, direction: Vec3, distance: f32) -> Vec3 {
        let direction = flatten(direction);
        if direction == Vec3::ZERO || distance <= 0.0 {
            return position;
        }

        let radius = self.sensors.body_radius;
        let allowed = world
            .cast_ray(position, direction, distance + radius, self.mask)
            .map_or(distance, |hit| (hit.distance - radius).clamp(0.0, distance));

        position + direction * allowed
    }

    /// Сэмплирует позицию раз в `sample_interval`.
    ///
    /// Stuck только если на тике сэмпла скорость ненулевая и за всё окно
    /// агент ни разу не останавливался сам. Возвращает `true`, если в этом
    /// вызове был сделан сэмпл.
    pub fn update_stuck(&mut self, position: Vec3, commanded_speed: f32, delta: f32) -> bool {
        let min_speed = self.stuck_config.min_speed;
        self.stuck.last_commanded_speed = commanded_speed;
        self.stuck.held_in_window |= commanded_speed <= min_speed;
        self.stuck.check_timer += delta;

        if self.stuck.check_timer < self.stuck_config.sample_interval {
            return false;
        }

        let offset = position - self.stuck.last_position;
        let displacement = Vec2::new(offset.x, offset.z).length();
        let moving = self.stuck.last_commanded_speed > min_speed && !self.stuck.held_in_window;

        self.stuck.is_stuck = moving && displacement < self.stuck_config.threshold;
        self.stuck.last_position = position;
        self.stuck.check_timer = 0.0;
        self.stuck.held_in_window = false;
        true
    }

    /// Новое окно сэмплирования с текущей позиции
    pub fn reset_stuck(&mut self, position: Vec3) {
        self.stuck = StuckState {
            last_position: position,
            ..Default::default()
        };
    }
}

/// Плавный поворот yaw к направлению движения (только горизонталь)
pub fn rotate_towards(current_yaw: f32, direction: Vec3, turn_rate: f32, delta: f32) -> f32 {
    let Some(target_yaw) = yaw_from_direction(direction) else {
        return current_yaw;
    };

    let diff = shortest_angle(current_yaw, target_yaw);
    let max_step = (turn_rate * delta).max(0.0);
    let yaw = if diff.abs() <= max_step {
        target_yaw
    } else {
        current_yaw + max_step * diff.signum()
    };

    // Держим yaw в [-π, π]
    shortest_angle(0.0, yaw)
}
