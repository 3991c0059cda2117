//! Perception: "видим ли цель и как далеко она".
//!
//! Без кэша: один запрос на агента за тик.

use bevy::prelude::*;

use crate::world::{ObstacleMask, RayCaster};

/// Результат восприятия цели за один тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub target: Vec3,
    pub distance: f32,
    pub line_of_sight: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    mask: ObstacleMask,
}

impl Perception {
    pub fn new(mask: ObstacleMask) -> Self {
        Self { mask }
    }

    pub fn mask(&self) -> ObstacleMask {
        self.mask
    }

    /// Луч agent → target; любое попадание ближе цели блокирует обзор
    pub fn has_line_of_sight(&self, world: &dyn RayCaster, from: Vec3, to: Vec3) -> bool {
        let offset = to - from;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return true;
        }

        match world.cast_ray(from, offset, distance, self.mask) {
            Some(hit) => hit.distance >= distance,
            None => true,
        }
    }

    /// Нет цели → бесконечность (FSM падает обратно в wander)
    pub fn distance_to(&self, from: Vec3, target: Option<Vec3>) -> f32 {
        target.map_or(f32::INFINITY, |target| from.distance(target))
    }

    pub fn sense(&self, world: &dyn RayCaster, from: Vec3, target: Option<Vec3>) -> Option<Sighting> {
        let target = target?;
        Some(Sighting {
            target,
            distance: self.distance_to(from, Some(target)),
            line_of_sight: self.has_line_of_sight(world, from, target),
        })
    }
}

impl Default for Perception {
    fn default() -> Self {
        Self::new(ObstacleMask::default())
    }
}
