//! Default collaborators-очереди: агенты кладут intent, ECS системы разбирают.

use bevy::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::{LootSpawner, RespawnPolicy, TargetProvider};
use crate::config::AgentTemplate;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Позиция игрока, публикуемая `track_player_target`
#[derive(Debug, Clone, Default)]
pub struct SharedTarget {
    position: Arc<RwLock<Option<Vec3>>>,
}

impl SharedTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, position: Option<Vec3>) {
        *self.position.write().unwrap_or_else(PoisonError::into_inner) = position;
    }
}

impl TargetProvider for SharedTarget {
    fn target_position(&self) -> Option<Vec3> {
        *self.position.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingRespawn {
    pub template: AgentTemplate,
    pub position: Vec3,
    pub yaw: f32,
    pub remaining: f32,
}

#[derive(Debug, Default)]
pub struct RespawnQueue {
    pending: Mutex<Vec<PendingRespawn>>,
}

impl RespawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Отсчитывает таймеры, возвращает готовые к спавну (в порядке постановки)
    pub fn advance(&self, delta: f32) -> Vec<PendingRespawn> {
        let mut pending = lock(&self.pending);
        let mut ready = Vec::new();

        pending.retain_mut(|respawn| {
            respawn.remaining -= delta;
            if respawn.remaining <= 0.0 {
                ready.push(respawn.clone());
                false
            } else {
                true
            }
        });

        ready
    }
}

impl RespawnPolicy for RespawnQueue {
    fn schedule_respawn(&self, template: &AgentTemplate, position: Vec3, yaw: f32, delay: f32) {
        crate::log(&format!(
            "⏳ Respawn of {} scheduled in {:.1}s at {:?}",
            template.enemy_type, delay, position
        ));
        lock(&self.pending).push(PendingRespawn {
            template: template.clone(),
            position,
            yaw,
            remaining: delay,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LootDrop {
    pub item: String,
    pub position: Vec3,
}

#[derive(Debug, Default)]
pub struct LootQueue {
    drops: Mutex<Vec<LootDrop>>,
}

impl LootQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<LootDrop> {
        std::mem::take(&mut *lock(&self.drops))
    }
}

impl LootSpawner for LootQueue {
    fn spawn(&self, item: &str, position: Vec3) {
        lock(&self.drops).push(LootDrop {
            item: item.to_string(),
            position,
        });
    }
}
