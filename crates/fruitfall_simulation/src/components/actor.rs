//! Базовые компоненты акторов: identity, Health, Player

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Тип врага (ключ для scoring, templates, respawn)
///
/// Строковый ID как в конфиге уровня: "TomatoEnemy", "FlyingBanana", ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect)]
#[serde(transparent)]
pub struct EnemyTypeId(pub String);

impl EnemyTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EnemyTypeId {
    fn default() -> Self {
        Self::new("DefaultEnemy")
    }
}

impl fmt::Display for EnemyTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EnemyTypeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Handle агента для внешних collaborators (kill tracker, логи)
///
/// `id` уникален в пределах симуляции, respawn получает новый id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub struct AgentHandle {
    pub id: u64,
    pub enemy_type: EnemyTypeId,
}

impl fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.enemy_type, self.id)
    }
}

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max (проверяется после каждого damage/heal)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Вычитаем без floor, клампим только после death check (см. CombatModel)
    pub fn subtract_unclamped(&mut self, amount: f32) {
        self.current -= amount;
    }

    pub fn clamp(&mut self) {
        self.current = self.current.clamp(0.0, self.max);
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.subtract_unclamped(amount.max(0.0));
        self.clamp();
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }
}

/// Маркер игрока (цель для всех агентов)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(PlayerVitals)]
pub struct Player;

/// Здоровье игрока — цель contact/projectile урона
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerVitals {
    pub health: Health,
}

impl PlayerVitals {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: Health::new(max_health),
        }
    }
}
