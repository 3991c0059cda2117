//! Capability dispatch для урона.
//!
//! Вместо цепочки "это игрок? это ловушка? это пуля?" каждая сущность,
//! которая может наносить или получать урон, реализует маленький trait.
//! `resolve_contacts` просто спрашивает источник и применяет к жертве.

use bevy::prelude::*;

use super::model::DamageOutcome;
use crate::components::PlayerVitals;

/// Кто получает урон при контакте
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VictimKind {
    Player,
    Agent,
}

/// Может нанести урон при контакте
pub trait DamageSource {
    /// `None` — этой жертве урона нет
    fn contact_damage(&self, victim: VictimKind) -> Option<f32>;
}

/// Может получить урон
pub trait Damageable {
    fn apply_damage(&mut self, amount: f32) -> DamageOutcome;
    fn is_alive(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum HazardKind {
    /// Ловушка уровня (шипы, пресс) — ранит агентов
    Trap,
    /// Оружие игрока (melee hitbox) — ранит агентов
    Weapon,
    /// Снаряд врага — ранит игрока
    Projectile,
}

/// Неживой источник урона
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hazard {
    pub kind: HazardKind,
    pub damage: f32,
}

impl Hazard {
    pub fn trap(damage: f32) -> Self {
        Self {
            kind: HazardKind::Trap,
            damage,
        }
    }

    pub fn weapon(damage: f32) -> Self {
        Self {
            kind: HazardKind::Weapon,
            damage,
        }
    }

    pub fn projectile(damage: f32) -> Self {
        Self {
            kind: HazardKind::Projectile,
            damage,
        }
    }
}

impl DamageSource for Hazard {
    fn contact_damage(&self, victim: VictimKind) -> Option<f32> {
        match (self.kind, victim) {
            (HazardKind::Trap | HazardKind::Weapon, VictimKind::Agent) => Some(self.damage),
            (HazardKind::Projectile, VictimKind::Player) => Some(self.damage),
            _ => None,
        }
    }
}

impl Damageable for PlayerVitals {
    fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.health.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        self.health.take_damage(amount);
        if self.health.is_alive() {
            DamageOutcome::Hurt
        } else {
            crate::log_info("☠️ Player died");
            DamageOutcome::Killed
        }
    }

    fn is_alive(&self) -> bool {
        self.health.is_alive()
    }
}
