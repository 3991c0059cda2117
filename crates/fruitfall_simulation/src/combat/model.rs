//! CombatModel — здоровье агента и death check.

use crate::components::Health;

/// Результат одного вызова `take_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// amount ≤ 0, не число, или агент уже мёртв
    Ignored,
    Hurt,
    /// Этот удар убил агента (ровно один раз за жизнь)
    Killed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatModel {
    health: Health,
    dead: bool,
}

impl CombatModel {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: Health::new(max_health),
            dead: false,
        }
    }

    pub fn health(&self) -> f32 {
        self.health.current
    }

    pub fn max_health(&self) -> f32 {
        self.health.max
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }
        if !amount.is_finite() || amount <= 0.0 {
            crate::log_warning(&format!("⚠️ Ignoring invalid damage amount {}", amount));
            return DamageOutcome::Ignored;
        }

        // Вычитаем без floor, death check после
        self.health.subtract_unclamped(amount);
        if self.health.current <= 0.0 {
            self.dead = true;
            self.health.clamp();
            return DamageOutcome::Killed;
        }
        DamageOutcome::Hurt
    }

    /// Возвращает фактически восстановленное количество
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.dead || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health.current;
        self.health.heal(amount);
        self.health.current - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_heavy_hits_clamp_to_zero() {
        let mut combat = CombatModel::new(100.0);

        assert_eq!(combat.take_damage(60.0), DamageOutcome::Hurt);
        assert_eq!(combat.health(), 40.0);

        assert_eq!(combat.take_damage(60.0), DamageOutcome::Killed);
        assert_eq!(combat.health(), 0.0);
        assert!(!combat.is_alive());
    }

    #[test]
    fn test_damage_after_death_is_ignored() {
        let mut combat = CombatModel::new(10.0);
        assert_eq!(combat.take_damage(10.0), DamageOutcome::Killed);
        assert_eq!(combat.take_damage(5.0), DamageOutcome::Ignored);
        assert_eq!(combat.health(), 0.0);
    }

    #[test]
    fn test_invalid_amounts_are_noops() {
        let mut combat = CombatModel::new(100.0);
        assert_eq!(combat.take_damage(0.0), DamageOutcome::Ignored);
        assert_eq!(combat.take_damage(-5.0), DamageOutcome::Ignored);
        assert_eq!(combat.take_damage(f32::NAN), DamageOutcome::Ignored);
        assert_eq!(combat.health(), 100.0);
    }

    #[test]
    fn test_heal_clamps_and_dead_cannot_heal() {
        let mut combat = CombatModel::new(100.0);
        combat.take_damage(30.0);
        assert_eq!(combat.heal(50.0), 30.0);
        assert_eq!(combat.health(), 100.0);

        combat.take_damage(200.0);
        assert_eq!(combat.heal(50.0), 0.0);
        assert_eq!(combat.health(), 0.0);
    }
}
