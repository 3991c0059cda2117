//! ScoreBoard — единственный аккумулятор очков уровня.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ScoringService;
use crate::components::EnemyTypeId;

#[derive(Debug, Default)]
struct ScoreState {
    points: u64,
    type_values: HashMap<EnemyTypeId, u32>,
}

#[derive(Debug)]
pub struct ScoreBoard {
    state: Mutex<ScoreState>,
    default_award: u32,
}

impl ScoreBoard {
    /// Награда за незарегистрированный тип врага
    pub const DEFAULT_AWARD: u32 = 50;

    pub fn new() -> Self {
        Self::with_default_award(Self::DEFAULT_AWARD)
    }

    pub fn with_default_award(default_award: u32) -> Self {
        Self {
            state: Mutex::new(ScoreState::default()),
            default_award,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_points(&self) -> u64 {
        self.lock().points
    }

    pub fn has_enough_points(&self, amount: u64) -> bool {
        self.current_points() >= amount
    }

    /// Списывает очки; `false` если не хватает (баланс не меняется)
    pub fn spend_points(&self, amount: u64) -> bool {
        let mut state = self.lock();
        if state.points < amount {
            return false;
        }
        state.points -= amount;
        true
    }

    pub fn value_for(&self, enemy_type: &EnemyTypeId) -> u32 {
        self.lock()
            .type_values
            .get(enemy_type)
            .copied()
            .unwrap_or(self.default_award)
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringService for ScoreBoard {
    fn add_points_for_type(&self, enemy_type: &EnemyTypeId) -> u32 {
        let mut state = self.lock();
        let award = state
            .type_values
            .get(enemy_type)
            .copied()
            .unwrap_or(self.default_award);
        state.points += u64::from(award);
        crate::log(&format!("🏆 +{} points for {} (total {})", award, enemy_type, state.points));
        award
    }

    fn add_points(&self, amount: u32) {
        self.lock().points += u64::from(amount);
    }

    fn register_type_value(&self, enemy_type: &EnemyTypeId, amount: u32) {
        self.lock().type_values.insert(enemy_type.clone(), amount);
    }
}
