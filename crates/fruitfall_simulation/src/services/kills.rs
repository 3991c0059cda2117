//! KillCounter — счётчик живых врагов + victory flag.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::KillTracker;
use crate::components::AgentHandle;

#[derive(Debug, Default)]
struct KillState {
    /// Id живых агентов; смерть удаляет id, так что сет не растёт с респавнами
    live: HashSet<u64>,
    total_kills: u32,
    victory: bool,
}

#[derive(Debug, Default)]
pub struct KillCounter {
    state: Mutex<KillState>,
    victory_enabled: bool,
}

impl KillCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Victory поднимается, когда live count падает до нуля
    pub fn with_victory() -> Self {
        Self {
            state: Mutex::new(KillState::default()),
            victory_enabled: true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, KillState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register_spawn(&self, agent: &AgentHandle) {
        if !self.lock().live.insert(agent.id) {
            crate::log_warning(&format!("KillCounter: {} registered twice", agent));
        }
    }

    pub fn live_count(&self) -> u32 {
        self.lock().live.len() as u32
    }

    pub fn total_kills(&self) -> u32 {
        self.lock().total_kills
    }

    pub fn is_victory(&self) -> bool {
        self.lock().victory
    }
}

impl KillTracker for KillCounter {
    fn report_death(&self, agent: &AgentHandle) {
        let mut state = self.lock();
        if !state.live.remove(&agent.id) {
            crate::log_warning(&format!("KillCounter: death report for unknown or dead {}", agent));
            return;
        }

        state.total_kills += 1;

        if self.victory_enabled && state.live.is_empty() && !state.victory {
            state.victory = true;
            crate::log_info("🎉 All enemies defeated — victory!");
        }
    }
}
