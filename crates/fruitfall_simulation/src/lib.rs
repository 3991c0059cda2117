//! Fruitfall Simulation Core
//!
//! Headless симуляция врагов на Bevy 0.16: навигация, aggro FSM, combat.
//!
//! Слои:
//! - core (ai/, combat/, agent::controller) — обычные структуры, без ECS
//! - host (plugins + systems) — гоняет контроллеры в FixedUpdate
//! - collaborators (services/) — scoring, kills, audio, UI, loot, respawn

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

pub mod agent;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod services;
pub mod world;

pub use agent::{spawn_agent, spawn_agent_in_world, AgentController, AgentIdAllocator, Lifecycle, TickReport};
pub use ai::{AIPlugin, BehaviorState, ProjectileFired};
pub use combat::{
    AgentDied, AgentRespawned, CombatPlugin, ContactEvent, DamageAgent, DamageOutcome, Damageable, DamageSource,
    Hazard, LootDropped, VictimKind,
};
pub use components::*;
pub use config::{AgentTemplate, ConfigError, TemplateLibrary};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use services::{AgentServices, SimulationServices};
pub use world::{Obstacle, ObstacleField, ObstacleMask, RayCaster};

/// Fixed tick rate симуляции
pub const TICK_HZ: f64 = 60.0;

/// Фазы fixed tick (строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Позиция цели и прочие входы мира
    Sense,
    /// AgentController::tick
    Act,
    /// Урон, контакты
    Resolve,
    /// Despawn, respawn, loot, transforms
    Cleanup,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ));

        // Seed мог выставить хост (create_headless_app) — не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Sense,
                SimulationSet::Act,
                SimulationSet::Resolve,
                SimulationSet::Cleanup,
            )
                .chain(),
        )
        .add_plugins((AIPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Из него берутся seeds агентов при спавне; у каждого агента свой ChaCha8Rng.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время продвигается вручную ровно на один fixed tick за `app.update()`,
/// поэтому прогон не зависит от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / TICK_HZ)))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(TICK_HZ));

    app
}
