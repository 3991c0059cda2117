//! Combat: здоровье, timed effects, loot, capability dispatch урона.
//!
//! Core (CombatModel, EffectQueue, roll_loot) без ECS.
//! ECS ответственность — только доставка событий до контроллеров:
//! - DamageAgent (хост: попадание оружия/снаряда) → `take_damage`
//! - ContactEvent (хост: физический контакт) → DamageSource / Damageable
//! - уничтоженные агенты → AgentDied + despawn
//! - очереди respawn/loot → AgentRespawned / LootDropped

use bevy::prelude::*;

pub mod damage;
pub mod effects;
pub mod loot;
pub mod model;
pub mod systems;


pub use damage::{DamageSource, Damageable, Hazard, HazardKind, VictimKind};
pub use effects::{EffectId, EffectKind, EffectQueue, ScheduledEffect};
pub use loot::roll_loot;
pub use model::{CombatModel, DamageOutcome};

use crate::components::{AgentHandle, EnemyTypeId};
use crate::SimulationSet;

/// Event: нанести урон агенту (хост определил попадание)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageAgent {
    pub target: Entity,
    pub amount: f32,
}

/// Event: две сущности соприкоснулись (порядок не важен)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub a: Entity,
    pub b: Entity,
}

/// Event: агент погиб (death sequence уже отработала)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AgentDied {
    pub entity: Entity,
    pub handle: AgentHandle,
    pub position: Vec3,
}

/// Event: loot выпал (хост спавнит pickup)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct LootDropped {
    pub item: String,
    pub position: Vec3,
}

/// Event: агент возродился по RespawnQueue
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AgentRespawned {
    pub entity: Entity,
    pub enemy_type: EnemyTypeId,
    pub position: Vec3,
}

/// Combat Plugin
///
/// Resolve: damage requests → contacts.
/// Cleanup: despawn мёртвых → respawns → loot drops.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageAgent>()
            .add_event::<ContactEvent>()
            .add_event::<AgentDied>()
            .add_event::<LootDropped>()
            .add_event::<AgentRespawned>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::apply_damage_requests, systems::resolve_contacts)
                    .chain()
                    .in_set(SimulationSet::Resolve),
                (
                    systems::despawn_destroyed_agents,
                    systems::process_respawns,
                    systems::drain_loot_drops,
                )
                    .chain()
                    .in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
