//! AI агентов: perception, steering, behavior FSM.
//!
//! Сами алгоритмы — обычные структуры без ECS (тестируются напрямую).
//! `AIPlugin` только гоняет `AgentController::tick` в FixedUpdate.

use bevy::prelude::*;

pub mod fsm;
pub mod perception;
pub mod steering;
pub mod systems;

#[cfg(test)]
mod steering_tests;

pub use fsm::{BehaviorParams, BehaviorState, BehaviorStateMachine, Decision, MoveIntent, Observation, Transition};
pub use perception::{Perception, Sighting};
pub use steering::{rotate_towards, Steering, StuckState};

use crate::agent::AgentIdAllocator;
use crate::services::SimulationServices;
use crate::world::ObstacleField;
use crate::SimulationSet;

/// Event: ranged агент выстрелил (хост спавнит снаряд с `Hazard::projectile`)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileFired {
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
    pub damage: f32,
}

/// AI Plugin
///
/// Порядок внутри fixed tick:
/// 1. Sense — `track_player_target` публикует позицию игрока
/// 2. Act — `tick_agents` (perception → FSM → steering → стрельба)
/// 3. Cleanup — `sync_agent_transforms` копирует позу в Transform
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObstacleField>()
            .init_resource::<SimulationServices>()
            .init_resource::<AgentIdAllocator>()
            .add_event::<ProjectileFired>();

        app.add_systems(
            FixedUpdate,
            (
                systems::track_player_target.in_set(SimulationSet::Sense),
                systems::tick_agents.in_set(SimulationSet::Act),
                systems::sync_agent_transforms.in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
