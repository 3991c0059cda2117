//! ECS системы combat (FixedUpdate).

use bevy::prelude::*;
use std::sync::Arc;

use super::damage::{DamageSource, Damageable, Hazard, VictimKind};
use super::model::DamageOutcome;
use super::{AgentDied, AgentRespawned, ContactEvent, DamageAgent, LootDropped};
use crate::agent::{spawn_agent, AgentController, AgentIdAllocator};
use crate::components::PlayerVitals;
use crate::services::SimulationServices;
use crate::DeterministicRng;

/// DamageAgent → AgentController::take_damage
pub fn apply_damage_requests(mut requests: EventReader<DamageAgent>, mut agents: Query<&mut AgentController>) {
    for request in requests.read() {
        let Ok(mut agent) = agents.get_mut(request.target) else {
            crate::log_warning(&format!("DamageAgent: {:?} is not an agent", request.target));
            continue;
        };
        agent.take_damage(request.amount);
    }
}

/// ContactEvent → урон в обе стороны через capability traits
///
/// Никаких проверок "кто это": источник сам говорит, сколько урона
/// он наносит жертве данного вида (или `None`).
pub fn resolve_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut agents: Query<&mut AgentController>,
    hazards: Query<&Hazard>,
    mut players: Query<&mut PlayerVitals>,
) {
    for contact in contacts.read() {
        for (source, victim) in [(contact.a, contact.b), (contact.b, contact.a)] {
            if source == victim {
                continue;
            }

            let Some(kind) = victim_kind(victim, &agents, &players) else {
                continue;
            };
            let Some(amount) = contact_damage(source, kind, &agents, &hazards) else {
                continue;
            };

            let outcome = match kind {
                VictimKind::Agent => agents.get_mut(victim).ok().map(|mut agent| agent.apply_damage(amount)),
                VictimKind::Player => players.get_mut(victim).ok().map(|mut player| player.apply_damage(amount)),
            };

            if let Some(outcome) = outcome.filter(|outcome| *outcome != DamageOutcome::Ignored) {
                crate::log(&format!(
                    "Contact: {:?} → {:?} ({:?}) {} damage, {:?}",
                    source, victim, kind, amount, outcome
                ));
            }
        }
    }
}

fn victim_kind(
    entity: Entity,
    agents: &Query<&mut AgentController>,
    players: &Query<&mut PlayerVitals>,
) -> Option<VictimKind> {
    if agents.contains(entity) {
        Some(VictimKind::Agent)
    } else if players.contains(entity) {
        Some(VictimKind::Player)
    } else {
        None
    }
}

fn contact_damage(
    source: Entity,
    victim: VictimKind,
    agents: &Query<&mut AgentController>,
    hazards: &Query<&Hazard>,
) -> Option<f32> {
    if let Ok(agent) = agents.get(source) {
        return agent.contact_damage(victim);
    }
    hazards.get(source).ok().and_then(|hazard| hazard.contact_damage(victim))
}

/// Destroyed агенты → AgentDied + despawn
pub fn despawn_destroyed_agents(
    mut commands: Commands,
    agents: Query<(Entity, &AgentController)>,
    mut deaths: EventWriter<AgentDied>,
) {
    for (entity, agent) in agents.iter() {
        if !agent.is_destroyed() {
            continue;
        }

        deaths.write(AgentDied {
            entity,
            handle: agent.handle().clone(),
            position: agent.position(),
        });
        commands.entity(entity).despawn();
    }
}

/// RespawnQueue → новые агенты (новый id, тот же template)
pub fn process_respawns(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    services: Res<SimulationServices>,
    mut ids: ResMut<AgentIdAllocator>,
    mut rng: ResMut<DeterministicRng>,
    mut respawned: EventWriter<AgentRespawned>,
) {
    for pending in services.respawns.advance(time.delta_secs()) {
        let enemy_type = pending.template.enemy_type.clone();
        let entity = spawn_agent(
            &mut commands,
            &mut ids,
            &mut rng,
            &services,
            Arc::new(pending.template),
            pending.position,
            pending.yaw,
        );

        crate::log_info(&format!("♻️ {} respawned at {:?}", enemy_type, pending.position));
        respawned.write(AgentRespawned {
            entity,
            enemy_type,
            position: pending.position,
        });
    }
}

/// LootQueue → LootDropped events
pub fn drain_loot_drops(services: Res<SimulationServices>, mut drops: EventWriter<LootDropped>) {
    for drop in services.loot.drain() {
        drops.write(LootDropped {
            item: drop.item,
            position: drop.position,
        });
    }
}
