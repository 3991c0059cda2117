//! ECS системы AI (FixedUpdate).

use bevy::prelude::*;

use super::ProjectileFired;
use crate::agent::AgentController;
use crate::components::Player;
use crate::services::SimulationServices;
use crate::world::ObstacleField;

/// Sense: позиция игрока → общий TargetProvider
///
/// Нет игрока (или он despawned) → `None`, агенты теряют цель.
pub fn track_player_target(services: Res<SimulationServices>, players: Query<&Transform, With<Player>>) {
    let position = players.iter().next().map(|transform| transform.translation);
    services.target.set(position);
}

/// Act: один `tick` на агента за fixed tick
pub fn tick_agents(
    time: Res<Time<Fixed>>,
    field: Res<ObstacleField>,
    mut agents: Query<(Entity, &mut AgentController)>,
    mut projectiles: EventWriter<ProjectileFired>,
) {
    let delta = time.delta_secs();
    if delta <= 0.0 {
        return;
    }

    // Порядок итерации фиксирован для одного и того же набора entity
    let mut agents: Vec<_> = agents.iter_mut().collect();
    agents.sort_by_key(|(entity, _)| *entity);

    for (entity, mut agent) in agents {
        let report = agent.tick(delta, field.as_ref());

        if let Some(shot) = report.projectile {
            projectiles.write(ProjectileFired {
                shooter: entity,
                origin: shot.origin,
                direction: shot.direction,
                damage: shot.damage,
            });
        }
    }
}

/// Cleanup: поза контроллера → Transform (для рендера / хоста)
pub fn sync_agent_transforms(mut agents: Query<(&AgentController, &mut Transform), Changed<AgentController>>) {
    for (agent, mut transform) in agents.iter_mut() {
        *transform = agent.pose().to_transform();
    }
}
