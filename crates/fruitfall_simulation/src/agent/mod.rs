//! Агенты: composition root + спавн в ECS.

use bevy::prelude::*;
use rand::Rng;
use std::sync::Arc;

pub mod controller;


pub use controller::{AgentController, Lifecycle, ProjectileIntent, TickReport};

use crate::components::Pose;
use crate::config::AgentTemplate;
use crate::services::SimulationServices;
use crate::DeterministicRng;

/// Выдаёт уникальные id агентам (включая респавны)
#[derive(Resource, Debug, Default)]
pub struct AgentIdAllocator {
    next: u64,
}

impl AgentIdAllocator {
    pub fn allocate(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

/// Spawn агента из template
///
/// Seed агента берётся из общего `DeterministicRng` — порядок спавна
/// определяет поведение, повторный запуск с тем же seed даёт тот же мир.
pub fn spawn_agent(
    commands: &mut Commands,
    ids: &mut AgentIdAllocator,
    rng: &mut DeterministicRng,
    services: &SimulationServices,
    template: Arc<AgentTemplate>,
    position: Vec3,
    yaw: f32,
) -> Entity {
    let id = ids.allocate();
    let seed = rng.rng.gen::<u64>();
    let pose = Pose::new(position, yaw);

    let controller = AgentController::new(id, template, pose, services.agent_services(), seed);
    services.kills.register_spawn(controller.handle());
    crate::log(&format!("🍅 Spawned {} at {:?}", controller.handle(), position));

    commands.spawn((controller, pose.to_transform())).id()
}

/// То же самое с прямым доступом к World (setup, тесты)
pub fn spawn_agent_in_world(world: &mut World, template: Arc<AgentTemplate>, position: Vec3, yaw: f32) -> Entity {
    world.init_resource::<AgentIdAllocator>();
    world.init_resource::<SimulationServices>();
    if !world.contains_resource::<DeterministicRng>() {
        world.insert_resource(DeterministicRng::new(0));
    }

    let id = world.resource_mut::<AgentIdAllocator>().allocate();
    let seed = world.resource_mut::<DeterministicRng>().rng.gen::<u64>();
    let services = world.resource::<SimulationServices>().clone();

    let controller = AgentController::new(id, template, Pose::new(position, yaw), services.agent_services(), seed);
    services.kills.register_spawn(controller.handle());
    crate::log(&format!("🍅 Spawned {} at {:?}", controller.handle(), position));

    let transform = controller.pose().to_transform();
    world.spawn((controller, transform)).id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut ids = AgentIdAllocator::default();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
    }

    #[test]
    fn test_spawn_in_world_registers_with_kill_counter() {
        let mut world = World::new();
        world.insert_resource(SimulationServices::silent());

        let template = Arc::new(AgentTemplate::new("TomatoEnemy"));
        let first = spawn_agent_in_world(&mut world, template.clone(), Vec3::ZERO, 0.0);
        let second = spawn_agent_in_world(&mut world, template, Vec3::X, 0.0);

        let services = world.resource::<SimulationServices>();
        assert_eq!(services.kills.live_count(), 2);

        let a = world.get::<AgentController>(first).map(|agent| agent.handle().id);
        let b = world.get::<AgentController>(second).map(|agent| agent.handle().id);
        assert_eq!(a, Some(1));
        assert_eq!(b, Some(2));
        assert_eq!(world.get::<Transform>(second).map(|t| t.translation), Some(Vec3::X));
    }
}
