//! Headless симуляция арены Fruitfall
//!
//! Стены, игрок, несколько врагов; игрок периодически бьёт ближайшего.
//! Запуск: `fruitfall_simulation [agents.toml] [seed]`

use bevy::prelude::*;
use std::sync::Arc;

use fruitfall_simulation::{
    create_headless_app, log_error, spawn_agent_in_world, AgentController, AgentDied, AgentRespawned,
    ContactEvent, DamageAgent, EnemyTypeId, LootDropped, Obstacle, ObstacleField, Player, PlayerVitals,
    ProjectileFired, SimulationPlugin, SimulationServices, TemplateLibrary,
};

const DEFAULT_TEMPLATES: &str = include_str!("../assets/agents.toml");
const TICKS: u32 = 1800;
const REPORT_EVERY: u32 = 300;
const PLAYER_HIT_EVERY: u32 = 45;
const PLAYER_HIT_DAMAGE: f32 = 35.0;
const PLAYER_REACH: f32 = 2.0;

fn main() {
    let mut args = std::env::args().skip(1);
    let templates = match args.next() {
        Some(path) => TemplateLibrary::load(&path),
        None => TemplateLibrary::from_toml_str(DEFAULT_TEMPLATES),
    };
    let templates = match templates {
        Ok(templates) => templates,
        Err(err) => {
            log_error(&format!("Failed to load agent templates: {}", err));
            std::process::exit(1);
        }
    };
    let seed = args.next().and_then(|seed| seed.parse().ok()).unwrap_or(42);

    println!("Starting Fruitfall headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(arena())
        .insert_resource(SimulationServices::default())
        .add_plugins(SimulationPlugin);

    let player = app
        .world_mut()
        .spawn((Player, PlayerVitals::new(200.0), Transform::from_xyz(0.0, 0.0, 0.0)))
        .id();

    let spawns = [
        ("TomatoEnemy", Vec3::new(-6.0, 0.0, -6.0)),
        ("TomatoEnemy", Vec3::new(6.0, 0.0, 6.0)),
        ("FlyingBanana", Vec3::new(7.0, 0.0, -7.0)),
        ("CarrotGuard", Vec3::new(-7.0, 0.0, 5.0)),
    ];
    for (enemy_type, position) in spawns {
        let Some(template) = templates.get(&EnemyTypeId::new(enemy_type)) else {
            log_error(&format!("Unknown enemy type {}", enemy_type));
            continue;
        };
        spawn_agent_in_world(app.world_mut(), Arc::new(template.clone()), position, 0.0);
    }

    for tick in 1..=TICKS {
        if tick % PLAYER_HIT_EVERY == 0 {
            player_attack(app.world_mut(), player);
        }

        app.update();
        print_events(app.world_mut());

        if tick % REPORT_EVERY == 0 {
            print_summary(app.world_mut(), tick);
        }
    }

    let services = app.world().resource::<SimulationServices>();
    println!(
        "Simulation complete! points: {}, kills: {}, alive: {}",
        services.scoreboard.current_points(),
        services.kills.total_kills(),
        services.kills.live_count()
    );
}

/// Квадратная арена 20x20 + пара колонн в центре
fn arena() -> ObstacleField {
    let half = 10.0;
    let thickness = 0.5;
    ObstacleField::new(vec![
        Obstacle::wall(Vec3::new(half, 0.0, 0.0), Vec3::new(thickness, 2.0, half)),
        Obstacle::wall(Vec3::new(-half, 0.0, 0.0), Vec3::new(thickness, 2.0, half)),
        Obstacle::wall(Vec3::new(0.0, 0.0, half), Vec3::new(half, 2.0, thickness)),
        Obstacle::wall(Vec3::new(0.0, 0.0, -half), Vec3::new(half, 2.0, thickness)),
        Obstacle::pillar(Vec3::new(3.0, 0.0, -3.0), 1.0),
        Obstacle::pillar(Vec3::new(-3.0, 0.0, 3.0), 1.0),
    ])
}

/// Игрок бьёт ближайшего агента в радиусе; ближайший агент задевает игрока
fn player_attack(world: &mut World, player: Entity) {
    let Some(player_position) = world.get::<Transform>(player).map(|t| t.translation) else {
        return;
    };

    let mut agents = world.query::<(Entity, &AgentController)>();
    let nearest = agents
        .iter(world)
        .filter(|(_, agent)| !agent.is_destroyed())
        .map(|(entity, agent)| (entity, agent.position().distance(player_position)))
        .filter(|(_, distance)| *distance <= PLAYER_REACH)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((entity, _)) = nearest {
        world.send_event(DamageAgent {
            target: entity,
            amount: PLAYER_HIT_DAMAGE,
        });
        world.send_event(ContactEvent { a: entity, b: player });
    }
}

fn print_events(world: &mut World) {
    for died in drain::<AgentDied>(world) {
        println!("  ☠️ {} died at {:.1?}", died.handle, died.position);
    }
    for respawned in drain::<AgentRespawned>(world) {
        println!("  ♻️ {} respawned at {:.1?}", respawned.enemy_type, respawned.position);
    }
    for drop in drain::<LootDropped>(world) {
        println!("  🎁 {} dropped at {:.1?}", drop.item, drop.position);
    }
    let shots = drain::<ProjectileFired>(world).len();
    if shots > 0 {
        println!("  🍌 {} projectile(s) fired", shots);
    }
}

fn drain<E: Event + Clone>(world: &mut World) -> Vec<E> {
    world.resource_mut::<Events<E>>().drain().collect()
}

fn print_summary(world: &mut World, tick: u32) {
    println!("Tick {}:", tick);

    let mut agents = world.query::<&AgentController>();
    for agent in agents.iter(world) {
        println!(
            "  {} {:>8} hp {:>5.1}/{:<5.1} at {:.1?}",
            agent.handle(),
            agent.state(),
            agent.health(),
            agent.max_health(),
            agent.position()
        );
    }

    let mut players = world.query_filtered::<&PlayerVitals, With<Player>>();
    for vitals in players.iter(world) {
        println!("  Player hp {:.1}/{:.1}", vitals.health.current, vitals.health.max);
    }
}
