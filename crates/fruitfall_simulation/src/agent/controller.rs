//! AgentController — composition root одного агента.
//!
//! Владеет Perception, Steering, BehaviorStateMachine, CombatModel и очередью
//! timed effects. Хост вызывает `tick(delta, world)` раз в fixed tick и
//! `take_damage(amount)` при попаданиях; всё остальное — внутренности.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use crate::ai::fsm::{BehaviorParams, BehaviorState, BehaviorStateMachine, MoveIntent, Observation, Transition};
use crate::ai::perception::{Perception, Sighting};
use crate::ai::steering::{rotate_towards, Steering};
use crate::combat::damage::{DamageSource, Damageable, VictimKind};
use crate::combat::effects::{EffectKind, EffectQueue};
use crate::combat::loot::roll_loot;
use crate::combat::model::{CombatModel, DamageOutcome};
use crate::components::{flatten, AgentHandle, EnemyTypeId, Pose};
use crate::config::AgentTemplate;
use crate::services::AgentServices;
use crate::world::RayCaster;

/// Жизненный цикл сущности агента
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    /// Death sequence завершена, entity ждёт despawn
    Destroyed,
}

/// Намерение выстрелить (ranged варианты)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileIntent {
    pub origin: Vec3,
    pub direction: Vec3,
    pub damage: f32,
}

/// Что произошло за тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub state: BehaviorState,
    pub transition: Option<Transition>,
    pub projectile: Option<ProjectileIntent>,
}

#[derive(Component)]
pub struct AgentController {
    handle: AgentHandle,
    template: Arc<AgentTemplate>,
    pose: Pose,
    spawn_pose: Pose,

    perception: Perception,
    steering: Steering,
    behavior: BehaviorStateMachine,
    combat: CombatModel,
    effects: EffectQueue,

    services: AgentServices,
    rng: ChaCha8Rng,
    lifecycle: Lifecycle,

    flash_active: bool,
    speed_multiplier: f32,
    reroute_heading: Vec3,
    fire_cooldown: f32,
    last_sighting: Option<Sighting>,
}

impl AgentController {
    pub fn new(id: u64, template: Arc<AgentTemplate>, pose: Pose, services: AgentServices, seed: u64) -> Self {
        let handle = AgentHandle {
            id,
            enemy_type: template.enemy_type.clone(),
        };

        if let Some(scoring) = &services.scoring {
            scoring.register_type_value(&handle.enemy_type, template.point_value);
        }

        Self {
            perception: Perception::new(template.obstacle_mask),
            steering: Steering::new(template.sensors, template.stuck, template.obstacle_mask, pose.position),
            behavior: BehaviorStateMachine::new(BehaviorParams::from(template.as_ref()), pose.position),
            combat: CombatModel::new(template.max_health),
            effects: EffectQueue::new(),
            handle,
            template,
            pose,
            spawn_pose: pose,
            services,
            rng: ChaCha8Rng::seed_from_u64(seed),
            lifecycle: Lifecycle::Active,
            flash_active: false,
            speed_multiplier: 1.0,
            reroute_heading: Vec3::ZERO,
            fire_cooldown: 0.0,
            last_sighting: None,
        }
    }

    pub fn handle(&self) -> &AgentHandle {
        &self.handle
    }

    pub fn enemy_type(&self) -> &EnemyTypeId {
        &self.handle.enemy_type
    }

    pub fn template(&self) -> &AgentTemplate {
        &self.template
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn state(&self) -> BehaviorState {
        self.behavior.state()
    }

    pub fn behavior(&self) -> &BehaviorStateMachine {
        &self.behavior
    }

    pub fn steering(&self) -> &Steering {
        &self.steering
    }

    pub fn health(&self) -> f32 {
        self.combat.health()
    }

    pub fn max_health(&self) -> f32 {
        self.combat.max_health()
    }

    pub fn is_alive(&self) -> bool {
        self.combat.is_alive()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_active
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.effects
    }

    pub fn last_sighting(&self) -> Option<Sighting> {
        self.last_sighting
    }

    pub fn tick(&mut self, delta: f32, world: &dyn RayCaster) -> TickReport {
        if self.is_destroyed() || !delta.is_finite() || delta <= 0.0 {
            return TickReport {
                state: self.state(),
                transition: None,
                projectile: None,
            };
        }

        for kind in self.effects.advance(delta) {
            self.revert_effect(kind);
        }

        let position = self.pose.position;
        let target = self.target_position();
        let sighting = self.perception.sense(world, position, target);
        self.last_sighting = sighting;

        let observation = Observation {
            position,
            sighting,
            is_stuck: self.steering.is_stuck(),
            delta,
        };
        let decision = self.behavior.evaluate(&observation, &mut self.rng);
        if let Some(transition) = decision.transition {
            self.on_transition(transition, world);
        }

        let (desired, reach) = self.desired_direction(decision.intent);
        let speed = decision.speed * self.speed_multiplier;
        let commanded_speed = if desired == Vec3::ZERO { 0.0 } else { speed };

        let mut facing = None;
        if commanded_speed > 0.0 {
            let direction = self
                .steering
                .compute_direction(world, position, desired, &mut self.rng);
            let distance = (commanded_speed * delta).min(reach);
            self.pose.position = self.steering.step(world, position, direction, distance);
            facing = Some(direction);
        } else if let MoveIntent::Hold { face: Some(point) } = decision.intent {
            facing = Some(point - position);
        }

        if let Some(direction) = facing {
            self.pose.yaw = rotate_towards(self.pose.yaw, direction, self.template.turn_rate(), delta);
        }

        self.steering
            .update_stuck(self.pose.position, commanded_speed, delta);

        let projectile = self.try_fire(decision.attack_ready, sighting, delta);

        TickReport {
            state: decision.state,
            transition: decision.transition,
            projectile,
        }
    }

    /// Returns what the hit did; the death sequence runs inside on the killing blow.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_destroyed() {
            return DamageOutcome::Ignored;
        }

        let outcome = self.combat.take_damage(amount);
        if outcome == DamageOutcome::Ignored {
            return outcome;
        }

        // Новый удар перезапускает flash
        self.flash_active = true;
        self.effects
            .schedule(EffectKind::DamageFlash, self.template.combat.flash_duration);
        self.play_sound(&self.template.combat.hurt_clips);

        match outcome {
            DamageOutcome::Hurt => {
                crate::log(&format!(
                    "💥 {} took {} damage ({}/{})",
                    self.handle,
                    amount,
                    self.combat.health(),
                    self.combat.max_health()
                ));
                let target = self.target_position();
                if let Some(transition) = self.behavior.force_chase(target) {
                    self.log_transition(transition);
                    if transition.from != BehaviorState::Reroute {
                        self.steering.reset_stuck(self.pose.position);
                    }
                }
            }
            DamageOutcome::Killed => self.run_death_sequence(),
            DamageOutcome::Ignored => {}
        }

        outcome
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_destroyed() {
            return 0.0;
        }
        self.combat.heal(amount)
    }

    /// Временный множитель скорости; новый buff вытесняет старый
    pub fn apply_speed_buff(&mut self, multiplier: f32, duration: f32) {
        if self.is_destroyed() || !multiplier.is_finite() || multiplier < 0.0 {
            return;
        }
        self.speed_multiplier = multiplier;
        self.effects.schedule(EffectKind::SpeedBuff, duration);
    }

    fn target_position(&self) -> Option<Vec3> {
        self.services
            .target
            .as_ref()
            .and_then(|target| target.target_position())
    }

    fn revert_effect(&mut self, kind: EffectKind) {
        match kind {
            EffectKind::DamageFlash => self.flash_active = false,
            EffectKind::SpeedBuff => self.speed_multiplier = 1.0,
        }
    }

    fn on_transition(&mut self, transition: Transition, world: &dyn RayCaster) {
        self.log_transition(transition);

        match transition.to {
            BehaviorState::Chase if transition.from != BehaviorState::Reroute => {
                self.steering.reset_stuck(self.pose.position);
            }
            BehaviorState::Reroute => {
                let toward = self
                    .behavior
                    .last_known_target_position()
                    .unwrap_or(self.pose.position + self.pose.forward());
                self.reroute_heading =
                    self.steering
                        .reroute_heading(world, self.pose.position, toward, self.pose.forward());
            }
            _ => {}
        }
    }

    fn log_transition(&self, transition: Transition) {
        crate::log(&format!(
            "AI: {} {} → {} (failed paths: {})",
            self.handle,
            transition.from,
            transition.to,
            self.behavior.failed_path_attempts()
        ));
    }

    /// Направление + сколько максимум можно пройти (чтобы не проскочить точку)
    fn desired_direction(&self, intent: MoveIntent) -> (Vec3, f32) {
        let position = self.pose.position;
        match intent {
            MoveIntent::Hold { .. } => (Vec3::ZERO, 0.0),
            MoveIntent::Heading(direction) => (flatten(direction), f32::INFINITY),
            MoveIntent::Reroute { .. } => (self.reroute_heading, f32::INFINITY),
            MoveIntent::MoveTo(point) => {
                let waypoint = self
                    .services
                    .path_planner
                    .as_ref()
                    .and_then(|planner| planner.next_waypoint(position, point))
                    .unwrap_or(point);
                let offset = waypoint - position;
                let reach = Vec2::new(offset.x, offset.z).length();
                (flatten(offset), reach)
            }
        }
    }

    fn try_fire(&mut self, attack_ready: bool, sighting: Option<Sighting>, delta: f32) -> Option<ProjectileIntent> {
        let ranged = self.template.combat.ranged?;
        self.fire_cooldown = (self.fire_cooldown - delta).max(0.0);

        let sighting = sighting.filter(|_| attack_ready)?;
        if self.fire_cooldown > 0.0 {
            return None;
        }

        let direction = (sighting.target - self.pose.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.fire_cooldown = 1.0 / ranged.fire_rate;
        Some(ProjectileIntent {
            origin: self.pose.position,
            direction,
            damage: ranged.projectile_damage,
        })
    }

    fn play_sound(&self, clips: &[String]) {
        if let Some(audio) = &self.services.audio {
            audio.play_one_shot(clips, &self.pose.to_transform(), self.template.combat.volume);
        }
    }

    /// Kill report → очки → loot → звук → уведомление → destroy (+ respawn)
    fn run_death_sequence(&mut self) {
        let position = self.pose.position;

        if let Some(kills) = &self.services.kills {
            kills.report_death(&self.handle);
        }

        // Без scoring service показываем значение из template
        let awarded = match &self.services.scoring {
            Some(scoring) => scoring.add_points_for_type(&self.handle.enemy_type),
            None => self.template.point_value,
        };

        let drops: Vec<String> = roll_loot(&self.template.combat.loot, &mut self.rng)
            .into_iter()
            .map(str::to_string)
            .collect();
        if let Some(loot) = &self.services.loot {
            for item in &drops {
                loot.spawn(item, position);
            }
        }

        self.play_sound(&self.template.combat.death_clips);

        if let Some(notifications) = &self.services.notifications {
            notifications.show(
                &format!("+{} points", awarded),
                self.template.combat.notification_duration,
            );
        }

        // Destroy: pending reverts больше не нужны
        self.effects.cancel_all();
        self.flash_active = false;
        self.speed_multiplier = 1.0;
        self.lifecycle = Lifecycle::Destroyed;

        if let (Some(delay), Some(respawn)) = (self.template.combat.respawn_delay, &self.services.respawn) {
            respawn.schedule_respawn(&self.template, self.spawn_pose.position, self.spawn_pose.yaw, delay);
        }

        crate::log_info(&format!(
            "💀 {} died at {:?} (loot: {:?})",
            self.handle, position, drops
        ));
    }
}

impl DamageSource for AgentController {
    /// Агенты ранят только игрока
    fn contact_damage(&self, victim: VictimKind) -> Option<f32> {
        match victim {
            VictimKind::Player if !self.is_destroyed() => Some(self.template.combat.contact_damage),
            _ => None,
        }
    }
}

impl Damageable for AgentController {
    fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        self.take_damage(amount)
    }

    fn is_alive(&self) -> bool {
        AgentController::is_alive(self)
    }
}

impl std::fmt::Debug for AgentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentController")
            .field("handle", &self.handle)
            .field("state", &self.state())
            .field("pose", &self.pose)
            .field("health", &self.combat.health())
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
