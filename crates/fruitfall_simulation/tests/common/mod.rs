//! Общие helpers для integration тестов: recording collaborators + сборка агентов.

#![allow(dead_code)]

use bevy::prelude::*;
use std::sync::{Arc, Mutex};

use fruitfall_simulation::services::{
    AudioService, KillTracker, LootSpawner, NotificationService, RespawnPolicy, ScoringService, TargetProvider,
};
use fruitfall_simulation::{AgentController, AgentHandle, AgentServices, AgentTemplate, EnemyTypeId, Pose};

pub const DT: f32 = 1.0 / 60.0;

/// Вызов collaborator'а в порядке поступления
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    RegisterType(EnemyTypeId, u32),
    PointsForType(EnemyTypeId),
    Points(u32),
    KillReported(AgentHandle),
    Sound(Vec<String>),
    Notification(String),
    Loot(String, Vec3),
    Respawn(EnemyTypeId, Vec3, f32),
}

/// Один recorder реализует все collaborator traits
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    target: Mutex<Option<Vec3>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn set_target(&self, position: Option<Vec3>) {
        *self.target.lock().unwrap() = position;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Все collaborators указывают на этот recorder
    pub fn services(self: &Arc<Self>) -> AgentServices {
        AgentServices::new()
            .with_target(self.clone())
            .with_scoring(self.clone())
            .with_kills(self.clone())
            .with_audio(self.clone())
            .with_notifications(self.clone())
            .with_loot(self.clone())
            .with_respawn(self.clone())
    }
}

impl TargetProvider for Recorder {
    fn target_position(&self) -> Option<Vec3> {
        *self.target.lock().unwrap()
    }
}

impl ScoringService for Recorder {
    /// Последнее зарегистрированное значение типа, иначе 50
    fn add_points_for_type(&self, enemy_type: &EnemyTypeId) -> u32 {
        let award = self
            .calls()
            .iter()
            .rev()
            .find_map(|call| match call {
                Call::RegisterType(registered, amount) if registered == enemy_type => Some(*amount),
                _ => None,
            })
            .unwrap_or(50);
        self.record(Call::PointsForType(enemy_type.clone()));
        award
    }

    fn add_points(&self, amount: u32) {
        self.record(Call::Points(amount));
    }

    fn register_type_value(&self, enemy_type: &EnemyTypeId, amount: u32) {
        self.record(Call::RegisterType(enemy_type.clone(), amount));
    }
}

impl KillTracker for Recorder {
    fn report_death(&self, agent: &AgentHandle) {
        self.record(Call::KillReported(agent.clone()));
    }
}

impl AudioService for Recorder {
    fn play_one_shot(&self, clips: &[String], _origin: &Transform, _volume: f32) {
        self.record(Call::Sound(clips.to_vec()));
    }
}

impl NotificationService for Recorder {
    fn show(&self, message: &str, _duration: f32) {
        self.record(Call::Notification(message.to_string()));
    }
}

impl LootSpawner for Recorder {
    fn spawn(&self, item: &str, position: Vec3) {
        self.record(Call::Loot(item.to_string(), position));
    }
}

impl RespawnPolicy for Recorder {
    fn schedule_respawn(&self, template: &AgentTemplate, position: Vec3, _yaw: f32, delay: f32) {
        self.record(Call::Respawn(template.enemy_type.clone(), position, delay));
    }
}

pub fn agent_at(template: AgentTemplate, position: Vec3, services: AgentServices) -> AgentController {
    AgentController::new(1, Arc::new(template), Pose::new(position, 0.0), services, 7)
}

pub fn clips(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
