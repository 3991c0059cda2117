//! Внешние collaborators агента (scoring, kills, audio, UI, loot, respawn).
//!
//! Никаких глобальных менеджеров: каждый агент получает `AgentServices` при
//! создании. Любой сервис может отсутствовать — тогда вызов тихо пропускается.
//! Все методы берут `&self`: реализации, которым нужен state, держат его за
//! Mutex/RwLock (симуляция однопоточная, блокировки не конкурируют).

use bevy::prelude::*;
use std::sync::Arc;

use crate::components::{AgentHandle, EnemyTypeId};
use crate::config::AgentTemplate;

pub mod console;
pub mod kills;
pub mod queues;
pub mod scoring;

pub use console::{ConsoleAudio, ConsoleNotifications};
pub use kills::KillCounter;
pub use queues::{LootDrop, LootQueue, PendingRespawn, RespawnQueue, SharedTarget};
pub use scoring::ScoreBoard;

/// Где сейчас цель (обычно игрок)
pub trait TargetProvider: Send + Sync {
    fn target_position(&self) -> Option<Vec3>;
}

pub trait ScoringService: Send + Sync {
    /// Незарегистрированный тип → default award. Возвращает начисленное.
    fn add_points_for_type(&self, enemy_type: &EnemyTypeId) -> u32;
    fn add_points(&self, amount: u32);
    /// Повторная регистрация допустима (последнее значение побеждает)
    fn register_type_value(&self, enemy_type: &EnemyTypeId, amount: u32);
}

pub trait KillTracker: Send + Sync {
    fn report_death(&self, agent: &AgentHandle);
}

pub trait AudioService: Send + Sync {
    /// Fire-and-forget; реализация сама выбирает клип из набора
    fn play_one_shot(&self, clips: &[String], origin: &Transform, volume: f32);
}

pub trait NotificationService: Send + Sync {
    fn show(&self, message: &str, duration: f32);
}

pub trait LootSpawner: Send + Sync {
    fn spawn(&self, item: &str, position: Vec3);
}

pub trait RespawnPolicy: Send + Sync {
    fn schedule_respawn(&self, template: &AgentTemplate, position: Vec3, yaw: f32, delay: f32);
}

/// Опциональный глобальный планировщик пути
pub trait PathPlanner: Send + Sync {
    /// Следующая промежуточная точка на пути `from → to`; `None` → только local avoidance
    fn next_waypoint(&self, from: Vec3, to: Vec3) -> Option<Vec3>;
}

/// Набор collaborators одного агента
#[derive(Clone, Default)]
pub struct AgentServices {
    pub target: Option<Arc<dyn TargetProvider>>,
    pub scoring: Option<Arc<dyn ScoringService>>,
    pub kills: Option<Arc<dyn KillTracker>>,
    pub audio: Option<Arc<dyn AudioService>>,
    pub notifications: Option<Arc<dyn NotificationService>>,
    pub loot: Option<Arc<dyn LootSpawner>>,
    pub respawn: Option<Arc<dyn RespawnPolicy>>,
    pub path_planner: Option<Arc<dyn PathPlanner>>,
}

impl AgentServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: Arc<dyn TargetProvider>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_scoring(mut self, scoring: Arc<dyn ScoringService>) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn with_kills(mut self, kills: Arc<dyn KillTracker>) -> Self {
        self.kills = Some(kills);
        self
    }

    pub fn with_audio(mut self, audio: Arc<dyn AudioService>) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_loot(mut self, loot: Arc<dyn LootSpawner>) -> Self {
        self.loot = Some(loot);
        self
    }

    pub fn with_respawn(mut self, respawn: Arc<dyn RespawnPolicy>) -> Self {
        self.respawn = Some(respawn);
        self
    }

    pub fn with_path_planner(mut self, planner: Arc<dyn PathPlanner>) -> Self {
        self.path_planner = Some(planner);
        self
    }
}

impl std::fmt::Debug for AgentServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentServices")
            .field("target", &self.target.is_some())
            .field("scoring", &self.scoring.is_some())
            .field("kills", &self.kills.is_some())
            .field("audio", &self.audio.is_some())
            .field("notifications", &self.notifications.is_some())
            .field("loot", &self.loot.is_some())
            .field("respawn", &self.respawn.is_some())
            .field("path_planner", &self.path_planner.is_some())
            .finish()
    }
}

/// Общие default collaborators симуляции (ECS resource)
///
/// Держит конкретные типы, чтобы системы и тесты могли читать очки,
/// kill count и очереди; `agent_services()` раздаёт их агентам как trait objects.
#[derive(Resource, Clone)]
pub struct SimulationServices {
    pub target: SharedTarget,
    pub scoreboard: Arc<ScoreBoard>,
    pub kills: Arc<KillCounter>,
    pub loot: Arc<LootQueue>,
    pub respawns: Arc<RespawnQueue>,
    pub audio: Option<Arc<dyn AudioService>>,
    pub notifications: Option<Arc<dyn NotificationService>>,
    pub path_planner: Option<Arc<dyn PathPlanner>>,
}

impl Default for SimulationServices {
    fn default() -> Self {
        Self {
            target: SharedTarget::default(),
            scoreboard: Arc::new(ScoreBoard::new()),
            kills: Arc::new(KillCounter::new()),
            loot: Arc::new(LootQueue::new()),
            respawns: Arc::new(RespawnQueue::new()),
            audio: Some(Arc::new(ConsoleAudio)),
            notifications: Some(Arc::new(ConsoleNotifications)),
            path_planner: None,
        }
    }
}

impl SimulationServices {
    /// Без console audio/notifications (тихие тесты)
    pub fn silent() -> Self {
        Self {
            audio: None,
            notifications: None,
            ..Default::default()
        }
    }

    pub fn agent_services(&self) -> AgentServices {
        AgentServices {
            target: Some(Arc::new(self.target.clone())),
            scoring: Some(self.scoreboard.clone()),
            kills: Some(self.kills.clone()),
            audio: self.audio.clone(),
            notifications: self.notifications.clone(),
            loot: Some(self.loot.clone()),
            respawn: Some(self.respawns.clone()),
            path_planner: self.path_planner.clone(),
        }
    }
}
