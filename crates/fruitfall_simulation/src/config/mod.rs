//! Agent templates: один data record вместо набора почти одинаковых скриптов
//!
//! Все варианты врагов (томат, летающий банан, охранник) — это разные
//! `AgentTemplate`, а не разный код. Загружаются из TOML через `TemplateLibrary`.

use serde::{Deserialize, Serialize};

use crate::components::EnemyTypeId;
use crate::world::ObstacleMask;

pub mod error;
pub mod library;

pub use error::{ConfigError, Result};
pub use library::TemplateLibrary;

/// Что агент делает, когда цели нет
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WanderMode {
    /// Случайный heading каждые `roam_time` секунд
    #[default]
    Roam,
    /// Возврат к anchor (точке спавна), затем Idle
    Patrol,
}

/// Скорости по состояниям (units/sec)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveSpeeds {
    pub patrol: f32,
    pub chase: f32,
    pub roam: f32,
    /// `None` → patrol × 0.8
    pub reroute: Option<f32>,
}

impl Default for MoveSpeeds {
    fn default() -> Self {
        Self {
            patrol: 2.0,
            chase: 4.0,
            roam: 2.0,
            reroute: None,
        }
    }
}

impl MoveSpeeds {
    pub const REROUTE_FACTOR: f32 = 0.8;

    pub fn reroute_speed(&self) -> f32 {
        self.reroute.unwrap_or(self.patrol * Self::REROUTE_FACTOR)
    }
}

/// Параметры sensor fan (obstacle avoidance)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Дальность primary луча; свободно дальше → направление не меняем
    pub detection_range: f32,
    /// Количество secondary лучей по кругу
    pub ray_count: usize,
    /// Вес dot(candidate, desired) в оценке направления
    pub alignment_bias: f32,
    /// "Стена прямо перед носом" — короткая проверка для jitter
    pub wall_check_distance: f32,
    /// Максимальный боковой jitter (доля от единичного направления)
    pub lateral_jitter: f32,
    pub body_radius: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            detection_range: 3.0,
            ray_count: 8,
            alignment_bias: 0.5,
            wall_check_distance: 1.0,
            lateral_jitter: 0.25,
            body_radius: 0.4,
        }
    }
}

/// Stuck detection: сэмплируем позицию раз в `sample_interval`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StuckConfig {
    pub sample_interval: f32,
    /// Смещение меньше threshold за интервал → stuck
    pub threshold: f32,
    /// Скорость ниже этой считается "не двигались намеренно"
    pub min_speed: f32,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            sample_interval: 0.5,
            threshold: 0.3,
            min_speed: 0.01,
        }
    }
}

/// Дальняя атака (летающие варианты)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangedAttack {
    /// Выстрелов в секунду
    pub fire_rate: f32,
    pub projectile_damage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    /// Prefab / item id для LootSpawner
    pub item: String,
    /// Шанс выпадения в процентах (0..=100)
    pub chance: f32,
}

impl LootEntry {
    pub fn new(item: impl Into<String>, chance: f32) -> Self {
        Self {
            item: item.into(),
            chance,
        }
    }
}

/// Как обходить loot table при смерти
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootPolicy {
    /// Роллим по порядку, спавним первый успешный и останавливаемся
    #[default]
    FirstSuccess,
    /// Роллим только первую запись таблицы
    SingleRoll,
    /// Каждая запись роллится независимо
    MultiRoll,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTable {
    pub entries: Vec<LootEntry>,
    pub policy: LootPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub flash_duration: f32,
    pub hurt_clips: Vec<String>,
    pub death_clips: Vec<String>,
    pub volume: f32,
    pub notification_duration: f32,
    /// Урон игроку при касании
    pub contact_damage: f32,
    pub ranged: Option<RangedAttack>,
    pub loot: LootTable,
    /// `Some` → после смерти RespawnPolicy пересоздаёт агента
    pub respawn_delay: Option<f32>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            flash_duration: 0.1,
            hurt_clips: Vec::new(),
            death_clips: Vec::new(),
            volume: 1.0,
            notification_duration: 1.5,
            contact_damage: 20.0,
            ranged: None,
            loot: LootTable::default(),
            respawn_delay: None,
        }
    }
}

/// Шаблон агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTemplate {
    pub enemy_type: EnemyTypeId,
    pub point_value: u32,
    pub max_health: f32,
    pub speeds: MoveSpeeds,

    pub chase_range: f32,
    /// Hysteresis: выход из Chase только дальше chase_range × factor
    pub chase_exit_factor: f32,
    pub stop_distance: f32,
    /// Search/Patrol считают точку достигнутой ближе этого
    pub arrive_distance: f32,
    pub require_line_of_sight_for_aggro: bool,
    pub wander: WanderMode,

    pub roam_time: f32,
    pub idle_time: f32,
    pub search_timeout: f32,
    pub reroute_timeout: f32,
    pub max_failed_path_attempts: u32,

    pub sensors: SensorConfig,
    pub stuck: StuckConfig,
    pub turn_rate_degrees: f32,
    pub combat: CombatConfig,
    pub obstacle_mask: ObstacleMask,
}

impl Default for AgentTemplate {
    fn default() -> Self {
        Self {
            enemy_type: EnemyTypeId::default(),
            point_value: 100,
            max_health: 100.0,
            speeds: MoveSpeeds::default(),
            chase_range: 10.0,
            chase_exit_factor: 1.2,
            stop_distance: 1.0,
            arrive_distance: 0.5,
            require_line_of_sight_for_aggro: false,
            wander: WanderMode::Roam,
            roam_time: 5.0,
            idle_time: 3.0,
            search_timeout: 5.0,
            reroute_timeout: 1.5,
            max_failed_path_attempts: 3,
            sensors: SensorConfig::default(),
            stuck: StuckConfig::default(),
            turn_rate_degrees: 240.0,
            combat: CombatConfig::default(),
            obstacle_mask: ObstacleMask::default(),
        }
    }
}

impl AgentTemplate {
    pub fn new(enemy_type: impl Into<String>) -> Self {
        Self {
            enemy_type: EnemyTypeId::new(enemy_type),
            ..Default::default()
        }
    }

    pub fn chase_exit_range(&self) -> f32 {
        self.chase_range * self.chase_exit_factor
    }

    pub fn turn_rate(&self) -> f32 {
        self.turn_rate_degrees.to_radians()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ConfigError::Invalid {
            enemy_type: self.enemy_type.clone(),
            reason,
        };

        if self.enemy_type.as_str().trim().is_empty() {
            return Err(invalid("enemy_type is empty".into()));
        }
        if !self.max_health.is_finite() || self.max_health <= 0.0 {
            return Err(invalid(format!("max_health must be positive, got {}", self.max_health)));
        }

        let non_negative = [
            ("chase_range", self.chase_range),
            ("stop_distance", self.stop_distance),
            ("arrive_distance", self.arrive_distance),
            ("speeds.patrol", self.speeds.patrol),
            ("speeds.chase", self.speeds.chase),
            ("speeds.roam", self.speeds.roam),
            ("speeds.reroute", self.speeds.reroute_speed()),
            ("roam_time", self.roam_time),
            ("idle_time", self.idle_time),
            ("search_timeout", self.search_timeout),
            ("reroute_timeout", self.reroute_timeout),
            ("sensors.detection_range", self.sensors.detection_range),
            ("sensors.body_radius", self.sensors.body_radius),
            ("turn_rate_degrees", self.turn_rate_degrees),
            ("combat.flash_duration", self.combat.flash_duration),
            ("combat.contact_damage", self.combat.contact_damage),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{} must be a non-negative number, got {}", name, value)));
            }
        }

        if self.stop_distance > self.chase_range {
            return Err(invalid(format!(
                "stop_distance ({}) exceeds chase_range ({})",
                self.stop_distance, self.chase_range
            )));
        }
        if self.chase_exit_factor < 1.0 {
            return Err(invalid(format!(
                "chase_exit_factor must be >= 1.0, got {}",
                self.chase_exit_factor
            )));
        }
        if self.sensors.ray_count == 0 {
            return Err(invalid("sensors.ray_count must be at least 1".into()));
        }
        if !self.stuck.sample_interval.is_finite() || self.stuck.sample_interval <= 0.0 {
            return Err(invalid("stuck.sample_interval must be positive".into()));
        }
        if let Some(ranged) = self.combat.ranged {
            if !ranged.fire_rate.is_finite() || ranged.fire_rate <= 0.0 {
                return Err(invalid("combat.ranged.fire_rate must be positive".into()));
            }
        }
        for entry in &self.combat.loot.entries {
            if !(0.0..=100.0).contains(&entry.chance) {
                return Err(invalid(format!(
                    "loot '{}' chance {} is outside 0..=100",
                    entry.item, entry.chance
                )));
            }
        }
        if let Some(delay) = self.combat.respawn_delay {
            if !delay.is_finite() || delay < 0.0 {
                return Err(invalid(format!("combat.respawn_delay must be non-negative, got {}", delay)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_is_valid() {
        let template = AgentTemplate::default();
        assert!(template.validate().is_ok());
        assert_eq!(template.chase_exit_range(), 12.0);
        assert_eq!(template.max_failed_path_attempts, 3);
    }

    #[test]
    fn test_reroute_speed_defaults_to_patrol_fraction() {
        let speeds = MoveSpeeds::default();
        assert!((speeds.reroute_speed() - 1.6).abs() < 1e-6);

        let explicit = MoveSpeeds {
            reroute: Some(3.0),
            ..Default::default()
        };
        assert_eq!(explicit.reroute_speed(), 3.0);
    }

    #[test]
    fn test_stop_distance_beyond_chase_range_rejected() {
        let template = AgentTemplate {
            stop_distance: 15.0,
            ..AgentTemplate::new("Broken")
        };
        assert!(matches!(template.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_loot_chance_out_of_range_rejected() {
        let mut template = AgentTemplate::new("Greedy");
        template.combat.loot.entries.push(LootEntry::new("coin", 120.0));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_zero_rays_rejected() {
        let mut template = AgentTemplate::new("Blind");
        template.sensors.ray_count = 0;
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_negative_range_rejected() {
        let template = AgentTemplate {
            chase_range: -1.0,
            stop_distance: 0.0,
            ..AgentTemplate::new("Inverted")
        };
        let err = template.validate().unwrap_err();
        assert!(err.to_string().contains("chase_range"), "{}", err);
    }
}
