//! TemplateLibrary — загрузка `[[agent]]` таблиц из TOML.
//!
//! ```toml
//! [[agent]]
//! enemy_type = "TomatoEnemy"
//! point_value = 150
//! chase_range = 8.0
//!
//! [agent.combat.loot]
//! policy = "multi_roll"
//! entries = [{ item = "HealthPack", chance = 25.0 }]
//! ```

use bevy::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{AgentTemplate, ConfigError, Result};
use crate::components::EnemyTypeId;

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    agent: Vec<AgentTemplate>,
}

/// Все templates уровня, keyed by `enemy_type`
///
/// Порядок загрузки сохраняется (для детерминированного спавна).
#[derive(Resource, Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<AgentTemplate>,
    by_type: HashMap<EnemyTypeId, usize>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: TemplateFile = toml::from_str(source)?;

        let mut library = Self::new();
        for template in file.agent {
            library.insert(template)?;
        }
        Ok(library)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let library = Self::from_toml_str(&source)?;

        crate::log_info(&format!(
            "📦 Loaded {} agent templates from {}",
            library.len(),
            path.display()
        ));
        Ok(library)
    }

    /// Валидирует и добавляет template; дубликаты `enemy_type` — ошибка
    pub fn insert(&mut self, template: AgentTemplate) -> Result<()> {
        template.validate()?;
        if self.by_type.contains_key(&template.enemy_type) {
            return Err(ConfigError::DuplicateEnemyType(template.enemy_type));
        }

        self.by_type
            .insert(template.enemy_type.clone(), self.templates.len());
        self.templates.push(template);
        Ok(())
    }

    pub fn get(&self, enemy_type: &EnemyTypeId) -> Option<&AgentTemplate> {
        self.by_type
            .get(enemy_type)
            .and_then(|&index| self.templates.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LootPolicy, WanderMode};

    const LEVEL: &str = r#"
        [[agent]]
        enemy_type = "TomatoEnemy"
        point_value = 150
        chase_range = 8.0
        require_line_of_sight_for_aggro = true

        [agent.speeds]
        chase = 5.0

        [agent.combat.loot]
        policy = "multi_roll"
        entries = [
            { item = "HealthPack", chance = 25.0 },
            { item = "Coin", chance = 100.0 },
        ]

        [[agent]]
        enemy_type = "Guard"
        wander = "patrol"
        obstacle_mask = 1
    "#;

    #[test]
    fn test_parse_level_file() {
        let library = TemplateLibrary::from_toml_str(LEVEL).unwrap();
        assert_eq!(library.len(), 2);

        let tomato = library.get(&EnemyTypeId::new("TomatoEnemy")).unwrap();
        assert_eq!(tomato.point_value, 150);
        assert_eq!(tomato.chase_range, 8.0);
        assert!(tomato.require_line_of_sight_for_aggro);
        assert_eq!(tomato.speeds.chase, 5.0);
        // Не указанные поля — defaults
        assert_eq!(tomato.speeds.patrol, 2.0);
        assert_eq!(tomato.combat.loot.policy, LootPolicy::MultiRoll);
        assert_eq!(tomato.combat.loot.entries.len(), 2);

        let guard = library.get(&EnemyTypeId::new("Guard")).unwrap();
        assert_eq!(guard.wander, WanderMode::Patrol);
        assert_eq!(guard.obstacle_mask.0, 1);
    }

    #[test]
    fn test_duplicate_enemy_type_rejected() {
        let source = r#"
            [[agent]]
            enemy_type = "Twin"
            [[agent]]
            enemy_type = "Twin"
        "#;
        assert!(matches!(
            TemplateLibrary::from_toml_str(source),
            Err(ConfigError::DuplicateEnemyType(id)) if id.as_str() == "Twin"
        ));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let source = r#"
            [[agent]]
            enemy_type = "Broken"
            chase_range = 2.0
            stop_distance = 3.0
        "#;
        assert!(matches!(
            TemplateLibrary::from_toml_str(source),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            TemplateLibrary::from_toml_str("[[agent]\nenemy_type = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            TemplateLibrary::load("/definitely/not/here/agents.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
