use thiserror::Error;

use crate::components::EnemyTypeId;

/// Ошибки загрузки/валидации agent templates
///
/// Tick-ядро никогда не возвращает ошибки: всё, что может сломаться,
/// ловится здесь, до спавна агентов.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid template '{enemy_type}': {reason}")]
    Invalid {
        enemy_type: EnemyTypeId,
        reason: String,
    },

    #[error("Duplicate enemy type: {0}")]
    DuplicateEnemyType(EnemyTypeId),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
