//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: identity агентов (EnemyTypeId, AgentHandle), Health, Player
//! - movement: поза агента (Pose) и yaw helpers

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
