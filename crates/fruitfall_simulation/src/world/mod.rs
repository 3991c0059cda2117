//! World geometry для сенсоров агентов.
//!
//! Симуляция headless: вместо physics engine агенты спрашивают `RayCaster`.
//! Хост может подставить свою реализацию (engine raycast, navmesh и т.д.),
//! по умолчанию используется `ObstacleField` из простых примитивов.

pub mod obstacles;

pub use obstacles::{Obstacle, ObstacleField, ObstacleMask, ObstacleShape, RayCaster, RayHit};
