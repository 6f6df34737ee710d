//! Grid-map pathfinding and enemy AI
//!
//! This crate provides:
//! - Grid levels loaded from CSV or generated with random walks
//! - A walkability graph with BFS, greedy best-first and A* path search
//! - Rectangle-vs-barrier and circle overlap collision queries
//! - A per-actor state machine driving Patrol, Hunt and Attack behaviors
//! - A headless fixed-step engine with an ECS world (hecs) and a sample game

pub mod ai;
pub mod core;
pub mod ecs;
pub mod game;
pub mod map;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{AiComponent, AiContext, AiTuning, State, StateName, Transition};
    pub use crate::core::{
        Engine, EngineConfig, EngineContext, EngineError, GameConfig, GameEvent, MapSource, Game,
    };
    pub use crate::ecs::{Actor, Enemy, Name, Navigation, Player, Projectile};
    pub use crate::game::HuntGame;
    pub use crate::map::{Grid, Map, MapError, PathResult, SearchMode};
    pub use crate::physics::{Circle, Rect};
    pub use glam::Vec2;
}
