//! Core engine module
//!
//! Contains the fixed-step Engine, its configuration, events and diagnostics

mod config;
mod debug;
mod engine;
mod events;
mod time;

pub use config::{ConfigError, GameConfig, MapSource};
pub use debug::{DebugInfo, Stage, StageCost};
pub use engine::{Engine, EngineConfig, EngineContext, EngineError, Game};
pub use events::{EventQueue, GameEvent};
pub use time::Time;
