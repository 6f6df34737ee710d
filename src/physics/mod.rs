//! Collision detection module
//!
//! Rectangle and circle overlap tests for barrier queries and combat

mod collision;

pub use collision::{Circle, Rect};
