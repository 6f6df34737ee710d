//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;

pub use components::{Actor, Enemy, Name, Navigation, Player, Projectile};
