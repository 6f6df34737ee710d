//! Common ECS components

use glam::Vec2;

use crate::physics::{Circle, Rect};

/// Position, movement goal and footprint of a 2D actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    /// Center of the actor in world space
    pub position: Vec2,
    /// Position at the start of the last movement step
    pub prev_position: Vec2,
    /// Where the actor is trying to go
    pub goal: Vec2,
    /// Velocity applied during the last movement step
    pub velocity: Vec2,
    /// Facing direction (unit length or zero)
    pub forward: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Actor {
    /// Create an actor standing still at `position`
    #[must_use]
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            prev_position: position,
            goal: position,
            velocity: Vec2::ZERO,
            forward: Vec2::X,
            width,
            height,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn prev_position(&self) -> Vec2 {
        self.prev_position
    }

    #[must_use]
    pub fn goal(&self) -> Vec2 {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Vec2) {
        self.goal = goal;
    }

    /// Move the actor without going through the movement system
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.prev_position = position;
    }

    /// Whether the last movement step left the actor where it was
    #[must_use]
    pub fn is_stuck(&self) -> bool {
        self.prev_position == self.position
    }

    /// Whether the actor is within `epsilon` of its goal
    #[must_use]
    pub fn reached_goal(&self, epsilon: f32) -> bool {
        self.position.distance(self.goal) < epsilon
    }

    /// Axis-aligned footprint
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.width, self.height)
    }

    /// Circle inscribed in the footprint
    #[must_use]
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.width.min(self.height) * 0.5)
    }
}

/// Goal-seeking movement parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Navigation {
    /// Movement speed in world units per second
    pub speed: f32,
    /// Distance at which the goal counts as reached and movement stops
    pub arrive_radius: f32,
    /// Set when the last step was refused by the barrier check
    pub blocked: bool,
}

impl Navigation {
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            arrive_radius: 0.5,
            blocked: false,
        }
    }
}

/// A projectile flying in a straight line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Projectile {
    #[must_use]
    pub fn circle(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }
}

/// Marks the player entity
#[derive(Debug, Clone, Copy, Default)]
pub struct Player {
    /// Number of projectile hits taken
    pub hits: u32,
}

/// Marks AI-controlled enemies
#[derive(Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
