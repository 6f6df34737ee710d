//! Finite State Machine for AI Behavior
//!
//! Each AI-driven actor owns an `AiComponent`: a table of registered states
//! keyed by `StateName` and a pointer to the current one. States
//! encapsulate behavior with enter/update/exit lifecycle hooks and ask for
//! transitions by returning a `Transition` from `update`.
//!
//! # Example
//!
//! ```ignore
//! let mut ai = AiComponent::new();
//! ai.register_state(PatrolState::default());
//! ai.register_state(HuntState::default());
//! ai.register_state(AttackState::default());
//!
//! ai.change_state(StateName::Patrol, &mut ctx);
//! ai.update(&mut ctx); // may move to Hunt
//! ```

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::RngCore;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::states::AiTuning;
use crate::ecs::Actor;
use crate::map::Map;

// ============================================================================
// State Names
// ============================================================================

/// Names of the registered AI states
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StateName {
    Patrol,
    Hunt,
    Attack,
}

impl StateName {
    /// Every state name
    pub const ALL: [StateName; 3] = [StateName::Patrol, StateName::Hunt, StateName::Attack];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StateName::Patrol => "Patrol",
            StateName::Hunt => "Hunt",
            StateName::Attack => "Attack",
        }
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state name that matches no `StateName`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown AI state: {}", self.0)
    }
}

impl std::error::Error for UnknownState {}

impl FromStr for StateName {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

// ============================================================================
// Context
// ============================================================================

/// Requests a state makes of the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiCommand {
    /// Spawn a projectile
    FireProjectile {
        /// Spawn position
        origin: Vec2,
        /// Initial velocity
        velocity: Vec2,
    },
}

/// Everything a state may read or change during one tick
pub struct AiContext<'a> {
    /// Delta time for this tick
    pub dt: f32,
    /// Shared level map
    pub map: &'a Map,
    /// The actor this AI drives
    pub actor: &'a mut Actor,
    /// Live player position
    pub player_position: Vec2,
    /// Distances and timings
    pub tuning: &'a AiTuning,
    /// Randomness for goal selection
    pub rng: &'a mut dyn RngCore,
    /// Output buffer for world requests
    pub commands: &'a mut Vec<AiCommand>,
}

impl AiContext<'_> {
    /// Euclidean distance from the actor to the player
    #[must_use]
    pub fn distance_to_player(&self) -> f32 {
        self.actor.position().distance(self.player_position)
    }
}

impl fmt::Debug for AiContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiContext")
            .field("dt", &self.dt)
            .field("actor", &self.actor)
            .field("player_position", &self.player_position)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// State Trait
// ============================================================================

/// A state in the finite state machine.
///
/// The lifecycle is:
///
/// 1. `enter()` - Called once when the driver switches to this state
/// 2. `update()` - Called each tick while in this state
/// 3. `exit()` - Called once when leaving this state
pub trait State: fmt::Debug + Send + Sync {
    /// Name the state is registered under.
    fn name(&self) -> StateName;

    /// Called when entering this state.
    fn enter(&mut self, _ctx: &mut AiContext<'_>) {}

    /// Called each tick while in this state.
    ///
    /// Returns a `Transition` to indicate whether to stay or change states.
    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition;

    /// Called when exiting this state.
    fn exit(&mut self, _ctx: &mut AiContext<'_>) {}
}

// ============================================================================
// Transition
// ============================================================================

/// Represents a state transition decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the current state.
    None,
    /// Switch to the named state.
    To(StateName),
}

// ============================================================================
// AI Component
// ============================================================================

/// Per-actor state machine driver.
///
/// Switching to a name that was never registered is not fatal: the
/// diagnostic is logged and the driver becomes inert (updates do nothing)
/// until a later `change_state` succeeds.
#[derive(Default)]
pub struct AiComponent {
    /// Registered states
    states: FxHashMap<StateName, Box<dyn State>>,
    /// Current active state, if any
    current: Option<StateName>,
}

impl AiComponent {
    /// Create a driver with no states
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state under its own name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register_state<S: State + 'static>(&mut self, state: S) {
        self.states.insert(state.name(), Box::new(state));
    }

    /// Builder form of `register_state`
    #[must_use]
    pub fn with_state<S: State + 'static>(mut self, state: S) -> Self {
        self.register_state(state);
        self
    }

    /// Leave the current state and enter `name`.
    ///
    /// Returns `false` (and leaves the driver without a state) if `name` is
    /// not registered.
    pub fn change_state(&mut self, name: StateName, ctx: &mut AiContext<'_>) -> bool {
        let previous = self.exit_current(ctx);

        match self.states.get_mut(&name) {
            Some(state) => {
                log::debug!(
                    "AI state change: {} -> {name}",
                    previous.map_or("none", |p| p.as_str())
                );
                self.current = Some(name);
                state.enter(ctx);
                true
            }
            None => {
                log::warn!("Could not find AI state {name} in state map");
                false
            }
        }
    }

    /// `change_state` for names coming from configuration or scripts
    pub fn change_state_named(&mut self, name: &str, ctx: &mut AiContext<'_>) -> bool {
        match name.parse::<StateName>() {
            Ok(name) => self.change_state(name, ctx),
            Err(e) => {
                self.exit_current(ctx);
                log::warn!("{e}");
                false
            }
        }
    }

    /// Update the current state and apply the transition it returns
    pub fn update(&mut self, ctx: &mut AiContext<'_>) {
        let Some(name) = self.current else {
            return;
        };
        let Some(state) = self.states.get_mut(&name) else {
            return;
        };

        if let Transition::To(next) = state.update(ctx) {
            self.change_state(next, ctx);
        }
    }

    /// Name of the current state
    #[must_use]
    pub fn current_state(&self) -> Option<StateName> {
        self.current
    }

    /// Check if the driver is in the given state
    #[must_use]
    pub fn is_in_state(&self, name: StateName) -> bool {
        self.current == Some(name)
    }

    /// Check if a state is registered
    #[must_use]
    pub fn has_state(&self, name: StateName) -> bool {
        self.states.contains_key(&name)
    }

    fn exit_current(&mut self, ctx: &mut AiContext<'_>) -> Option<StateName> {
        let previous = self.current.take();
        if let Some(name) = previous
            && let Some(state) = self.states.get_mut(&name)
        {
            state.exit(ctx);
        }
        previous
    }
}

impl fmt::Debug for AiComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<_> = self.states.keys().map(StateName::as_str).collect();
        registered.sort_unstable();
        f.debug_struct("AiComponent")
            .field("current", &self.current)
            .field("registered", &registered)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
