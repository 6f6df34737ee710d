//! Patrol, Hunt and Attack behaviors for enemies
//!
//! Patrol and Hunt follow a buffer of waypoints produced by the map's path
//! search and pop the next one whenever the actor reaches its goal or stops
//! moving. A failed search never stalls an actor: it falls back to heading
//! straight for the target.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fsm::{AiCommand, AiComponent, AiContext, State, StateName, Transition};
use crate::core::ConfigError;

// ============================================================================
// Tuning
// ============================================================================

/// Distances and timings shared by the enemy states
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Patrol switches to Hunt inside this distance, Hunt gives up beyond it
    pub hunt_distance: f32,
    /// Hunt switches to Attack inside this distance, Attack gives up beyond it
    pub attack_distance: f32,
    /// How close counts as having reached a waypoint
    pub waypoint_epsilon: f32,
    /// Seconds between shots while attacking
    pub shoot_interval: f32,
    /// Projectile speed in world units per second
    pub projectile_speed: f32,
    /// First patrol goal; the world center when unset
    pub patrol_anchor: Option<Vec2>,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            hunt_distance: 400.0,
            attack_distance: 10.0,
            waypoint_epsilon: 1.0,
            shoot_interval: 1.0,
            projectile_speed: 400.0,
            patrol_anchor: None,
        }
    }
}

impl AiTuning {
    /// Set the hunt threshold
    #[must_use]
    pub fn with_hunt_distance(mut self, distance: f32) -> Self {
        self.hunt_distance = distance;
        self
    }

    /// Set the attack threshold
    #[must_use]
    pub fn with_attack_distance(mut self, distance: f32) -> Self {
        self.attack_distance = distance;
        self
    }

    /// Set the shot interval
    #[must_use]
    pub fn with_shoot_interval(mut self, seconds: f32) -> Self {
        self.shoot_interval = seconds;
        self
    }

    /// Set the first patrol goal
    #[must_use]
    pub fn with_patrol_anchor(mut self, anchor: Vec2) -> Self {
        self.patrol_anchor = Some(anchor);
        self
    }

    /// Check the thresholds can't make Hunt and Attack fight over one distance
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("hunt_distance", self.hunt_distance),
            ("attack_distance", self.attack_distance),
            ("waypoint_epsilon", self.waypoint_epsilon),
            ("shoot_interval", self.shoot_interval),
            ("projectile_speed", self.projectile_speed),
        ];
        if let Some((field, value)) = positive
            .into_iter()
            .find(|(_, v)| !v.is_finite() || *v <= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "{field} must be positive, got {value}"
            )));
        }

        if self.attack_distance >= self.hunt_distance {
            return Err(ConfigError::Invalid(format!(
                "attack_distance ({}) must be less than hunt_distance ({})",
                self.attack_distance, self.hunt_distance
            )));
        }
        Ok(())
    }
}

/// Driver with Patrol, Hunt and Attack registered
#[must_use]
pub fn enemy_brain() -> AiComponent {
    AiComponent::new()
        .with_state(PatrolState::default())
        .with_state(HuntState::default())
        .with_state(AttackState::default())
}

// ============================================================================
// Waypoint following
// ============================================================================

/// Pop the next waypoint once the actor reached its goal or got stuck,
/// replanning toward `target` when the buffer runs dry.
fn advance(
    ctx: &mut AiContext<'_>,
    pending: &mut VecDeque<Vec2>,
    target: impl FnOnce(&mut AiContext<'_>) -> Option<Vec2>,
    fallback: Vec2,
) {
    let actor = &*ctx.actor;
    if !actor.reached_goal(ctx.tuning.waypoint_epsilon) && !actor.is_stuck() {
        return;
    }

    if let Some(next) = pending.pop_front() {
        ctx.actor.set_goal(next);
        return;
    }

    let target = target(ctx);
    plan(ctx, pending, target, fallback);
}

/// Refill `pending` with a path toward `target` and head for its first
/// waypoint; head straight for `fallback` if there is no path.
///
/// Paths end on the center of the target's cell, so the exact target is
/// appended as a final leg when it lies elsewhere in that cell.
fn plan(
    ctx: &mut AiContext<'_>,
    pending: &mut VecDeque<Vec2>,
    target: Option<Vec2>,
    fallback: Vec2,
) {
    pending.clear();
    if let Some(target) = target {
        let path = ctx.map.find_path(ctx.actor.position(), target);
        pending.extend(path.waypoints);
        if pending.back().is_some_and(|last| *last != target) {
            pending.push_back(target);
        }
    }

    match pending.pop_front() {
        Some(next) => ctx.actor.set_goal(next),
        None => {
            log::trace!("No path available, heading for {fallback}");
            ctx.actor.set_goal(fallback);
        }
    }
}

// ============================================================================
// States
// ============================================================================

/// Wander between random open cells until the player comes close
#[derive(Debug, Default)]
pub struct PatrolState {
    pending: VecDeque<Vec2>,
}

impl PatrolState {
    /// Waypoints still to visit
    #[must_use]
    pub fn pending(&self) -> &VecDeque<Vec2> {
        &self.pending
    }
}

impl State for PatrolState {
    fn name(&self) -> StateName {
        StateName::Patrol
    }

    fn enter(&mut self, ctx: &mut AiContext<'_>) {
        let anchor = ctx
            .tuning
            .patrol_anchor
            .unwrap_or_else(|| ctx.map.grid().bounds().center());
        self.pending.clear();
        ctx.actor.set_goal(anchor);
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        advance(
            ctx,
            &mut self.pending,
            |ctx| ctx.map.random_open_position(&mut *ctx.rng),
            Vec2::ZERO,
        );

        if ctx.distance_to_player() < ctx.tuning.hunt_distance {
            Transition::To(StateName::Hunt)
        } else {
            Transition::None
        }
    }
}

/// Follow a path to the player, replanning when it runs out
#[derive(Debug, Default)]
pub struct HuntState {
    pending: VecDeque<Vec2>,
}

impl HuntState {
    /// Waypoints still to visit
    #[must_use]
    pub fn pending(&self) -> &VecDeque<Vec2> {
        &self.pending
    }
}

impl State for HuntState {
    fn name(&self) -> StateName {
        StateName::Hunt
    }

    fn enter(&mut self, ctx: &mut AiContext<'_>) {
        let player = ctx.player_position;
        plan(ctx, &mut self.pending, Some(player), player);
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        let player = ctx.player_position;
        advance(ctx, &mut self.pending, |_| Some(player), player);

        let distance = ctx.distance_to_player();
        let mut transition = Transition::None;
        if distance > ctx.tuning.hunt_distance {
            transition = Transition::To(StateName::Patrol);
        }
        // Checked last so it wins if both hold
        if distance < ctx.tuning.attack_distance {
            transition = Transition::To(StateName::Attack);
        }
        transition
    }
}

/// Close in on the player directly and shoot on a timer
#[derive(Debug, Default)]
pub struct AttackState {
    /// Seconds until the next shot
    shot_timer: f32,
}

impl AttackState {
    #[must_use]
    pub fn shot_timer(&self) -> f32 {
        self.shot_timer
    }
}

impl State for AttackState {
    fn name(&self) -> StateName {
        StateName::Attack
    }

    fn update(&mut self, ctx: &mut AiContext<'_>) -> Transition {
        let player = ctx.player_position;
        ctx.actor.set_goal(player);

        if ctx.distance_to_player() > ctx.tuning.attack_distance {
            return Transition::To(StateName::Hunt);
        }

        self.shot_timer -= ctx.dt;
        if self.shot_timer <= 0.0 {
            let origin = ctx.actor.position();
            let velocity = (player - origin).normalize_or_zero() * ctx.tuning.projectile_speed;
            ctx.commands
                .push(AiCommand::FireProjectile { origin, velocity });
            self.shot_timer = ctx.tuning.shoot_interval;
        }

        Transition::None
    }
}

// ============================================================================
// Tests
// ============================================================================
