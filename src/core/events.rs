//! Event Queue System for Decoupled Communication
//!
//! Double-buffered queue of gameplay events. Systems push what happened
//! during tick N and observers read it during tick N+1, so what a reader sees
//! never depends on system order within a tick.
//!
//! # Example
//!
//! ```ignore
//! // In the AI system
//! ctx.events.push(GameEvent::StateChanged {
//!     entity,
//!     from: Some(StateName::Patrol),
//!     to: StateName::Hunt,
//! });
//!
//! // Next tick, anywhere
//! for event in ctx.events.iter() {
//!     if let GameEvent::PlayerHit { .. } = event {
//!         hits += 1;
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;

use crate::ai::StateName;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened in the game world.
///
/// The `#[non_exhaustive]` attribute allows adding new variants without
/// breaking downstream code that uses wildcard patterns.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // AI Events
    // -------------------------------------------------------------------------
    /// An actor's AI switched state.
    StateChanged {
        /// The actor
        entity: Entity,
        /// Previous state, `None` for the first state
        from: Option<StateName>,
        /// New state
        to: StateName,
    },

    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// An actor fired a projectile.
    ProjectileFired {
        /// The shooter
        shooter: Entity,
        /// Spawn position
        origin: Vec2,
        /// Initial velocity
        velocity: Vec2,
    },

    /// A projectile reached the player.
    PlayerHit {
        /// The projectile that hit
        damage_source: Entity,
        /// Where the hit happened
        position: Vec2,
    },

    /// A projectile hit a wall or left the map.
    ProjectileDestroyed {
        /// The destroyed projectile
        entity: Entity,
        /// Last position
        position: Vec2,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
///
/// Events pushed during tick N are available for reading during tick N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<GameEvent>,
    /// Events from the previous tick, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Push an event to be processed next tick.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Called once per tick by the engine before the game update.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Events pushed this tick that are not yet visible to readers.
    #[inline]
    pub fn iter_pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    fn changed(to: StateName) -> GameEvent {
        GameEvent::StateChanged {
            entity: test_entity(),
            from: None,
            to,
        }
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(changed(StateName::Patrol));
        assert!(queue.is_empty(), "Events should not be visible before swap");
        assert_eq!(queue.iter_pending().count(), 1);

        queue.swap();
        assert_eq!(queue.len(), 1);
        let events: Vec<_> = queue.iter().collect();
        assert!(matches!(
            events[0],
            GameEvent::StateChanged {
                to: StateName::Patrol,
                ..
            }
        ));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(changed(StateName::Patrol));
        queue.swap();

        // Tick 2 pushes while tick 1's events are read
        queue.push(changed(StateName::Hunt));
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GameEvent::StateChanged {
                to: StateName::Patrol,
                ..
            }
        ));

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            GameEvent::StateChanged {
                to: StateName::Hunt,
                ..
            }
        ));
    }

    #[test]
    fn test_unread_events_expire_after_one_tick() {
        let mut queue = EventQueue::new();
        let projectile = test_entity();

        queue.push(GameEvent::PlayerHit {
            damage_source: projectile,
            position: Vec2::ZERO,
        });
        queue.push(GameEvent::ProjectileDestroyed {
            entity: projectile,
            position: Vec2::ONE,
        });
        assert_eq!(queue.iter_pending().count(), 2);

        queue.swap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter_pending().count(), 0);

        queue.swap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_projectile_fired_event() {
        let shooter = test_entity();
        let event = GameEvent::ProjectileFired {
            shooter,
            origin: Vec2::new(1.0, 2.0),
            velocity: Vec2::new(0.0, -400.0),
        };

        if let GameEvent::ProjectileFired {
            shooter: s,
            velocity,
            ..
        } = event
        {
            assert_eq!(s, shooter);
            assert!((velocity.length() - 400.0).abs() < f32::EPSILON);
        } else {
            panic!("Wrong event type");
        }
    }
}
