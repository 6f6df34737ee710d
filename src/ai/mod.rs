//! AI module
//!
//! Finite state machine driver plus the Patrol, Hunt and Attack states
//! enemies run on top of it.

mod fsm;
mod states;

pub use fsm::{AiCommand, AiComponent, AiContext, State, StateName, Transition, UnknownState};
pub use states::{AiTuning, AttackState, HuntState, PatrolState, enemy_brain};
