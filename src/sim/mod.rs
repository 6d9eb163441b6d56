//! Deterministic interaction module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual millisecond clock only (the host feeds elapsed time)
//! - Seeded RNG only
//! - Stable iteration order (by target ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod controller;
pub mod spawn;
pub mod state;
pub mod timers;

pub use autopilot::choose_gaze;
pub use controller::RoundController;
pub use spawn::{random_position, should_spawn};
pub use state::{
    EndReason, GameState, ReticleFeedback, RoundPhase, Target, TargetId, TargetKind,
};
pub use timers::{TimerId, TimerQueue};
