//! Orb Gaze - look at orbs to collect them, don't look at the red boxes
//!
//! Core modules:
//! - `sim`: Deterministic interaction core (gaze dwell, spawners, round clock)
//! - `host`: Seams to the rendering and presentation layers
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Live-tunable game configuration

pub mod host;
pub mod platform;
pub mod settings;
pub mod sim;

pub use host::{HeadlessScene, HudEvent, HudLog, HudSink, SceneHost};
pub use settings::{Settings, SettingsError};
pub use sim::{EndReason, GameState, RoundController, RoundPhase, TargetId, TargetKind};

/// Game configuration constants
pub mod consts {
    /// Milliseconds to dwell on an orb before it is collected
    pub const DEFAULT_ORB_GAZE_MS: u32 = 500;
    /// Milliseconds to dwell on a danger box before the round ends
    pub const DEFAULT_DANGER_GAZE_MS: u32 = 500;

    /// Spawner caps (concurrently live targets per kind)
    pub const DEFAULT_MAX_ORBS: u32 = 12;
    pub const DEFAULT_MAX_DANGERS: u32 = 5;

    /// Spawner intervals
    pub const DEFAULT_ORB_SPAWN_INTERVAL_MS: u32 = 700;
    pub const DEFAULT_DANGER_SPAWN_INTERVAL_MS: u32 = 1800;

    /// Batch seeded at round start
    pub const DEFAULT_INITIAL_ORBS: u32 = 6;
    pub const DEFAULT_INITIAL_DANGERS: u32 = 3;

    pub const DEFAULT_ROUND_SECS: u32 = 60;

    /// Round clock period
    pub const CLOCK_TICK_MS: u64 = 1000;

    /// Floor for any configured dwell (keeps the interaction responsive)
    pub const MIN_GAZE_MS: u32 = 1;
    /// Floor for spawner intervals so a bad value can't flood the scene
    pub const MIN_SPAWN_INTERVAL_MS: u32 = 50;

    /// Spawn ring around the viewer (meters)
    pub const SPAWN_RADIUS_MIN: f32 = 3.0;
    pub const SPAWN_RADIUS_SPAN: f32 = 8.0;
    pub const SPAWN_HEIGHT_MIN: f32 = 0.9;
    pub const SPAWN_HEIGHT_SPAN: f32 = 1.6;
    /// Dangers hover lower, but never below this
    pub const DANGER_DROP: f32 = 0.6;
    pub const DANGER_MIN_HEIGHT: f32 = 0.5;
}
