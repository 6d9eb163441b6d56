//! Game state and core interaction types
//!
//! One `GameState` per controller; collaborators never hold it.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque handle into the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u32);

impl TargetId {
    /// Accept a numeric id from a JS host; NaN, fractional or out-of-range
    /// values are rejected.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !(0.0..=u32::MAX as f64).contains(&value) || value.fract() != 0.0 {
            return None;
        }
        Some(TargetId(value as u32))
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happens when a target is dwelled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Orb: +1 score
    Collectible,
    /// Danger box: ends the round
    Hazard,
}

impl TargetKind {
    pub const ALL: [TargetKind; 2] = [TargetKind::Collectible, TargetKind::Hazard];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Collectible => "collectible",
            TargetKind::Hazard => "hazard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "collectible" | "collect" | "orb" => Some(TargetKind::Collectible),
            "hazard" | "danger" => Some(TargetKind::Hazard),
            _ => None,
        }
    }

    /// Reticle state while this kind is hovered
    pub fn hover_feedback(&self) -> ReticleFeedback {
        match self {
            TargetKind::Collectible => ReticleFeedback::HoveringCollectible,
            TargetKind::Hazard => ReticleFeedback::HoveringHazard,
        }
    }
}

/// A spawned interactable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    pub kind: TargetKind,
    pub position: Vec3,
}

/// Why a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    TimeExpired,
    HazardObserved,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::TimeExpired => "time expired",
            EndReason::HazardObserved => "hazard observed",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Menu shown, nothing running
    #[default]
    Idle,
    /// Spawners, clock and dwell all live
    Active,
    /// Menu reopened mid-round; everything frozen
    Paused,
    /// Terminal until restart
    Ended(EndReason),
}

/// Reticle hint for the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReticleFeedback {
    #[default]
    None,
    HoveringCollectible,
    HoveringHazard,
}

/// Complete interaction state (serializable snapshot)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub phase: RoundPhase,
    /// Non-decreasing while a round is active
    pub score: u32,
    pub round_seconds_remaining: u32,
    /// Live targets keyed by id (stable iteration order)
    pub targets: BTreeMap<TargetId, Target>,
    /// Target under the single gaze ray, if any
    pub hovered: Option<TargetId>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `running` flag: a round is in progress (possibly paused)
    pub fn running(&self) -> bool {
        matches!(self.phase, RoundPhase::Active | RoundPhase::Paused)
    }

    /// `paused` flag: anything but an active round
    pub fn paused(&self) -> bool {
        self.phase != RoundPhase::Active
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.phase {
            RoundPhase::Ended(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn live_count(&self, kind: TargetKind) -> usize {
        self.targets.values().filter(|t| t.kind == kind).count()
    }

    pub fn is_live(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(&id)
    }

    pub fn insert_target(&mut self, target: Target) {
        self.targets.insert(target.id, target);
    }

    /// Remove a live target; `None` if it was already gone
    pub fn remove_target(&mut self, id: TargetId) -> Option<Target> {
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.targets.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u32, kind: TargetKind) -> Target {
        Target {
            id: TargetId(id),
            kind,
            position: Vec3::ZERO,
        }
    }

    #[test]
    fn test_flags_follow_phase() {
        let mut state = GameState::new();
        assert!(!state.running());
        assert!(state.paused());

        state.phase = RoundPhase::Active;
        assert!(state.running() && !state.paused());

        state.phase = RoundPhase::Paused;
        assert!(state.running() && state.paused());

        state.phase = RoundPhase::Ended(EndReason::TimeExpired);
        assert!(!state.running());
        assert_eq!(state.end_reason(), Some(EndReason::TimeExpired));
    }

    #[test]
    fn test_live_counts_and_removal() {
        let mut state = GameState::new();
        state.insert_target(target(1, TargetKind::Collectible));
        state.insert_target(target(2, TargetKind::Collectible));
        state.insert_target(target(3, TargetKind::Hazard));
        state.hovered = Some(TargetId(2));

        assert_eq!(state.live_count(TargetKind::Collectible), 2);
        assert_eq!(state.live_count(TargetKind::Hazard), 1);

        assert!(state.remove_target(TargetId(2)).is_some());
        assert_eq!(state.hovered, None);
        assert!(state.remove_target(TargetId(2)).is_none());
        assert_eq!(state.live_count(TargetKind::Collectible), 1);
    }

    #[test]
    fn test_target_id_from_js_number() {
        assert_eq!(TargetId::from_f64(0.0), Some(TargetId(0)));
        assert_eq!(TargetId::from_f64(42.0), Some(TargetId(42)));
        assert_eq!(TargetId::from_f64(u32::MAX as f64), Some(TargetId(u32::MAX)));
        assert_eq!(TargetId::from_f64(f64::NAN), None);
        assert_eq!(TargetId::from_f64(f64::INFINITY), None);
        assert_eq!(TargetId::from_f64(3.5), None);
        assert_eq!(TargetId::from_f64(-1.0), None);
        assert_eq!(TargetId::from_f64(u32::MAX as f64 + 1.0), None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(TargetKind::from_str("Danger"), Some(TargetKind::Hazard));
        assert_eq!(TargetKind::from_str("collect"), Some(TargetKind::Collectible));
        assert_eq!(TargetKind::from_str("bomb"), None);
        assert_eq!(EndReason::HazardObserved.to_string(), "hazard observed");
    }
}
