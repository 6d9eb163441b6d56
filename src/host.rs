//! Collaborator seams
//!
//! The controller talks to the rendering layer through [`SceneHost`] and to
//! the HUD through [`HudSink`]. Both are assumed to succeed or silently no-op.

use std::collections::BTreeSet;

use glam::Vec3;

use crate::sim::{EndReason, ReticleFeedback, TargetId, TargetKind};

/// Rendering layer
pub trait SceneHost {
    /// Create a target entity. `None` means the scene could not create it;
    /// the spawn is skipped.
    fn spawn_target(&mut self, kind: TargetKind, position: Vec3) -> Option<TargetId>;

    fn destroy_target(&mut self, id: TargetId);

    fn set_reticle_feedback(&mut self, _feedback: ReticleFeedback) {}

    /// Collect burst/sound at the orb's last position
    fn collected_feedback(&mut self, _id: TargetId, _position: Vec3) {}
}

/// Presentation layer (HUD, menus)
pub trait HudSink {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_time_changed(&mut self, _seconds_remaining: u32) {}
    fn on_round_ended(&mut self, _reason: EndReason) {}
    fn on_round_started(&mut self) {}
}

impl HudSink for () {}

/// In-memory scene used by the native demo and tests
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    next_id: u32,
    pub live: BTreeSet<TargetId>,
    pub reticle: ReticleFeedback,
    pub spawned: u32,
    pub collected: u32,
    /// Pretend the renderer is gone (spawns fail)
    pub unavailable: bool,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: BTreeSet::new(),
            reticle: ReticleFeedback::None,
            spawned: 0,
            collected: 0,
            unavailable: false,
        }
    }
}

impl SceneHost for HeadlessScene {
    fn spawn_target(&mut self, _kind: TargetKind, _position: Vec3) -> Option<TargetId> {
        if self.unavailable {
            return None;
        }
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        self.spawned += 1;
        Some(id)
    }

    fn destroy_target(&mut self, id: TargetId) {
        self.live.remove(&id);
    }

    fn set_reticle_feedback(&mut self, feedback: ReticleFeedback) {
        self.reticle = feedback;
    }

    fn collected_feedback(&mut self, _id: TargetId, _position: Vec3) {
        self.collected += 1;
    }
}

/// HUD notification, as recorded by [`HudLog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudEvent {
    RoundStarted,
    ScoreChanged(u32),
    TimeChanged(u32),
    RoundEnded(EndReason),
}

/// Records HUD notifications in order
#[derive(Debug, Clone, Default)]
pub struct HudLog {
    pub events: Vec<HudEvent>,
}

impl HudLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ended(&self) -> Vec<EndReason> {
        self.events
            .iter()
            .filter_map(|e| match e {
                HudEvent::RoundEnded(reason) => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn last_score(&self) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match e {
            HudEvent::ScoreChanged(s) => Some(*s),
            _ => None,
        })
    }

    pub fn last_time(&self) -> Option<u32> {
        self.events.iter().rev().find_map(|e| match e {
            HudEvent::TimeChanged(t) => Some(*t),
            _ => None,
        })
    }
}

impl HudSink for HudLog {
    fn on_score_changed(&mut self, score: u32) {
        self.events.push(HudEvent::ScoreChanged(score));
    }

    fn on_time_changed(&mut self, seconds_remaining: u32) {
        self.events.push(HudEvent::TimeChanged(seconds_remaining));
    }

    fn on_round_ended(&mut self, reason: EndReason) {
        self.events.push(HudEvent::RoundEnded(reason));
    }

    fn on_round_started(&mut self) {
        self.events.push(HudEvent::RoundStarted);
    }
}
