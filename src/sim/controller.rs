//! Gaze interaction & round controller
//!
//! Single owner of the `GameState`. Every entry point (gaze edges, menu
//! actions, timer expirations via `advance`) runs to completion before the
//! next one, so there is never more than one writer.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::spawn::{random_position, should_spawn};
use super::state::{EndReason, GameState, ReticleFeedback, RoundPhase, Target, TargetId, TargetKind};
use super::timers::{TimerId, TimerQueue};
use crate::consts::CLOCK_TICK_MS;
use crate::host::{HudSink, SceneHost};
use crate::settings::{Settings, SettingsError};

/// Scheduled work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    Dwell(TargetId),
    Spawn(TargetKind),
    ClockTick,
}

fn spawner_slot(kind: TargetKind) -> usize {
    match kind {
        TargetKind::Collectible => 0,
        TargetKind::Hazard => 1,
    }
}

pub struct RoundController<S: SceneHost, H: HudSink> {
    state: GameState,
    settings: Settings,
    scene: S,
    hud: H,
    rng: Pcg32,
    timers: TimerQueue<TimerEvent>,
    /// Pending dwell per gazed target (at most one entry with a single ray)
    dwell: BTreeMap<TargetId, TimerId>,
    spawners: [Option<TimerId>; 2],
    clock: Option<TimerId>,
}

impl<S: SceneHost, H: HudSink> RoundController<S, H> {
    pub fn new(settings: Settings, scene: S, hud: H, seed: u64) -> Self {
        let state = GameState {
            round_seconds_remaining: settings.round_duration(),
            ..GameState::new()
        };
        Self {
            state,
            settings,
            scene,
            hud,
            rng: Pcg32::seed_from_u64(seed),
            timers: TimerQueue::new(),
            dwell: BTreeMap::new(),
            spawners: [None, None],
            clock: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Live tuning; takes effect at the next acquire / spawner tick / round
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Apply a raw form value, keeping the previous value on bad input
    pub fn apply_setting(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.settings.apply_raw(key, value).inspect_err(|e| {
            log::warn!("Rejected setting: {}", e);
        })
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut H {
        &mut self.hud
    }

    /// Virtual time in ms since the controller was created
    pub fn now_ms(&self) -> u64 {
        self.timers.now()
    }

    pub fn has_pending_dwell(&self, id: TargetId) -> bool {
        self.dwell
            .get(&id)
            .is_some_and(|timer| self.timers.is_pending(*timer))
    }

    pub fn pending_dwell_count(&self) -> usize {
        self.dwell.len()
    }

    pub fn spawner_running(&self, kind: TargetKind) -> bool {
        self.spawners[spawner_slot(kind)].is_some()
    }

    pub fn clock_running(&self) -> bool {
        self.clock.is_some()
    }

    /// Number of scheduled timers of any kind
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    // === Round lifecycle ===

    /// Idle/Ended -> Active
    pub fn start_round(&mut self) {
        if self.state.running() {
            log::debug!("start_round ignored: round already running");
            return;
        }

        self.stop_all_timers();
        self.purge_targets();

        self.state.score = 0;
        self.state.round_seconds_remaining = self.settings.round_duration();
        self.state.phase = RoundPhase::Active;

        for kind in TargetKind::ALL {
            for _ in 0..self.settings.initial_count(kind) {
                self.spawn_one(kind);
            }
        }
        self.arm_spawners();
        self.arm_clock();

        log::info!(
            "Round started ({}s, {} orbs, {} dangers)",
            self.state.round_seconds_remaining,
            self.state.live_count(TargetKind::Collectible),
            self.state.live_count(TargetKind::Hazard)
        );
        self.hud.on_round_started();
        self.hud.on_score_changed(0);
        self.hud.on_time_changed(self.state.round_seconds_remaining);
    }

    /// Active -> Paused (menu opened)
    pub fn pause(&mut self) {
        if self.state.phase != RoundPhase::Active {
            return;
        }
        self.state.phase = RoundPhase::Paused;
        self.stop_all_timers();
        log::info!("Paused ({}s left)", self.state.round_seconds_remaining);
    }

    /// Paused -> Active. A target still under the ray must be re-acquired
    /// before a new dwell starts.
    pub fn resume(&mut self) {
        if self.state.phase != RoundPhase::Paused {
            return;
        }
        self.state.phase = RoundPhase::Active;
        self.arm_spawners();
        self.arm_clock();
        log::info!("Resumed");
    }

    /// Leave a running round for the menu without ending it
    pub fn back_to_menu(&mut self) {
        if !self.state.running() {
            return;
        }
        self.state.phase = RoundPhase::Idle;
        self.stop_all_timers();
        log::info!("Returned to menu (score {})", self.state.score);
    }

    /// Any phase -> Idle, purging targets and timers
    pub fn restart(&mut self) {
        self.timers.clear();
        self.spawners = [None, None];
        self.clock = None;
        self.dwell.clear();
        self.purge_targets();
        self.state.phase = RoundPhase::Idle;
        self.state.score = 0;
        self.state.round_seconds_remaining = self.settings.round_duration();
        self.hud.on_score_changed(0);
        self.hud.on_time_changed(self.state.round_seconds_remaining);
        log::info!("Restarted");
    }

    /// Active -> Ended("time expired")
    pub fn expire_clock(&mut self) {
        if self.state.phase != RoundPhase::Active {
            return;
        }
        self.state.round_seconds_remaining = 0;
        self.end_round(EndReason::TimeExpired);
    }

    /// Active -> Ended("hazard observed")
    pub fn hazard_dwell_complete(&mut self) {
        self.end_round(EndReason::HazardObserved);
    }

    fn end_round(&mut self, reason: EndReason) {
        if self.state.phase != RoundPhase::Active {
            return;
        }
        self.state.phase = RoundPhase::Ended(reason);
        self.stop_all_timers();
        self.scene.set_reticle_feedback(ReticleFeedback::None);
        log::info!("Round over: {} (score {})", reason, self.state.score);
        self.hud.on_round_ended(reason);
    }

    // === Gaze ===

    /// The gaze ray now rests on `id`
    pub fn acquire(&mut self, id: TargetId) {
        if self.state.hovered == Some(id) {
            // Same target: only start a dwell if none is pending
            if self.dwell.contains_key(&id) || !self.state.is_active() {
                return;
            }
        } else if let Some(previous) = self.state.hovered {
            self.release(previous);
        }

        let Some(target) = self.state.target(id).copied() else {
            log::debug!("acquire {}: not a live target", id);
            return;
        };

        self.state.hovered = Some(id);
        self.scene.set_reticle_feedback(target.kind.hover_feedback());

        if !self.state.is_active() {
            return;
        }

        let ms = self.settings.dwell_ms(target.kind);
        let timer = self.timers.schedule(ms as u64, TimerEvent::Dwell(id));
        self.dwell.insert(id, timer);
        log::debug!("Dwell on {} {} ({} ms)", target.kind.as_str(), id, ms);
    }

    /// The gaze ray left `id`. Pending dwell is dropped without outcome.
    pub fn release(&mut self, id: TargetId) {
        if let Some(timer) = self.dwell.remove(&id) {
            self.timers.cancel(timer);
            log::debug!("Dwell on {} cancelled", id);
        }
        if self.state.hovered == Some(id) {
            self.state.hovered = None;
            self.scene.set_reticle_feedback(ReticleFeedback::None);
        }
    }

    // === Targets ===

    /// Add a target at a host-chosen position (e.g. an AR hit-test pose).
    /// Only while a round is running; not subject to spawner caps.
    pub fn place_target(&mut self, kind: TargetKind, position: Vec3) -> Option<TargetId> {
        if !self.state.running() {
            return None;
        }
        self.insert_spawned(kind, position)
    }

    fn spawn_one(&mut self, kind: TargetKind) -> Option<TargetId> {
        let position = random_position(&mut self.rng, kind);
        self.insert_spawned(kind, position)
    }

    fn insert_spawned(&mut self, kind: TargetKind, position: Vec3) -> Option<TargetId> {
        let Some(id) = self.scene.spawn_target(kind, position) else {
            log::debug!("Scene declined {} spawn", kind.as_str());
            return None;
        };
        if self.state.is_live(id) {
            log::warn!("Scene reused live id {} for a {} spawn", id, kind.as_str());
            return None;
        }
        self.state.insert_target(Target { id, kind, position });
        Some(id)
    }

    fn collect(&mut self, id: TargetId) {
        let Some(target) = self.state.remove_target(id) else {
            return;
        };
        self.state.score += 1;
        self.scene.destroy_target(id);
        self.scene.collected_feedback(id, target.position);
        self.scene.set_reticle_feedback(ReticleFeedback::None);
        log::debug!("Collected {} (score {})", id, self.state.score);
        self.hud.on_score_changed(self.state.score);
    }

    fn purge_targets(&mut self) {
        let ids: Vec<TargetId> = self.state.targets.keys().copied().collect();
        for id in ids {
            self.scene.destroy_target(id);
        }
        self.state.targets.clear();
        if self.state.hovered.take().is_some() {
            self.scene.set_reticle_feedback(ReticleFeedback::None);
        }
    }

    // === Timers ===

    /// Advance virtual time by `dt_ms`, firing everything that comes due
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.timers.now().saturating_add(dt_ms);
        if self.timers.is_empty() {
            self.timers.pop_due(until);
            return;
        }
        while let Some((_, timer, event)) = self.timers.pop_due(until) {
            self.fire(timer, event);
        }
    }

    fn fire(&mut self, timer: TimerId, event: TimerEvent) {
        match event {
            TimerEvent::Dwell(id) => {
                if self.dwell.get(&id) != Some(&timer) {
                    return;
                }
                self.dwell.remove(&id);
                // Guard against a pause/end processed in the same tick
                if !self.state.is_active() {
                    return;
                }
                match self.state.target(id).map(|t| t.kind) {
                    Some(TargetKind::Collectible) => self.collect(id),
                    Some(TargetKind::Hazard) => self.hazard_dwell_complete(),
                    None => {}
                }
            }
            TimerEvent::Spawn(kind) => {
                let slot = spawner_slot(kind);
                if self.spawners[slot] != Some(timer) {
                    return;
                }
                self.spawners[slot] = None;
                if !self.state.is_active() {
                    return;
                }
                if should_spawn(&self.state, &self.settings, kind) {
                    self.spawn_one(kind);
                }
                self.arm_spawner(kind);
            }
            TimerEvent::ClockTick => {
                if self.clock != Some(timer) {
                    return;
                }
                self.clock = None;
                if !self.state.is_active() {
                    return;
                }
                self.state.round_seconds_remaining =
                    self.state.round_seconds_remaining.saturating_sub(1);
                self.hud.on_time_changed(self.state.round_seconds_remaining);
                if self.state.round_seconds_remaining == 0 {
                    self.expire_clock();
                } else {
                    self.arm_clock();
                }
            }
        }
    }

    fn arm_spawner(&mut self, kind: TargetKind) {
        let slot = spawner_slot(kind);
        if let Some(old) = self.spawners[slot].take() {
            self.timers.cancel(old);
        }
        let interval = self.settings.spawn_interval_ms(kind) as u64;
        self.spawners[slot] = Some(self.timers.schedule(interval, TimerEvent::Spawn(kind)));
    }

    fn arm_spawners(&mut self) {
        for kind in TargetKind::ALL {
            self.arm_spawner(kind);
        }
    }

    fn arm_clock(&mut self) {
        if let Some(old) = self.clock.take() {
            self.timers.cancel(old);
        }
        self.clock = Some(self.timers.schedule(CLOCK_TICK_MS, TimerEvent::ClockTick));
    }

    fn stop_spawners(&mut self) {
        for slot in self.spawners.iter_mut() {
            if let Some(timer) = slot.take() {
                self.timers.cancel(timer);
            }
        }
    }

    fn stop_clock(&mut self) {
        if let Some(timer) = self.clock.take() {
            self.timers.cancel(timer);
        }
    }

    fn cancel_dwell(&mut self) {
        for (_, timer) in std::mem::take(&mut self.dwell) {
            self.timers.cancel(timer);
        }
    }

    fn stop_all_timers(&mut self) {
        self.stop_spawners();
        self.stop_clock();
        self.cancel_dwell();
    }
}
