//! Browser bindings
//!
//! The page owns the A-Frame scene, the HUD and the XR session. It hands us a
//! plain object of callbacks and forwards raycaster edges and frame times:
//!
//! ```js
//! const game = new WebGame({
//!   spawnTarget: (kind, x, y, z) => id,
//!   destroyTarget: (id) => {},
//!   setReticle: (state) => {},        // "none" | "collectible" | "hazard"
//!   collected: (id, x, y, z) => {},
//!   onScore: (n) => {}, onTime: (s) => {},
//!   onRoundEnded: (reason) => {}, onRoundStarted: () => {},
//! }, settingsJson);
//! ```
//!
//! A callback that is missing or throws is logged and treated as a no-op.

use glam::Vec3;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::host::{HudSink, SceneHost};
use crate::settings::Settings;
use crate::sim::{EndReason, ReticleFeedback, RoundController, RoundPhase, TargetId, TargetKind};

fn callback(callbacks: &JsValue, name: &str) -> Option<Function> {
    let value = Reflect::get(callbacks, &JsValue::from_str(name)).ok()?;
    if value.is_undefined() || value.is_null() {
        log::warn!("No `{}` callback provided", name);
        return None;
    }
    value.dyn_into::<Function>().ok()
}

fn invoke(f: &Option<Function>, name: &str, args: &Array) -> Option<JsValue> {
    let f = f.as_ref()?;
    match f.apply(&JsValue::NULL, args) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("{} threw: {:?}", name, e);
            None
        }
    }
}

fn position_args(position: Vec3) -> [JsValue; 3] {
    [
        JsValue::from_f64(position.x as f64),
        JsValue::from_f64(position.y as f64),
        JsValue::from_f64(position.z as f64),
    ]
}

struct JsScene {
    spawn: Option<Function>,
    destroy: Option<Function>,
    reticle: Option<Function>,
    collected: Option<Function>,
}

impl SceneHost for JsScene {
    fn spawn_target(&mut self, kind: TargetKind, position: Vec3) -> Option<TargetId> {
        let [x, y, z] = position_args(position);
        let args = Array::of4(&JsValue::from_str(kind.as_str()), &x, &y, &z);
        let raw = invoke(&self.spawn, "spawnTarget", &args)?.as_f64()?;
        let id = TargetId::from_f64(raw);
        if id.is_none() {
            log::warn!("spawnTarget returned unusable id {}", raw);
        }
        id
    }

    fn destroy_target(&mut self, id: TargetId) {
        invoke(&self.destroy, "destroyTarget", &Array::of1(&JsValue::from(id.0)));
    }

    fn set_reticle_feedback(&mut self, feedback: ReticleFeedback) {
        let state = match feedback {
            ReticleFeedback::None => "none",
            ReticleFeedback::HoveringCollectible => "collectible",
            ReticleFeedback::HoveringHazard => "hazard",
        };
        invoke(&self.reticle, "setReticle", &Array::of1(&JsValue::from_str(state)));
    }

    fn collected_feedback(&mut self, id: TargetId, position: Vec3) {
        let [x, y, z] = position_args(position);
        let args = Array::of4(&JsValue::from(id.0), &x, &y, &z);
        invoke(&self.collected, "collected", &args);
    }
}

struct JsHud {
    score: Option<Function>,
    time: Option<Function>,
    ended: Option<Function>,
    started: Option<Function>,
}

impl HudSink for JsHud {
    fn on_score_changed(&mut self, score: u32) {
        invoke(&self.score, "onScore", &Array::of1(&JsValue::from(score)));
    }

    fn on_time_changed(&mut self, seconds_remaining: u32) {
        invoke(&self.time, "onTime", &Array::of1(&JsValue::from(seconds_remaining)));
    }

    fn on_round_ended(&mut self, reason: EndReason) {
        invoke(&self.ended, "onRoundEnded", &Array::of1(&JsValue::from_str(reason.as_str())));
    }

    fn on_round_started(&mut self) {
        invoke(&self.started, "onRoundStarted", &Array::new());
    }
}

/// Largest single step accepted from the page
const MAX_STEP_MS: f64 = 60_000.0;

fn performance_now() -> Option<f64> {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
}

/// JS handle to one game
#[wasm_bindgen]
pub struct WebGame {
    controller: RoundController<JsScene, JsHud>,
    last_pump: Option<f64>,
    /// Sub-millisecond remainder carried between frames
    carry_ms: f64,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(callbacks: JsValue, settings_json: Option<String>) -> WebGame {
        let mut settings = Settings::default();
        if let Some(json) = settings_json {
            match settings.merge_json(&json) {
                Ok(n) => log::info!("Applied {} settings", n),
                Err(e) => log::warn!("Using default settings: {}", e),
            }
        }

        let scene = JsScene {
            spawn: callback(&callbacks, "spawnTarget"),
            destroy: callback(&callbacks, "destroyTarget"),
            reticle: callback(&callbacks, "setReticle"),
            collected: callback(&callbacks, "collected"),
        };
        let hud = JsHud {
            score: callback(&callbacks, "onScore"),
            time: callback(&callbacks, "onTime"),
            ended: callback(&callbacks, "onRoundEnded"),
            started: callback(&callbacks, "onRoundStarted"),
        };

        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        log::info!("Game initialized with seed: {}", seed);

        WebGame {
            controller: RoundController::new(settings, scene, hud, seed),
            last_pump: None,
            carry_ms: 0.0,
        }
    }

    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&mut self) {
        self.controller.start_round();
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    pub fn resume(&mut self) {
        self.last_pump = None;
        self.controller.resume();
    }

    pub fn restart(&mut self) {
        self.controller.restart();
    }

    #[wasm_bindgen(js_name = backToMenu)]
    pub fn back_to_menu(&mut self) {
        self.controller.back_to_menu();
    }

    /// Raycaster intersection (topmost entity)
    pub fn acquire(&mut self, id: u32) {
        self.controller.acquire(TargetId(id));
    }

    /// Raycaster intersection cleared
    pub fn release(&mut self, id: u32) {
        self.controller.release(TargetId(id));
    }

    /// Place a target at an AR hit-test position. Returns the scene id.
    #[wasm_bindgen(js_name = placeTarget)]
    pub fn place_target(&mut self, kind: &str, x: f32, y: f32, z: f32) -> Option<u32> {
        let kind = TargetKind::from_str(kind)?;
        self.controller
            .place_target(kind, Vec3::new(x, y, z))
            .map(|id| id.0)
    }

    /// Advance by an explicit number of milliseconds (at most one minute)
    pub fn advance(&mut self, ms: f64) {
        if !ms.is_finite() || ms <= 0.0 {
            return;
        }
        let total = ms.min(MAX_STEP_MS) + self.carry_ms;
        let whole = total.floor();
        self.carry_ms = total - whole;
        self.controller.advance(whole as u64);
    }

    /// Advance by the wall time since the previous pump (call once per frame)
    pub fn pump(&mut self) {
        let Some(now) = performance_now() else {
            return;
        };
        if let Some(last) = self.last_pump {
            // Clamp long stalls (tab hidden) to one second
            self.advance((now - last).min(1000.0));
        }
        self.last_pump = Some(now);
    }

    /// Apply one settings form value; false if it was rejected
    #[wasm_bindgen(js_name = applySetting)]
    pub fn apply_setting(&mut self, key: &str, value: &str) -> bool {
        self.controller.apply_setting(key, value).is_ok()
    }

    #[wasm_bindgen(js_name = mergeSettings)]
    pub fn merge_settings(&mut self, json: &str) -> Result<u32, JsValue> {
        self.controller
            .settings_mut()
            .merge_json(json)
            .map(|n| n as u32)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn score(&self) -> u32 {
        self.controller.state().score
    }

    #[wasm_bindgen(js_name = secondsRemaining)]
    pub fn seconds_remaining(&self) -> u32 {
        self.controller.state().round_seconds_remaining
    }

    pub fn phase(&self) -> String {
        match self.controller.phase() {
            RoundPhase::Idle => "idle",
            RoundPhase::Active => "active",
            RoundPhase::Paused => "paused",
            RoundPhase::Ended(_) => "ended",
        }
        .to_string()
    }

    /// Full state as JSON (for debugging overlays)
    pub fn snapshot(&self) -> String {
        serde_json::to_string(self.controller.state()).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> String {
        serde_json::to_string(self.controller.settings()).unwrap_or_default()
    }
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    super::init_logging();
    log::info!("Orb Gaze core loaded");
}
