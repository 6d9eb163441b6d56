//! Orb Gaze entry point
//!
//! On the web the page drives `WebGame` (see `platform::web`). Natively this
//! runs one headless round with the demo autopilot doing the looking.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use orb_gaze::platform::init_logging;
    use orb_gaze::sim::{RoundController, choose_gaze};
    use orb_gaze::{HeadlessScene, HudLog, Settings};

    /// Host frame length (~60 Hz)
    const FRAME_MS: u64 = 16;

    init_logging();
    log::info!("Orb Gaze (native) starting...");

    let mut settings = Settings::default();
    if let Ok(json) = std::env::var("ORB_GAZE_SETTINGS") {
        match settings.merge_json(&json) {
            Ok(n) => log::info!("Applied {} settings from ORB_GAZE_SETTINGS", n),
            Err(e) => log::warn!("Ignoring ORB_GAZE_SETTINGS: {}", e),
        }
    }
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);

    let mut game = RoundController::new(settings, HeadlessScene::new(), HudLog::new(), seed);
    game.start_round();

    while game.state().is_active() {
        // Edge-triggered: only notify when the chosen target changes
        let wanted = choose_gaze(game.state());
        if wanted != game.state().hovered {
            match wanted {
                Some(id) => game.acquire(id),
                None => {
                    if let Some(current) = game.state().hovered {
                        game.release(current);
                    }
                }
            }
        }
        game.advance(FRAME_MS);
    }

    let reason = game
        .state()
        .end_reason()
        .map(|r| r.as_str())
        .unwrap_or("unknown");
    log::info!(
        "Demo finished: {} - score {}, {} targets spawned, {} HUD updates",
        reason,
        game.hud().last_score().unwrap_or(0),
        game.scene().spawned,
        game.hud().events.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
