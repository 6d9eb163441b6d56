//! Spawn placement and spawner gating

use glam::Vec3;
use rand::Rng;

use super::state::{GameState, TargetKind};
use crate::consts::*;
use crate::settings::Settings;

/// Random point on a ring around the viewer; dangers sit a bit lower
pub fn random_position<R: Rng>(rng: &mut R, kind: TargetKind) -> Vec3 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let radius = SPAWN_RADIUS_MIN + rng.random::<f32>() * SPAWN_RADIUS_SPAN;
    let mut y = SPAWN_HEIGHT_MIN + rng.random::<f32>() * SPAWN_HEIGHT_SPAN;
    if kind == TargetKind::Hazard {
        y = (y - DANGER_DROP).max(DANGER_MIN_HEIGHT);
    }
    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Whether a spawner tick for `kind` should create a target right now
pub fn should_spawn(state: &GameState, settings: &Settings, kind: TargetKind) -> bool {
    state.is_active() && state.live_count(kind) < settings.max_on_screen(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{RoundPhase, Target, TargetId};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_positions_stay_in_ring() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let p = random_position(&mut rng, TargetKind::Collectible);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!(r >= SPAWN_RADIUS_MIN - 1e-3 && r <= SPAWN_RADIUS_MIN + SPAWN_RADIUS_SPAN + 1e-3);
            assert!(p.y >= SPAWN_HEIGHT_MIN && p.y <= SPAWN_HEIGHT_MIN + SPAWN_HEIGHT_SPAN);

            let d = random_position(&mut rng, TargetKind::Hazard);
            assert!(d.y >= DANGER_MIN_HEIGHT);
            assert!(d.y <= SPAWN_HEIGHT_MIN + SPAWN_HEIGHT_SPAN - DANGER_DROP + 1e-3);
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(
                random_position(&mut a, TargetKind::Hazard),
                random_position(&mut b, TargetKind::Hazard)
            );
        }
    }

    #[test]
    fn test_cap_and_phase_gate() {
        let settings = Settings {
            max_orbs_on_screen: 2,
            ..Default::default()
        };
        let mut state = GameState::new();
        assert!(!should_spawn(&state, &settings, TargetKind::Collectible));

        state.phase = RoundPhase::Active;
        assert!(should_spawn(&state, &settings, TargetKind::Collectible));

        for id in 1..=2 {
            state.insert_target(Target {
                id: TargetId(id),
                kind: TargetKind::Collectible,
                position: Vec3::ZERO,
            });
        }
        assert!(!should_spawn(&state, &settings, TargetKind::Collectible));
        assert!(should_spawn(&state, &settings, TargetKind::Hazard));

        state.phase = RoundPhase::Paused;
        assert!(!should_spawn(&state, &settings, TargetKind::Hazard));
    }
}
