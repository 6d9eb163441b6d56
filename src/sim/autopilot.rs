//! Demo gaze driver: keeps looking at the closest orb, never at a danger

use glam::Vec3;

use super::state::{GameState, TargetId, TargetKind};

/// Viewer head position in the default scene
pub const VIEWER: Vec3 = Vec3::new(0.0, 1.6, 0.0);

/// Pick the collectible the demo should look at next
pub fn choose_gaze(state: &GameState) -> Option<TargetId> {
    state
        .targets
        .values()
        .filter(|t| t.kind == TargetKind::Collectible)
        .min_by(|a, b| {
            a.position
                .distance_squared(VIEWER)
                .partial_cmp(&b.position.distance_squared(VIEWER))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|t| t.id)
}
