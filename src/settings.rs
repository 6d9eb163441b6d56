//! Game settings
//!
//! Read live by the controller: dwell thresholds at gaze acquisition, caps and
//! intervals on every spawner tick, the round length at round start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::TargetKind;

/// Rejected configuration input. The previous value is always kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("setting `{key}`: `{value}` is not a number")]
    NotNumeric { key: String, value: String },
    #[error("setting `{key}` must be positive")]
    NotPositive { key: String },
    #[error("settings json: {0}")]
    Json(String),
}

/// Live-tunable game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Gaze ===
    /// Dwell needed to collect an orb
    pub orb_gaze_ms: u32,
    /// Dwell on a danger that ends the round
    pub danger_gaze_ms: u32,

    // === Spawners ===
    pub max_orbs_on_screen: u32,
    pub max_dangers_on_screen: u32,
    pub orb_spawn_interval_ms: u32,
    pub danger_spawn_interval_ms: u32,
    /// Seeded at round start
    pub initial_orbs: u32,
    pub initial_dangers: u32,

    // === Round ===
    pub round_duration_secs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            orb_gaze_ms: DEFAULT_ORB_GAZE_MS,
            danger_gaze_ms: DEFAULT_DANGER_GAZE_MS,

            max_orbs_on_screen: DEFAULT_MAX_ORBS,
            max_dangers_on_screen: DEFAULT_MAX_DANGERS,
            orb_spawn_interval_ms: DEFAULT_ORB_SPAWN_INTERVAL_MS,
            danger_spawn_interval_ms: DEFAULT_DANGER_SPAWN_INTERVAL_MS,
            initial_orbs: DEFAULT_INITIAL_ORBS,
            initial_dangers: DEFAULT_INITIAL_DANGERS,

            round_duration_secs: DEFAULT_ROUND_SECS,
        }
    }
}

/// Keys accepted by [`Settings::apply_raw`] and [`Settings::merge_json`]
pub const SETTING_KEYS: [&str; 9] = [
    "orb_gaze_ms",
    "danger_gaze_ms",
    "max_orbs_on_screen",
    "max_dangers_on_screen",
    "orb_spawn_interval_ms",
    "danger_spawn_interval_ms",
    "initial_orbs",
    "initial_dangers",
    "round_duration_secs",
];

impl Settings {
    /// Effective dwell for a target kind
    pub fn dwell_ms(&self, kind: TargetKind) -> u32 {
        let ms = match kind {
            TargetKind::Collectible => self.orb_gaze_ms,
            TargetKind::Hazard => self.danger_gaze_ms,
        };
        ms.max(MIN_GAZE_MS)
    }

    /// Effective cap on concurrently live targets of a kind
    pub fn max_on_screen(&self, kind: TargetKind) -> usize {
        let cap = match kind {
            TargetKind::Collectible => self.max_orbs_on_screen,
            TargetKind::Hazard => self.max_dangers_on_screen,
        };
        cap.max(1) as usize
    }

    /// Effective spawner period for a kind
    pub fn spawn_interval_ms(&self, kind: TargetKind) -> u32 {
        let ms = match kind {
            TargetKind::Collectible => self.orb_spawn_interval_ms,
            TargetKind::Hazard => self.danger_spawn_interval_ms,
        };
        ms.max(MIN_SPAWN_INTERVAL_MS)
    }

    /// Number of targets of a kind seeded when a round starts
    pub fn initial_count(&self, kind: TargetKind) -> usize {
        match kind {
            TargetKind::Collectible => self.initial_orbs as usize,
            TargetKind::Hazard => self.initial_dangers as usize,
        }
    }

    /// Effective round length in seconds
    pub fn round_duration(&self) -> u32 {
        self.round_duration_secs.max(1)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut u32> {
        let field = match key {
            "orb_gaze_ms" => &mut self.orb_gaze_ms,
            "danger_gaze_ms" => &mut self.danger_gaze_ms,
            "max_orbs_on_screen" => &mut self.max_orbs_on_screen,
            "max_dangers_on_screen" => &mut self.max_dangers_on_screen,
            "orb_spawn_interval_ms" => &mut self.orb_spawn_interval_ms,
            "danger_spawn_interval_ms" => &mut self.danger_spawn_interval_ms,
            "initial_orbs" => &mut self.initial_orbs,
            "initial_dangers" => &mut self.initial_dangers,
            "round_duration_secs" => &mut self.round_duration_secs,
            _ => return None,
        };
        Some(field)
    }

    /// Apply a raw value as typed into a settings form.
    ///
    /// Leading/trailing whitespace is ignored. On error the last-known-good
    /// value stays in place.
    pub fn apply_raw(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let field = self
            .field_mut(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        let parsed: i64 = value.trim().parse().map_err(|_| SettingsError::NotNumeric {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        if parsed <= 0 {
            return Err(SettingsError::NotPositive {
                key: key.to_string(),
            });
        }

        *field = parsed.min(u32::MAX as i64) as u32;
        Ok(())
    }

    /// Merge a JSON object into these settings field by field.
    ///
    /// Bad fields are skipped (and logged); returns how many were applied.
    pub fn merge_json(&mut self, json: &str) -> Result<usize, SettingsError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| SettingsError::Json(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| SettingsError::Json("expected an object".to_string()))?;

        let mut applied = 0;
        for (key, raw) in object {
            let text = match raw {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            match self.apply_raw(key, &text) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Ignoring setting: {}", e),
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.dwell_ms(TargetKind::Collectible), 500);
        assert_eq!(s.max_on_screen(TargetKind::Collectible), 12);
        assert_eq!(s.max_on_screen(TargetKind::Hazard), 5);
        assert_eq!(s.spawn_interval_ms(TargetKind::Collectible), 700);
        assert_eq!(s.spawn_interval_ms(TargetKind::Hazard), 1800);
        assert_eq!(s.round_duration(), 60);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let s = Settings {
            orb_gaze_ms: 0,
            danger_gaze_ms: 0,
            max_orbs_on_screen: 0,
            orb_spawn_interval_ms: 0,
            round_duration_secs: 0,
            ..Default::default()
        };
        assert_eq!(s.dwell_ms(TargetKind::Collectible), MIN_GAZE_MS);
        assert_eq!(s.dwell_ms(TargetKind::Hazard), MIN_GAZE_MS);
        assert_eq!(s.max_on_screen(TargetKind::Collectible), 1);
        assert_eq!(s.spawn_interval_ms(TargetKind::Collectible), MIN_SPAWN_INTERVAL_MS);
        assert_eq!(s.round_duration(), 1);
    }

    #[test]
    fn test_apply_raw_keeps_last_good() {
        let mut s = Settings::default();
        assert!(s.apply_raw("orb_gaze_ms", " 150 ").is_ok());
        assert_eq!(s.orb_gaze_ms, 150);

        assert_eq!(
            s.apply_raw("orb_gaze_ms", "fast"),
            Err(SettingsError::NotNumeric {
                key: "orb_gaze_ms".into(),
                value: "fast".into()
            })
        );
        assert!(matches!(
            s.apply_raw("orb_gaze_ms", "-20"),
            Err(SettingsError::NotPositive { .. })
        ));
        assert!(matches!(
            s.apply_raw("orb_gaze_ms", "0"),
            Err(SettingsError::NotPositive { .. })
        ));
        assert_eq!(s.orb_gaze_ms, 150);

        assert!(matches!(
            s.apply_raw("volume", "3"),
            Err(SettingsError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_is_settable() {
        let mut s = Settings::default();
        for key in SETTING_KEYS {
            assert!(s.apply_raw(key, "7").is_ok(), "{key}");
        }
        assert_eq!(s.round_duration_secs, 7);
        assert_eq!(s.initial_dangers, 7);
    }

    #[test]
    fn test_merge_json_skips_bad_fields() {
        let mut s = Settings::default();
        let applied = s
            .merge_json(r#"{"danger_gaze_ms": 800, "max_orbs_on_screen": "4", "orb_gaze_ms": -1, "bogus": 3}"#)
            .unwrap();
        assert_eq!(applied, 2);
        assert_eq!(s.danger_gaze_ms, 800);
        assert_eq!(s.max_orbs_on_screen, 4);
        assert_eq!(s.orb_gaze_ms, DEFAULT_ORB_GAZE_MS);
    }

    #[test]
    fn test_merge_json_rejects_garbage() {
        let mut s = Settings::default();
        assert!(s.merge_json("not json").is_err());
        assert!(s.merge_json("[1, 2]").is_err());
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_serde_defaults_missing_fields() {
        let s: Settings = serde_json::from_str(r#"{"round_duration_secs": 360}"#).unwrap();
        assert_eq!(s.round_duration_secs, 360);
        assert_eq!(s.orb_gaze_ms, DEFAULT_ORB_GAZE_MS);
    }
}
