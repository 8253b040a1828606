//! Host settings and preferences
//!
//! Persisted as a JSON file next to the replays; never read by the
//! simulation itself.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SUBSTEPS;

/// Host settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Ticks per rendered frame while fast-forward is on
    pub fast_forward_factor: u32,
    /// Cap on ticks run for one rendered frame
    pub max_substeps: u32,

    // === Replays ===
    /// Save a replay after every level
    pub record_replays: bool,
    /// Where recorded replays are written
    pub replay_dir: PathBuf,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Timing
            fast_forward_factor: 3,
            max_substeps: MAX_SUBSTEPS,

            // Replays
            record_replays: false,
            replay_dir: PathBuf::from("replays"),

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Substep cap actually used, never zero
    pub fn effective_max_substeps(&self) -> u32 {
        self.max_substeps.max(1)
    }

    /// Fast-forward multiplier actually used, never zero
    pub fn effective_fast_forward(&self) -> u32 {
        self.fast_forward_factor.max(1)
    }

    /// Replay path for a level id
    pub fn replay_path(&self, level_id: &str) -> PathBuf {
        self.replay_dir.join(format!("{level_id}.replay.json"))
    }

    /// Load settings from a file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {e}", path.display()),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not read settings {}: {e}", path.display()),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "muted": true }"#).unwrap();
        assert!(settings.muted);
        assert_eq!(settings.fast_forward_factor, 3);
        assert_eq!(settings.max_substeps, MAX_SUBSTEPS);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load("/nonexistent/lemming-engine/settings.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "lemming-engine-settings-{}.json",
            std::process::id()
        ));
        let settings = Settings {
            fast_forward_factor: 6,
            record_replays: true,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_zero_values_are_floored() {
        let settings = Settings {
            fast_forward_factor: 0,
            max_substeps: 0,
            ..Settings::default()
        };
        assert_eq!(settings.effective_fast_forward(), 1);
        assert_eq!(settings.effective_max_substeps(), 1);
    }
}
