//! User-tunable surface settings, persisted as JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::Revision;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Surface behavior settings.
///
/// Defaults match the stock mapping; any subset may be overridden in the
/// config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Which hardware revision's control tables to use.
    pub revision: Revision,
    /// Scratch from wheel touch alone, without toggling the disc button.
    pub scratch_by_wheel_touch: bool,
    /// Wheel ticks per platter revolution when scratching (measured: 620).
    pub scratch_ticks_per_revolution: u32,
    /// Scroll speed multiplier for wheel track scrolling.
    pub jog_scroll_speed: f64,
    /// Maximize the library whenever the browse knob is used.
    pub auto_maximize_library: bool,
    /// Time until an auto-maximized library collapses again.
    pub library_hide_timeout_ms: u64,
    /// Shortened collapse time after loading a track into a deck.
    pub library_reduced_hide_timeout_ms: u64,
    /// Window for detecting a browse-knob double press.
    pub double_press_window_ms: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            revision: Revision::default(),
            scratch_by_wheel_touch: false,
            scratch_ticks_per_revolution: 620,
            jog_scroll_speed: 2.0,
            auto_maximize_library: false,
            library_hide_timeout_ms: 4000,
            library_reduced_hide_timeout_ms: 500,
            double_press_window_ms: 400,
        }
    }
}

impl SurfaceConfig {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn library_hide_timeout(&self) -> Duration {
        Duration::from_millis(self.library_hide_timeout_ms)
    }

    pub fn library_reduced_hide_timeout(&self) -> Duration {
        Duration::from_millis(self.library_reduced_hide_timeout_ms)
    }

    pub fn double_press_window(&self) -> Duration {
        Duration::from_millis(self.double_press_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SurfaceConfig::default();
        assert_eq!(config.revision, Revision::RevB);
        assert_eq!(config.scratch_ticks_per_revolution, 620);
        assert_eq!(config.library_hide_timeout(), Duration::from_millis(4000));
        assert_eq!(config.double_press_window(), Duration::from_millis(400));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixage.json");
        fs::write(&path, r#"{ "revision": "RevA", "jog_scroll_speed": 3.0 }"#).unwrap();

        let config = SurfaceConfig::load(&path).unwrap();
        assert_eq!(config.revision, Revision::RevA);
        assert_eq!(config.jog_scroll_speed, 3.0);
        assert_eq!(config.library_reduced_hide_timeout_ms, 500);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixage.json");

        let mut config = SurfaceConfig::default();
        config.scratch_by_wheel_touch = true;
        config.save(&path).unwrap();

        let loaded = SurfaceConfig::load(&path).unwrap();
        assert!(loaded.scratch_by_wheel_touch);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = SurfaceConfig::load(Path::new("/nonexistent/mixage.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
