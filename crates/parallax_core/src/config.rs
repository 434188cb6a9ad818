//! # Configuration
//!
//! Loaded once at startup from TOML. Every section is optional.
//!
//! ```toml
//! [render]
//! mode = "continuous"
//! target_fps = 60
//!
//! [watcher]
//! interval_ms = 1000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{AssetSource, DrawFlags, SessionOptions};

/// Default render cadence.
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Default plane status poll interval.
pub const DEFAULT_WATCHER_INTERVAL_MS: u64 = 1000;

/// Default message shown while no surface has been detected.
pub const DEFAULT_SEARCHING_MESSAGE: &str = "Searching for surfaces...";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Who drives the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// A dedicated render thread paced at `target_fps`.
    #[default]
    Continuous,
    /// The host surface calls into the driver on its own vsync.
    HostDriven,
}

/// Render loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Who drives frames.
    pub mode: RenderMode,
    /// Frames per second for the continuous render thread.
    pub target_fps: u32,
    /// Render the depth map as a color overlay.
    pub debug_depth_visualization: bool,
    /// Occlude virtual content with the depth map.
    pub use_depth_for_occlusion: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Continuous,
            target_fps: DEFAULT_TARGET_FPS,
            debug_depth_visualization: false,
            use_depth_for_occlusion: false,
        }
    }
}

impl RenderConfig {
    /// Returns the per-frame draw flags.
    #[must_use]
    pub const fn draw_flags(&self) -> DrawFlags {
        DrawFlags {
            debug_depth_visualization: self.debug_depth_visualization,
            use_depth_for_occlusion: self.use_depth_for_occlusion,
        }
    }
}

/// Plane status watcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatcherConfig {
    /// Delay between polls, in milliseconds.
    pub interval_ms: u64,
    /// Persistent message shown while searching.
    pub searching_message: String,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_WATCHER_INTERVAL_MS,
            searching_message: DEFAULT_SEARCHING_MESSAGE.to_owned(),
        }
    }
}

impl WatcherConfig {
    /// Returns the poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallaxConfig {
    /// Render loop.
    pub render: RenderConfig,
    /// Session settings applied before each resume.
    pub session: SessionOptions,
    /// Plane status watcher.
    pub watcher: WatcherConfig,
    /// Engine assets.
    pub assets: AssetSource,
}

impl ParallaxConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.target_fps == 0 {
            return Err(ConfigError::Invalid("render.target_fps must be > 0".into()));
        }
        if self.watcher.interval_ms == 0 {
            return Err(ConfigError::Invalid("watcher.interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ParallaxConfig::from_toml_str("").unwrap();
        assert_eq!(config, ParallaxConfig::default());
        assert_eq!(config.watcher.interval(), Duration::from_millis(1000));
        assert_eq!(config.watcher.searching_message, "Searching for surfaces...");
        assert_eq!(config.render.mode, RenderMode::Continuous);
    }

    #[test]
    fn test_full_document() {
        let text = r#"
            [render]
            mode = "host_driven"
            target_fps = 30
            use_depth_for_occlusion = true

            [session]
            depth_enabled = true

            [watcher]
            interval_ms = 250
            searching_message = "Move your phone"

            [assets]
            root = "/data/ar"
        "#;
        let config = ParallaxConfig::from_toml_str(text).unwrap();
        assert_eq!(config.render.mode, RenderMode::HostDriven);
        assert_eq!(config.render.target_fps, 30);
        assert!(config.render.draw_flags().use_depth_for_occlusion);
        assert!(!config.render.draw_flags().debug_depth_visualization);
        assert!(config.session.depth_enabled);
        assert!(!config.session.instant_placement_enabled);
        assert_eq!(config.watcher.interval(), Duration::from_millis(250));
        assert_eq!(config.assets.root, PathBuf::from("/data/ar"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ParallaxConfig::from_toml_str("[render]\nfps = 60\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = ParallaxConfig::from_toml_str("[watcher]\ninterval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ParallaxConfig::load("/nonexistent/parallax.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
