//! # Session Engine Boundary
//!
//! The AR engine is an external collaborator. This module is the whole of
//! what PARALLAX knows about it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::geometry::Geometry;

/// Where the engine loads its models and shaders from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetSource {
    /// Asset root directory.
    pub root: PathBuf,
}

impl Default for AssetSource {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

/// Session settings applied before every resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
    /// Enable the depth API if the device supports it.
    pub depth_enabled: bool,
    /// Enable instant placement.
    pub instant_placement_enabled: bool,
}

/// Per-frame draw options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawFlags {
    /// Render the depth map as a color overlay.
    pub debug_depth_visualization: bool,
    /// Occlude virtual content with the depth map.
    pub use_depth_for_occlusion: bool,
}

/// Information passed to the engine on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeContext {
    /// 1-based count of resume attempts made on this session.
    pub attempt: u32,
}

impl ResumeContext {
    /// Returns true on the first attempt, when the engine may prompt the
    /// user (e.g. to install runtime support).
    #[must_use]
    pub const fn is_first_attempt(&self) -> bool {
        self.attempt == 1
    }
}

/// The opaque AR session engine.
///
/// Construction happens through a closure registered with the coordinator,
/// so the trait only covers a live instance. Implementations need no
/// internal locking: every call is serialized by the caller.
pub trait SessionEngine: Send + 'static {
    /// Applies session settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are not supported.
    fn configure(&mut self, options: &SessionOptions) -> Result<(), EngineError>;

    /// Resumes tracking.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be resumed (camera in use,
    /// runtime missing, ...).
    fn resume(&mut self, context: &ResumeContext) -> Result<(), EngineError>;

    /// Pauses tracking.
    fn pause(&mut self);

    /// Called once the drawing surface exists.
    fn surface_created(&mut self);

    /// Applies new display geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects the geometry.
    fn apply_geometry(&mut self, geometry: Geometry) -> Result<(), EngineError>;

    /// Updates tracking and draws one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame could not be produced.
    fn draw_frame(&mut self, flags: DrawFlags) -> Result<(), EngineError>;

    /// Returns true once at least one tracked surface (plane) exists.
    ///
    /// # Errors
    ///
    /// Returns an error if tracking state cannot be queried.
    fn has_detected_surfaces(&self) -> Result<bool, EngineError>;

    /// Handles a tap at surface coordinates.
    fn touch(&mut self, x: f32, y: f32);

    /// Releases the native resource. Called at most once.
    fn destroy(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt() {
        assert!(ResumeContext { attempt: 1 }.is_first_attempt());
        assert!(!ResumeContext { attempt: 2 }.is_first_attempt());
    }

    #[test]
    fn test_default_asset_root() {
        assert_eq!(AssetSource::default().root, PathBuf::from("assets"));
    }
}
