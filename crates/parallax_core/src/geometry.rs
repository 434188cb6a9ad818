//! # Viewport Geometry
//!
//! Surface size and display rotation, plus the dirty flag that tells the
//! render thread the session has not seen the latest values yet.
//!
//! ```text
//! Event thread:   resize(w, h) ──┐
//!                 rotate(r) ─────┼──> dirty = true
//!                                │
//! Render thread:  pending() ─────┴──> apply_geometry ──> mark_applied()
//! ```

/// Display rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    /// Natural orientation.
    #[default]
    Deg0,
    /// Rotated 90 degrees.
    Deg90,
    /// Rotated 180 degrees (upside down).
    Deg180,
    /// Rotated 270 degrees.
    Deg270,
}

impl Rotation {
    /// Builds a rotation from a quarter-turn index as reported by the
    /// display (0..=3). Larger values wrap.
    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Builds a rotation from degrees. Only exact right angles are accepted.
    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Returns the rotation in degrees.
    #[inline]
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Returns the quarter-turn index (0..=3).
    #[inline]
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }
}

/// Geometry handed to the session engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    /// Display rotation.
    pub rotation: Rotation,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Current viewport and whether the session still has to see it.
///
/// Invariant: `dirty == false` implies the last geometry applied to the
/// session equals the current fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportState {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Display rotation.
    pub rotation: Rotation,
    /// Set by the event thread, cleared by the render thread.
    pub dirty: bool,
}

impl ViewportState {
    /// Records a surface resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    /// Records a display change.
    ///
    /// Always marks the viewport dirty, even if the rotation value is the
    /// same: a 180 degree flip does not resize the surface, and the display
    /// signal is the only notice the session gets.
    pub fn rotate(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.dirty = true;
    }

    /// Returns the current geometry.
    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        Geometry {
            rotation: self.rotation,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns the geometry to apply, if the session has not seen it yet.
    #[must_use]
    pub const fn pending(&self) -> Option<Geometry> {
        if self.dirty {
            Some(self.geometry())
        } else {
            None
        }
    }

    /// Marks the current geometry as applied.
    pub fn mark_applied(&mut self) {
        self.dirty = false;
    }
}
