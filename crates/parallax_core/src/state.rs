//! Run state of the session lifecycle.
//!
//! ```text
//! Created ──> Resumed <──> Paused
//!    │           │           │
//!    └───────────┴───────────┴──> Destroyed (terminal)
//! ```

/// Where the session is in its lifecycle.
///
/// Only the event thread changes it, and only while holding the session lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// Session exists but has never been resumed.
    #[default]
    Created,
    /// Session is running; frames are drawn.
    Resumed,
    /// Session is paused; frames are skipped.
    Paused,
    /// Session is gone. No further session calls from any thread.
    Destroyed,
}

impl RunState {
    /// Returns true for the terminal state.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Destroyed)
    }

    /// Returns true if the render thread may draw.
    #[inline]
    #[must_use]
    pub const fn can_draw(self) -> bool {
        matches!(self, Self::Resumed)
    }

    /// Returns true if a resume is a legal transition from here.
    #[inline]
    #[must_use]
    pub const fn can_resume(self) -> bool {
        matches!(self, Self::Created | Self::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_resumed_draws() {
        assert!(RunState::Resumed.can_draw());
        assert!(!RunState::Created.can_draw());
        assert!(!RunState::Paused.can_draw());
        assert!(!RunState::Destroyed.can_draw());
    }

    #[test]
    fn test_destroyed_is_terminal() {
        assert!(RunState::Destroyed.is_terminal());
        assert!(!RunState::Destroyed.can_resume());
        assert!(RunState::Paused.can_resume());
        assert!(RunState::Created.can_resume());
    }
}
