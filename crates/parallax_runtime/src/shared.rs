//! # Shared Session State
//!
//! Everything both threads touch, behind one lock.
//!
//! ```text
//!        Event thread                      Render thread
//!   resume/pause/destroy              apply_geometry/draw_frame
//!   resize/rotate                     drain touches
//!            │                                  │
//!            └──────────┐          ┌────────────┘
//!                       ▼          ▼
//!              ┌──────────────────────────┐
//!              │   Mutex<SessionCell<E>>  │
//!              │  - SessionHandle<E>      │
//!              │  - RunState              │
//!              │  - ViewportState         │
//!              │  - FrameStats            │
//!              └──────────────────────────┘
//! ```
//!
//! The lock is held only for the duration of synchronous session calls.

use std::sync::Arc;

use parking_lot::Mutex;

use parallax_core::{RunState, SessionEngine, SessionHandle, ViewportState};

/// Render loop counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frames the session drew successfully.
    pub frames_drawn: u64,
    /// Frames lost to a draw or geometry failure.
    pub frames_dropped: u64,
    /// Iterations that skipped drawing because the session was not resumed.
    pub frames_idle: u64,
    /// Successful geometry applications.
    pub geometry_applied: u64,
    /// Taps forwarded to the session.
    pub touches_forwarded: u64,
}

/// State guarded by the session lock.
#[derive(Debug)]
pub struct SessionCell<E: SessionEngine> {
    pub(crate) session: SessionHandle<E>,
    pub(crate) run_state: RunState,
    pub(crate) viewport: ViewportState,
    pub(crate) stats: FrameStats,
}

impl<E: SessionEngine> SessionCell<E> {
    /// Wraps a freshly created session in the `Created` state.
    #[must_use]
    pub fn new(session: SessionHandle<E>) -> Self {
        Self {
            session,
            run_state: RunState::Created,
            viewport: ViewportState::default(),
            stats: FrameStats::default(),
        }
    }

    /// Returns the session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle<E> {
        &self.session
    }

    /// Returns the run state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Returns the viewport.
    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    /// Returns the render loop counters.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

/// The session cell as shared between threads.
pub type SharedSession<E> = Arc<Mutex<SessionCell<E>>>;

/// Puts a session behind the shared lock.
#[must_use]
pub fn share<E: SessionEngine>(session: SessionHandle<E>) -> SharedSession<E> {
    Arc::new(Mutex::new(SessionCell::new(session)))
}
