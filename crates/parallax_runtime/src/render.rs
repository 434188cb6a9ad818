//! # Render Loop Driver
//!
//! One iteration per surface trigger:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      FRAME (lock held)                       │
//! ├──────────────────────────────────────────────────────────────┤
//! │  1. Session absent / Destroyed?  ──> Absent, nothing drawn   │
//! │  2. Not Resumed?                 ──> Idle, touches and       │
//! │                                      geometry kept queued    │
//! │  3. Drain marshaled touches into the session                 │
//! │  4. Viewport dirty?              ──> apply_geometry, clear   │
//! │  5. draw_frame                                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures in 4 or 5 drop the frame. They are logged and the loop goes on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use parallax_core::{DrawFlags, EngineError, LifecycleError, LifecycleResult, SessionEngine};

use crate::cadence::FrameCadence;
use crate::shared::SharedSession;

/// A tap marshaled from the event thread to the render thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Surface x coordinate.
    pub x: f32,
    /// Surface y coordinate.
    pub y: f32,
}

/// Creates the channel that carries taps to the render thread.
#[must_use]
pub fn touch_channel() -> (Sender<TouchEvent>, Receiver<TouchEvent>) {
    crossbeam_channel::unbounded()
}

/// What a single iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was drawn.
    Drawn,
    /// The session is not resumed; nothing was drawn.
    Idle,
    /// The session is gone; nothing was touched.
    Absent,
    /// Geometry or draw failed; the frame was dropped.
    Dropped(LifecycleError),
}

/// Runs frames against the shared session.
pub struct RenderLoopDriver<E: SessionEngine> {
    shared: SharedSession<E>,
    flags: DrawFlags,
    touches: Receiver<TouchEvent>,
}

impl<E: SessionEngine> RenderLoopDriver<E> {
    /// Creates a driver over the shared session.
    #[must_use]
    pub fn new(shared: SharedSession<E>, flags: DrawFlags, touches: Receiver<TouchEvent>) -> Self {
        Self {
            shared,
            flags,
            touches,
        }
    }

    /// Returns the draw flags passed to every frame.
    #[must_use]
    pub const fn flags(&self) -> DrawFlags {
        self.flags
    }

    /// Forwards the surface-created signal to the session.
    ///
    /// Returns false if the session is already gone.
    pub fn surface_created(&self) -> bool {
        let mut cell = self.shared.lock();
        match cell.session.surface_created() {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("surface created after session destroyed");
                false
            }
        }
    }

    /// Executes one iteration of the render loop.
    pub fn frame(&self) -> FrameOutcome {
        let mut cell = self.shared.lock();

        if cell.run_state.is_terminal() || !cell.session.is_live() {
            return FrameOutcome::Absent;
        }

        if !cell.run_state.can_draw() {
            // Touches stay queued until the session is running.
            cell.stats.frames_idle += 1;
            return FrameOutcome::Idle;
        }

        while let Ok(touch) = self.touches.try_recv() {
            if cell.session.touch(touch.x, touch.y).is_ok() {
                cell.stats.touches_forwarded += 1;
            }
        }

        if let Some(geometry) = cell.viewport.pending() {
            if let Err(err) = cell.session.apply_geometry(geometry) {
                // Dirty stays set: the next frame retries before drawing.
                tracing::warn!("failed to apply display geometry: {err}");
                cell.stats.frames_dropped += 1;
                return FrameOutcome::Dropped(err);
            }
            cell.viewport.mark_applied();
            cell.stats.geometry_applied += 1;
            tracing::debug!(
                "display geometry applied: {}x{} @ {} degrees",
                geometry.width,
                geometry.height,
                geometry.rotation.degrees()
            );
        }

        match cell.session.draw_frame(self.flags) {
            Ok(()) => {
                cell.stats.frames_drawn += 1;
                FrameOutcome::Drawn
            }
            Err(err) => {
                tracing::warn!("frame dropped: {err}");
                cell.stats.frames_dropped += 1;
                FrameOutcome::Dropped(err)
            }
        }
    }
}

impl<E: SessionEngine> std::fmt::Debug for RenderLoopDriver<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoopDriver")
            .field("flags", &self.flags)
            .field("pending_touches", &self.touches.len())
            .finish_non_exhaustive()
    }
}

/// Dedicated render thread running [`RenderLoopDriver::frame`] at a fixed
/// cadence until shut down.
#[derive(Debug)]
pub struct RenderThread {
    /// Shutdown signal.
    shutdown: Arc<AtomicBool>,
    /// Thread handle, taken on shutdown.
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawns the render thread.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InitFailure`] if the OS refuses the thread.
    pub fn spawn<E: SessionEngine>(
        driver: RenderLoopDriver<E>,
        target_fps: u32,
    ) -> LifecycleResult<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("parallax-render".into())
            .spawn(move || Self::render_loop(&driver, target_fps, &thread_shutdown))
            .map_err(|e| {
                LifecycleError::InitFailure(EngineError::new(format!(
                    "failed to spawn render thread: {e}"
                )))
            })?;

        tracing::info!("render thread started at {target_fps} fps");
        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Render thread main loop.
    fn render_loop<E: SessionEngine>(
        driver: &RenderLoopDriver<E>,
        target_fps: u32,
        shutdown: &AtomicBool,
    ) {
        let mut cadence = FrameCadence::new(target_fps);

        while !shutdown.load(Ordering::Acquire) {
            cadence.wait_for_next_frame();
            let start = cadence.begin_frame();
            let _ = driver.frame();
            cadence.end_frame(start);
        }

        let stats = cadence.stats();
        tracing::info!(
            "render thread stopped after {} frames ({} late)",
            stats.total_frames,
            stats.late_frames
        );
    }

    /// Returns true while the thread has not been asked to stop.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.shutdown.load(Ordering::Acquire)
    }

    /// Stops the thread and waits for it. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("render thread panicked");
            }
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
