//! # Lifecycle Coordinator
//!
//! Owns the session (through the shared lock), the render thread and the
//! plane status watcher, and turns host events into session calls.
//!
//! ```text
//!            on_resume (permission held)
//! Created ─────────────────────────────> Resumed
//!    │                                    │    ▲
//!    │ on_pause                   on_pause│    │on_resume
//!    ▼                                    ▼    │
//! Paused <──────────────────────────── Paused ─┘
//!
//! on_destroy / permission denied: any state ──> Destroyed
//! ```
//!
//! Every method runs on the event thread. Session calls happen under the
//! session lock; permission and notification calls happen after it is
//! released.

use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;

use parallax_core::{
    AssetSource, EngineError, LifecycleError, LifecycleResult, ParallaxConfig, RenderMode,
    ResumeContext, Rotation, RunState, SessionEngine, SessionHandle, ViewportState,
};

use crate::host::{HostEvent, Notifier, PermissionGate, PERMISSION_REQUIRED_MESSAGE};
use crate::render::{touch_channel, RenderLoopDriver, RenderThread, TouchEvent};
use crate::shared::{share, FrameStats, SharedSession};
use crate::timers::TimerQueue;
use crate::watcher::{PlaneStatusWatcher, PollOutcome, ScheduledPoll, WatcherState};

/// Result of a resume request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeStatus {
    /// The session is now running.
    Resumed,
    /// The session was already running.
    AlreadyResumed,
    /// Permission was requested; the resume runs when it is granted.
    AwaitingPermission,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Keep processing events.
    Continue,
    /// The session is destroyed; stop the event loop.
    Exit,
}

/// The root of the lifecycle: reacts to host events and keeps the render
/// thread, the session and the watcher in step.
pub struct LifecycleCoordinator<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    config: ParallaxConfig,
    shared: SharedSession<E>,
    touches: Sender<TouchEvent>,
    /// Driver handed to the host surface in host-driven mode.
    driver: Option<RenderLoopDriver<E>>,
    render_thread: Option<RenderThread>,
    watcher: PlaneStatusWatcher,
    timers: TimerQueue<ScheduledPoll>,
    permissions: P,
    notifier: N,
    resume_deferred: bool,
    resume_attempts: u32,
}

impl<E, P, N> LifecycleCoordinator<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    /// Creates the session and starts rendering (`on_create`).
    ///
    /// In [`RenderMode::Continuous`] a render thread is spawned; in
    /// [`RenderMode::HostDriven`] the driver is kept for
    /// [`take_render_driver`](Self::take_render_driver).
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InitFailure`] if the engine cannot be
    /// created or the render thread cannot be spawned.
    pub fn create<F>(
        config: ParallaxConfig,
        permissions: P,
        notifier: N,
        ctor: F,
    ) -> LifecycleResult<Self>
    where
        F: FnOnce(&AssetSource) -> Result<E, EngineError>,
    {
        let session = SessionHandle::create(&config.assets, ctor)?;
        let shared = share(session);
        let (touches, touch_rx) = touch_channel();
        let driver = RenderLoopDriver::new(
            Arc::clone(&shared),
            config.render.draw_flags(),
            touch_rx,
        );

        let (driver, render_thread) = match config.render.mode {
            RenderMode::Continuous => (
                None,
                Some(RenderThread::spawn(driver, config.render.target_fps)?),
            ),
            RenderMode::HostDriven => (Some(driver), None),
        };

        Ok(Self {
            watcher: PlaneStatusWatcher::new(config.watcher.interval()),
            config,
            shared,
            touches,
            driver,
            render_thread,
            timers: TimerQueue::new(),
            permissions,
            notifier,
            resume_deferred: false,
            resume_attempts: 0,
        })
    }

    /// Hands out the render driver in host-driven mode. Returns `None` in
    /// continuous mode or if already taken.
    pub fn take_render_driver(&mut self) -> Option<RenderLoopDriver<E>> {
        self.driver.take()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Brings the session to the foreground.
    ///
    /// Without the camera permission nothing touches the session: the
    /// permission is requested and the resume is retried from
    /// [`on_permission_result`](Self::on_permission_result).
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Session`] if configure or resume fails (the message
    /// is shown and the state does not change),
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn on_resume(&mut self) -> LifecycleResult<ResumeStatus> {
        if self.shared.lock().run_state.is_terminal() {
            return Err(LifecycleError::SessionAbsent);
        }
        if !self.permissions.has_permission() {
            tracing::info!("camera permission missing, requesting");
            self.resume_deferred = true;
            self.permissions.request_permission();
            return Ok(ResumeStatus::AwaitingPermission);
        }
        self.resume_session()
    }

    fn resume_session(&mut self) -> LifecycleResult<ResumeStatus> {
        let result = {
            let mut cell = self.shared.lock();
            match cell.run_state {
                RunState::Destroyed => return Err(LifecycleError::SessionAbsent),
                RunState::Resumed => return Ok(ResumeStatus::AlreadyResumed),
                RunState::Created | RunState::Paused => {}
            }

            self.resume_attempts += 1;
            let context = ResumeContext {
                attempt: self.resume_attempts,
            };
            let result = cell
                .session
                .configure(&self.config.session)
                .and_then(|()| cell.session.resume(&context));
            if result.is_ok() {
                cell.run_state = RunState::Resumed;
            }
            result
        };

        if let Err(err) = result {
            tracing::error!("failed to resume session: {err}");
            self.notifier.show_persistent_message(&err.user_message());
            return Err(err);
        }

        self.resume_deferred = false;
        tracing::info!("session resumed");
        self.notifier
            .show_persistent_message(&self.config.watcher.searching_message);
        if let Some(poll) = self.watcher.start() {
            self.timers
                .schedule(Instant::now() + self.watcher.interval(), poll);
        }
        Ok(ResumeStatus::Resumed)
    }

    /// Sends the session to the background and drops any resume waiting on
    /// the permission answer. Idempotent.
    ///
    /// # Errors
    ///
    /// Only if the session vanished while marked resumed, which the lock
    /// rules out.
    pub fn on_pause(&mut self) -> LifecycleResult<()> {
        {
            let mut cell = self.shared.lock();
            match cell.run_state {
                RunState::Resumed => {
                    cell.session.pause()?;
                    cell.run_state = RunState::Paused;
                    tracing::info!("session paused");
                }
                RunState::Created => cell.run_state = RunState::Paused,
                RunState::Paused | RunState::Destroyed => {}
            }
        }
        // A grant arriving while in the background must not resume.
        self.resume_deferred = false;
        self.watcher.stop();
        Ok(())
    }

    /// Destroys the session and stops the render thread. Idempotent, and
    /// safe whether or not a resume ever succeeded.
    pub fn on_destroy(&mut self) {
        {
            let mut cell = self.shared.lock();
            cell.session.destroy();
            cell.run_state = RunState::Destroyed;
        }
        self.watcher.stop();
        self.timers.clear();
        self.resume_deferred = false;
        if let Some(mut thread) = self.render_thread.take() {
            thread.shutdown();
        }
    }

    /// Handles the answer to a permission request.
    ///
    /// Granted: retries a deferred resume exactly once and returns its
    /// status, or `None` if no resume was waiting.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::PermissionDenied`] if refused; the session is
    /// destroyed and the host should close. Otherwise as
    /// [`on_resume`](Self::on_resume).
    pub fn on_permission_result(
        &mut self,
        granted: bool,
    ) -> LifecycleResult<Option<ResumeStatus>> {
        if !granted {
            tracing::warn!("camera permission denied");
            self.notifier.show_transient_toast(PERMISSION_REQUIRED_MESSAGE);
            if !self.permissions.should_show_rationale() {
                // "Don't ask again": only the settings page can grant it now.
                self.permissions.open_settings();
            }
            self.on_destroy();
            return Err(LifecycleError::PermissionDenied);
        }

        if !std::mem::take(&mut self.resume_deferred) {
            return Ok(None);
        }
        self.resume_session().map(Some)
    }

    // =========================================================================
    // Surface
    // =========================================================================

    /// Records a surface resize; applied before the next drawn frame.
    pub fn on_surface_resized(&mut self, width: u32, height: u32) {
        self.shared.lock().viewport.resize(width, height);
    }

    /// Records a display change; applied before the next drawn frame.
    pub fn on_rotation_changed(&mut self, rotation: Rotation) {
        self.shared.lock().viewport.rotate(rotation);
    }

    /// Forwards the surface-created signal to the session.
    pub fn on_surface_created(&mut self) {
        if self.shared.lock().session.surface_created().is_err() {
            tracing::debug!("surface created after session destroyed");
        }
    }

    /// Queues a tap for the render thread; it runs before the next frame.
    pub fn on_touch(&mut self, x: f32, y: f32) {
        if self.touches.send(TouchEvent { x, y }).is_err() {
            tracing::debug!("touch dropped, render loop gone");
        }
    }

    // =========================================================================
    // Event thread plumbing
    // =========================================================================

    /// Handles one host event.
    ///
    /// Recoverable errors are logged (and, for resume, shown) and do not
    /// stop the loop.
    ///
    /// # Errors
    ///
    /// Returns fatal errors ([`LifecycleError::PermissionDenied`]).
    pub fn dispatch(&mut self, event: HostEvent) -> LifecycleResult<Dispatch> {
        match event {
            HostEvent::Resume => {
                if let Err(err) = self.on_resume() {
                    tracing::warn!("resume failed: {err}");
                }
            }
            HostEvent::Pause => self.on_pause()?,
            HostEvent::Destroy => {
                self.on_destroy();
                return Ok(Dispatch::Exit);
            }
            HostEvent::SurfaceCreated => self.on_surface_created(),
            HostEvent::SurfaceChanged { width, height } => self.on_surface_resized(width, height),
            HostEvent::DisplayChanged { rotation } => self.on_rotation_changed(rotation),
            HostEvent::PermissionResult { granted } => match self.on_permission_result(granted) {
                Ok(_) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => tracing::warn!("resume after permission grant failed: {err}"),
            },
            HostEvent::Touch { x, y } => self.on_touch(x, y),
        }
        Ok(Dispatch::Continue)
    }

    /// Fires every watcher poll due at `now`. Returns how many fired.
    pub fn run_due_timers(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(poll) = self.timers.pop_due(now) {
            fired += 1;
            if let PollOutcome::Searching(next) =
                self.watcher.tick(poll, &self.shared, &mut self.notifier)
            {
                self.timers.schedule(now + self.watcher.interval(), next);
            }
        }
        fired
    }

    /// Returns when the next watcher poll is due.
    #[must_use]
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns the current run state.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        self.shared.lock().run_state
    }

    /// Returns the current viewport.
    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.shared.lock().viewport
    }

    /// Returns the render loop counters.
    #[must_use]
    pub fn frame_stats(&self) -> FrameStats {
        self.shared.lock().stats
    }

    /// Returns the watcher state.
    #[must_use]
    pub const fn watcher_state(&self) -> WatcherState {
        self.watcher.state()
    }

    /// Returns true if a resume is waiting on the permission answer.
    #[must_use]
    pub const fn is_resume_deferred(&self) -> bool {
        self.resume_deferred
    }

    /// Returns true while a continuous render thread is running.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.render_thread
            .as_ref()
            .is_some_and(RenderThread::is_running)
    }

    /// Returns the shared session cell.
    #[must_use]
    pub fn shared(&self) -> &SharedSession<E> {
        &self.shared
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ParallaxConfig {
        &self.config
    }

    /// Returns the permission collaborator.
    #[must_use]
    pub const fn permissions(&self) -> &P {
        &self.permissions
    }

    /// Returns the permission collaborator mutably.
    pub fn permissions_mut(&mut self) -> &mut P {
        &mut self.permissions
    }

    /// Returns the notification collaborator.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}

impl<E, P, N> Drop for LifecycleCoordinator<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    fn drop(&mut self) {
        self.on_destroy();
    }
}

impl<E, P, N> std::fmt::Debug for LifecycleCoordinator<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("run_state", &self.run_state())
            .field("watcher", &self.watcher)
            .field("resume_deferred", &self.resume_deferred)
            .field("rendering", &self.is_rendering())
            .finish_non_exhaustive()
    }
}
