//! # Event Loop
//!
//! The event thread. Host events arrive over a channel; watcher polls are
//! fired from the coordinator's timer queue between events.
//!
//! ```text
//!   host callbacks ──> Sender<HostEvent> ──┐
//!                                          ▼
//!                 ┌────────────────────────────────────┐
//!                 │ loop:                              │
//!                 │   fire due watcher polls           │
//!                 │   recv_deadline(next poll)         │
//!                 │   coordinator.dispatch(event)      │
//!                 └────────────────────────────────────┘
//! ```
//!
//! The loop ends on `Destroy`, on a fatal error, or when every sender is
//! dropped. The session is destroyed in all three cases.

use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use parallax_core::{LifecycleResult, SessionEngine};

use crate::coordinator::{Dispatch, LifecycleCoordinator};
use crate::host::{HostEvent, Notifier, PermissionGate};

/// Creates the channel the host uses to reach the event thread.
#[must_use]
pub fn host_channel() -> (Sender<HostEvent>, Receiver<HostEvent>) {
    crossbeam_channel::unbounded()
}

/// Runs the coordinator on the current thread.
pub struct EventLoop<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    coordinator: LifecycleCoordinator<E, P, N>,
    events: Receiver<HostEvent>,
}

impl<E, P, N> EventLoop<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    /// Creates an event loop reading from `events`.
    #[must_use]
    pub fn new(coordinator: LifecycleCoordinator<E, P, N>, events: Receiver<HostEvent>) -> Self {
        Self {
            coordinator,
            events,
        }
    }

    /// Returns the coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &LifecycleCoordinator<E, P, N> {
        &self.coordinator
    }

    /// Processes events until the session is destroyed.
    ///
    /// Returns the coordinator so the caller can inspect the final state.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that ended the run (permission denied).
    pub fn run(mut self) -> LifecycleResult<LifecycleCoordinator<E, P, N>> {
        tracing::info!("event loop started");
        loop {
            self.coordinator.run_due_timers(Instant::now());

            let event = match self.coordinator.next_timer_deadline() {
                Some(deadline) => match self.events.recv_deadline(deadline) {
                    Ok(event) => event,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.events.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            tracing::trace!("host event: {event:?}");
            match self.coordinator.dispatch(event) {
                Ok(Dispatch::Continue) => {}
                Ok(Dispatch::Exit) => {
                    tracing::info!("event loop finished");
                    return Ok(self.coordinator);
                }
                Err(err) => {
                    tracing::error!("event loop aborted: {err}");
                    self.coordinator.on_destroy();
                    return Err(err);
                }
            }
        }

        tracing::info!("host disconnected, destroying session");
        self.coordinator.on_destroy();
        Ok(self.coordinator)
    }
}

impl<E, P, N> std::fmt::Debug for EventLoop<E, P, N>
where
    E: SessionEngine,
    P: PermissionGate,
    N: Notifier,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("coordinator", &self.coordinator)
            .field("queued_events", &self.events.len())
            .finish()
    }
}
