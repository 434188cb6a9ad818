//! # Plane Status Watcher
//!
//! Polls the session until it reports a detected surface, then dismisses the
//! "searching" message and stops.
//!
//! ```text
//! start() ──> poll ──> detected? ── yes ──> dismiss, stop
//!               ▲          │
//!               │          no / query failed
//!               └── +interval ┘
//! ```
//!
//! Cancellation is cooperative. Every scheduled poll carries the generation
//! it was issued under; `stop()` bumps the generation, so a poll still
//! sitting in the timer queue fires as a no-op.

use std::time::Duration;

use parallax_core::SessionEngine;

use crate::host::Notifier;
use crate::shared::SharedSession;

/// Whether a poll is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatcherState {
    /// The watcher is running.
    pub active: bool,
    /// A poll is waiting in the timer queue.
    pub pending: bool,
}

/// Token for one scheduled poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledPoll {
    generation: u64,
}

/// Result of firing a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A surface was found; the watcher stopped.
    Detected,
    /// Nothing yet; schedule the returned poll after the interval.
    Searching(ScheduledPoll),
    /// The poll was cancelled before it fired.
    Stale,
}

/// Cancellable self-rescheduling poll of the session's plane status.
#[derive(Debug)]
pub struct PlaneStatusWatcher {
    state: WatcherState,
    interval: Duration,
    generation: u64,
}

impl PlaneStatusWatcher {
    /// Creates an idle watcher polling every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            state: WatcherState {
                active: false,
                pending: false,
            },
            interval,
            generation: 0,
        }
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> WatcherState {
        self.state
    }

    /// Returns true while running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state.active
    }

    /// Starts watching.
    ///
    /// Returns the first poll to schedule, or `None` if already running.
    pub fn start(&mut self) -> Option<ScheduledPoll> {
        if self.state.active {
            return None;
        }
        self.generation += 1;
        self.state = WatcherState {
            active: true,
            pending: true,
        };
        Some(ScheduledPoll {
            generation: self.generation,
        })
    }

    /// Stops watching and invalidates any scheduled poll.
    ///
    /// Returns true if the watcher was running.
    pub fn stop(&mut self) -> bool {
        let was_active = self.state.active;
        self.generation += 1;
        self.state = WatcherState::default();
        was_active
    }

    /// Fires a scheduled poll.
    pub fn tick<E, N>(
        &mut self,
        poll: ScheduledPoll,
        shared: &SharedSession<E>,
        notifier: &mut N,
    ) -> PollOutcome
    where
        E: SessionEngine,
        N: Notifier,
    {
        if !self.state.active || poll.generation != self.generation {
            return PollOutcome::Stale;
        }
        self.state.pending = false;

        let detected = shared.lock().session.has_detected_surfaces();
        match detected {
            Ok(true) => {
                notifier.dismiss_message();
                self.state.active = false;
                tracing::info!("surface detected, watcher stopped");
                PollOutcome::Detected
            }
            Ok(false) => self.reschedule(),
            Err(err) => {
                tracing::warn!("plane status query failed, retrying: {err}");
                self.reschedule()
            }
        }
    }

    fn reschedule(&mut self) -> PollOutcome {
        self.state.pending = true;
        PollOutcome::Searching(ScheduledPoll {
            generation: self.generation,
        })
    }
}
