//! # PARALLAX Runtime
//!
//! Keeps a continuously running render loop in step with an opaque AR
//! session whose lifecycle is driven by host events.
//!
//! ## Threads
//!
//! ```text
//! ┌─────────────────────┐                 ┌─────────────────────┐
//! │    EVENT THREAD     │                 │    RENDER THREAD    │
//! │                     │                 │                     │
//! │ resume/pause/destroy│                 │ apply geometry      │
//! │ resize/rotation     │   session lock  │ draw frame          │
//! │ permission results  │◄───────────────►│ forward touches     │
//! │ watcher polls       │                 │                     │
//! └─────────────────────┘                 └─────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! 1. **No use after destroy** - destroy and draw take the same lock, and a
//!    destroyed session is absent, not dangling
//! 2. **Geometry once per change** - applied on the first drawn frame after
//!    the change, with the latest values
//! 3. **Watcher in lockstep** - started on resume, cancelled on pause and
//!    destroy; stale polls are no-ops
//!
//! ## Example
//!
//! ```rust,ignore
//! use parallax_runtime::{host_channel, EventLoop, HostEvent, LifecycleCoordinator};
//!
//! let coordinator = LifecycleCoordinator::create(config, permissions, notifier, |assets| {
//!     MyEngine::open(assets)
//! })?;
//! let (host, events) = host_channel();
//! std::thread::spawn(move || EventLoop::new(coordinator, events).run());
//! host.send(HostEvent::Resume)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod cadence;
pub mod coordinator;
pub mod event_loop;
pub mod host;
pub mod render;
pub mod shared;
pub mod timers;
pub mod watcher;

pub use cadence::{CadenceStats, FrameCadence};
pub use coordinator::{Dispatch, LifecycleCoordinator, ResumeStatus};
pub use event_loop::{host_channel, EventLoop};
pub use host::{HostEvent, Notifier, PermissionGate, PERMISSION_REQUIRED_MESSAGE};
pub use render::{touch_channel, FrameOutcome, RenderLoopDriver, RenderThread, TouchEvent};
pub use shared::{share, FrameStats, SessionCell, SharedSession};
pub use timers::TimerQueue;
pub use watcher::{PlaneStatusWatcher, PollOutcome, ScheduledPoll, WatcherState};
