//! # PARALLAX
//!
//! AR session lifecycle and render loop coordination.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                             PARALLAX                              │
//! ├───────────────────────────────────────────────────────────────────┤
//! │                                                                   │
//! │  ┌─────────────────────┐          ┌─────────────────────────────┐ │
//! │  │   parallax_core     │          │   parallax_runtime          │ │
//! │  │                     │─────────>│                             │ │
//! │  │  • SessionHandle    │          │  • LifecycleCoordinator     │ │
//! │  │  • SessionEngine    │          │  • RenderLoopDriver         │ │
//! │  │  • ViewportState    │          │  • PlaneStatusWatcher       │ │
//! │  │  • ParallaxConfig   │          │  • EventLoop                │ │
//! │  └─────────────────────┘          └─────────────────────────────┘ │
//! │                                                                   │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `sim`: simulated engine and host collaborators

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod sim;

pub use parallax_core as core;
pub use parallax_runtime as runtime;

pub use parallax_core::{LifecycleError, LifecycleResult, ParallaxConfig, SessionEngine};
pub use parallax_runtime::{host_channel, EventLoop, HostEvent, LifecycleCoordinator};
pub use sim::{LogNotifier, SimPermissions, SimulatedEngine};
