//! # PARALLAX Core
//!
//! Ownership and state types shared by the event thread and the render thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               SessionHandle<E>               │
//! │                                              │
//! │   Some(engine) ── destroy() ──> None         │
//! │   (live)                        (absent)     │
//! └──────────────────────────────────────────────┘
//!          ▲                          ▲
//!          │ configure/resume/pause   │ apply_geometry/draw_frame
//!    Event thread               Render thread
//! ```
//!
//! Nothing in this crate synchronizes. The runtime crate wraps the handle,
//! the [`RunState`] and the [`ViewportState`] in one lock.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod session;
pub mod state;

pub use config::{ConfigError, ParallaxConfig, RenderConfig, RenderMode, WatcherConfig};
pub use engine::{AssetSource, DrawFlags, ResumeContext, SessionEngine, SessionOptions};
pub use error::{EngineError, LifecycleError, LifecycleResult};
pub use geometry::{Geometry, Rotation, ViewportState};
pub use session::SessionHandle;
pub use state::RunState;
