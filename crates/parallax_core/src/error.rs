//! # Lifecycle Error Types
//!
//! All errors that can cross the coordinator boundary.

use thiserror::Error;

/// Error reported by the opaque session engine.
///
/// The engine is a black box; all we keep is its message, which is what
/// gets shown to the user when a resume fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Creates an engine error with a user-presentable message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the engine's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur while driving the session lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Session creation failed. Fatal: startup is aborted.
    #[error("failed to create session: {0}")]
    InitFailure(EngineError),

    /// Configure or resume failed. Recoverable: the user may retry by
    /// bringing the host back to the foreground.
    #[error("session error: {0}")]
    Session(EngineError),

    /// The camera permission was denied. Terminal for this run.
    #[error("camera permission denied")]
    PermissionDenied,

    /// Drawing or applying geometry failed. The frame is dropped.
    #[error("frame failure: {0}")]
    Frame(EngineError),

    /// The plane status query failed. Treated as "not detected yet".
    #[error("plane status query failed: {0}")]
    Watcher(EngineError),

    /// The session has already been destroyed.
    #[error("session has been destroyed")]
    SessionAbsent,
}

impl LifecycleError {
    /// Returns the underlying engine error, if any.
    #[must_use]
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::InitFailure(e) | Self::Session(e) | Self::Frame(e) | Self::Watcher(e) => Some(e),
            Self::PermissionDenied | Self::SessionAbsent => None,
        }
    }

    /// Returns the text shown to the user for this error.
    ///
    /// Engine failures surface the engine's own message verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.engine_error() {
            Some(e) => e.message().to_owned(),
            None => self.to_string(),
        }
    }

    /// Returns true if this error must end the run.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InitFailure(_) | Self::PermissionDenied)
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
