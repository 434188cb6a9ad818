//! # Host Boundary
//!
//! The collaborators the coordinator talks to, and the events the host
//! feeds it. Permission and notification calls happen on the event thread
//! only, never under the session lock.

use parallax_core::Rotation;

/// Message shown when the camera permission is refused.
pub const PERMISSION_REQUIRED_MESSAGE: &str =
    "Camera permission is needed to run this application";

/// The platform permission subsystem.
pub trait PermissionGate {
    /// Returns true if the camera permission is held.
    fn has_permission(&self) -> bool;

    /// Asks the user for the permission. The answer arrives later as
    /// [`HostEvent::PermissionResult`].
    fn request_permission(&mut self);

    /// Returns true if the platform wants an explanation shown before asking
    /// again. False after "don't ask again".
    fn should_show_rationale(&self) -> bool;

    /// Opens the platform settings page for this application.
    fn open_settings(&mut self);
}

/// User-visible notifications. Pure side effects.
pub trait Notifier {
    /// Shows a message that stays until dismissed or replaced.
    fn show_persistent_message(&mut self, text: &str);

    /// Dismisses the persistent message, if any.
    fn dismiss_message(&mut self);

    /// Shows a short-lived notice.
    fn show_transient_toast(&mut self, text: &str);
}

/// Events delivered to the event thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Host came to the foreground.
    Resume,
    /// Host went to the background.
    Pause,
    /// Host is being torn down.
    Destroy,
    /// The drawing surface was created.
    SurfaceCreated,
    /// The drawing surface changed size.
    SurfaceChanged {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// The display changed (including rotation-only changes).
    DisplayChanged {
        /// Current display rotation.
        rotation: Rotation,
    },
    /// Answer to a permission request.
    PermissionResult {
        /// True if granted.
        granted: bool,
    },
    /// A tap on the surface.
    Touch {
        /// Surface x coordinate.
        x: f32,
        /// Surface y coordinate.
        y: f32,
    },
}
