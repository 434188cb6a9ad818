//! # Simulated Host
//!
//! A headless engine and host collaborators for running a full lifecycle
//! without a device. The engine "detects" surfaces after a fixed number of
//! status polls.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use parallax_core::{
    AssetSource, DrawFlags, EngineError, Geometry, ResumeContext, SessionEngine, SessionOptions,
};
use parallax_runtime::{HostEvent, Notifier, PermissionGate};

/// What the simulated engine saw over its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimReport {
    /// Successful resumes.
    pub resumes: u32,
    /// Pauses.
    pub pauses: u32,
    /// Frames drawn.
    pub frames: u64,
    /// Geometry applications.
    pub geometries: u32,
    /// Touches received.
    pub touches: u32,
    /// Status polls answered.
    pub polls: u32,
    /// True once torn down.
    pub destroyed: bool,
}

/// Engine that logs every call and counts what it saw.
#[derive(Debug)]
pub struct SimulatedEngine {
    detect_after: u32,
    polls: AtomicU32,
    options: SessionOptions,
    report: Arc<Mutex<SimReport>>,
}

impl SimulatedEngine {
    /// Creates an engine that reports surfaces on the `detect_after`-th
    /// status poll.
    #[must_use]
    pub fn new(detect_after: u32) -> Self {
        Self {
            detect_after,
            polls: AtomicU32::new(0),
            options: SessionOptions::default(),
            report: Arc::new(Mutex::new(SimReport::default())),
        }
    }

    /// Engine constructor for `LifecycleCoordinator::create`. Fails if the
    /// asset root is empty.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the asset root is empty.
    pub fn open(assets: &AssetSource, detect_after: u32) -> Result<Self, EngineError> {
        if assets.root.as_os_str().is_empty() {
            return Err(EngineError::new("asset root is empty"));
        }
        tracing::info!("sim: loading assets from {}", assets.root.display());
        Ok(Self::new(detect_after))
    }

    /// Returns a handle to the report, readable after the engine is gone.
    #[must_use]
    pub fn report(&self) -> Arc<Mutex<SimReport>> {
        Arc::clone(&self.report)
    }
}

impl SessionEngine for SimulatedEngine {
    fn configure(&mut self, options: &SessionOptions) -> Result<(), EngineError> {
        tracing::debug!("sim: configure {options:?}");
        self.options = *options;
        Ok(())
    }

    fn resume(&mut self, context: &ResumeContext) -> Result<(), EngineError> {
        tracing::info!(
            "sim: resume (attempt {}, depth {})",
            context.attempt,
            self.options.depth_enabled
        );
        self.report.lock().resumes += 1;
        Ok(())
    }

    fn pause(&mut self) {
        tracing::info!("sim: pause");
        self.report.lock().pauses += 1;
    }

    fn surface_created(&mut self) {
        tracing::info!("sim: surface created");
    }

    fn apply_geometry(&mut self, geometry: Geometry) -> Result<(), EngineError> {
        if geometry.width == 0 || geometry.height == 0 {
            return Err(EngineError::new(format!(
                "degenerate viewport {}x{}",
                geometry.width, geometry.height
            )));
        }
        tracing::info!(
            "sim: viewport {}x{} at {} degrees",
            geometry.width,
            geometry.height,
            geometry.rotation.degrees()
        );
        self.report.lock().geometries += 1;
        Ok(())
    }

    fn draw_frame(&mut self, flags: DrawFlags) -> Result<(), EngineError> {
        let mut report = self.report.lock();
        report.frames += 1;
        if report.frames % 60 == 0 {
            tracing::debug!("sim: frame {} ({flags:?})", report.frames);
        }
        Ok(())
    }

    fn has_detected_surfaces(&self) -> Result<bool, EngineError> {
        let polls = self.polls.fetch_add(1, Ordering::Relaxed) + 1;
        self.report.lock().polls = polls;
        Ok(polls >= self.detect_after)
    }

    fn touch(&mut self, x: f32, y: f32) {
        tracing::info!("sim: touch at ({x:.1}, {y:.1})");
        self.report.lock().touches += 1;
    }

    fn destroy(&mut self) {
        tracing::info!("sim: destroy");
        self.report.lock().destroyed = true;
    }
}

/// Permission gate that grants on request by posting the answer back to the
/// event thread.
#[derive(Debug)]
pub struct SimPermissions {
    granted: bool,
    grant_on_request: bool,
    events: Sender<HostEvent>,
}

impl SimPermissions {
    /// Creates a gate without the permission. `grant_on_request` decides the
    /// answer the simulated user gives.
    #[must_use]
    pub const fn new(events: Sender<HostEvent>, grant_on_request: bool) -> Self {
        Self {
            granted: false,
            grant_on_request,
            events,
        }
    }
}

impl PermissionGate for SimPermissions {
    fn has_permission(&self) -> bool {
        self.granted
    }

    fn request_permission(&mut self) {
        tracing::info!("sim: permission requested");
        self.granted = self.grant_on_request;
        let answer = HostEvent::PermissionResult {
            granted: self.granted,
        };
        if self.events.send(answer).is_err() {
            tracing::warn!("sim: event thread gone, permission answer dropped");
        }
    }

    fn should_show_rationale(&self) -> bool {
        false
    }

    fn open_settings(&mut self) {
        tracing::info!("sim: opening application settings");
    }
}

/// Notifier that writes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier {
    current: Option<String>,
}

impl LogNotifier {
    /// Returns the message currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl Notifier for LogNotifier {
    fn show_persistent_message(&mut self, text: &str) {
        tracing::info!("ui: [{text}]");
        self.current = Some(text.to_owned());
    }

    fn dismiss_message(&mut self) {
        if let Some(text) = self.current.take() {
            tracing::info!("ui: dismissed [{text}]");
        }
    }

    fn show_transient_toast(&mut self, text: &str) {
        tracing::info!("ui: toast [{text}]");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_core::{ParallaxConfig, RenderMode, RunState};
    use parallax_runtime::{host_channel, EventLoop, LifecycleCoordinator, ResumeStatus};
    use std::time::{Duration, Instant};

    #[test]
    fn test_engine_detects_after_polls() {
        let engine = SimulatedEngine::new(3);
        assert!(!engine.has_detected_surfaces().unwrap());
        assert!(!engine.has_detected_surfaces().unwrap());
        assert!(engine.has_detected_surfaces().unwrap());
        assert_eq!(engine.report().lock().polls, 3);
    }

    #[test]
    fn test_open_rejects_empty_root() {
        let assets = AssetSource {
            root: std::path::PathBuf::new(),
        };
        assert!(SimulatedEngine::open(&assets, 1).is_err());
        assert!(SimulatedEngine::open(&AssetSource::default(), 1).is_ok());
    }

    #[test]
    fn test_notifier_tracks_current_message() {
        let mut notifier = LogNotifier::default();
        notifier.show_persistent_message("Searching for surfaces...");
        assert_eq!(notifier.current(), Some("Searching for surfaces..."));
        notifier.dismiss_message();
        assert_eq!(notifier.current(), None);
    }

    #[test]
    fn test_permission_answer_is_posted() {
        let (host, events) = host_channel();
        let mut gate = SimPermissions::new(host, true);
        assert!(!gate.has_permission());

        gate.request_permission();
        assert!(gate.has_permission());
        assert_eq!(
            events.try_recv().unwrap(),
            HostEvent::PermissionResult { granted: true }
        );
    }

    #[test]
    fn test_simulated_run_host_driven() {
        let mut config = ParallaxConfig::default();
        config.render.mode = RenderMode::HostDriven;
        config.watcher.interval_ms = 1;

        let engine = SimulatedEngine::new(2);
        let report = engine.report();
        let (host, events) = host_channel();
        let mut coordinator = LifecycleCoordinator::create(
            config,
            SimPermissions::new(host, true),
            LogNotifier::default(),
            move |_: &AssetSource| Ok(engine),
        )
        .unwrap();
        let driver = coordinator.take_render_driver().unwrap();

        assert_eq!(coordinator.on_resume().unwrap(), ResumeStatus::AwaitingPermission);
        let answer = events.try_recv().unwrap();
        coordinator.dispatch(answer).unwrap();
        assert_eq!(coordinator.run_state(), RunState::Resumed);

        coordinator.on_surface_resized(1080, 1920);
        driver.frame();
        driver.frame();

        let deadline = Instant::now() + Duration::from_secs(1);
        while coordinator.watcher_state().active && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
            coordinator.run_due_timers(Instant::now());
        }
        assert!(!coordinator.watcher_state().active);
        assert_eq!(coordinator.notifier().current(), None);

        let coordinator = EventLoop::new(coordinator, {
            let (host, events) = host_channel();
            host.send(HostEvent::Destroy).unwrap();
            events
        })
        .run()
        .unwrap();
        assert_eq!(coordinator.run_state(), RunState::Destroyed);

        let report = *report.lock();
        assert_eq!(report.resumes, 1);
        assert_eq!(report.frames, 2);
        assert_eq!(report.geometries, 1);
        assert_eq!(report.polls, 2);
        assert!(report.destroyed);
    }
}
