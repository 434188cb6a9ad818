//! Recording collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use parallax_core::{
    AssetSource, DrawFlags, EngineError, Geometry, ParallaxConfig, RenderMode, ResumeContext,
    SessionEngine, SessionOptions,
};
use parallax_runtime::{Notifier, PermissionGate};

/// One call into the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Configure(SessionOptions),
    Resume(u32),
    Pause,
    SurfaceCreated,
    ApplyGeometry(Geometry),
    Draw,
    Status,
    Touch(f32, f32),
    Destroy,
}

#[derive(Debug, Default)]
struct ProbeState {
    calls: Vec<Call>,
    fail_resume: bool,
    fail_draw: bool,
    fail_geometry: bool,
    detect_on_poll: Option<u32>,
    polls: u32,
    in_call: bool,
    overlaps: u32,
    destroyed: bool,
    calls_after_destroy: u32,
}

/// Test-side view of a [`RecordingEngine`].
#[derive(Debug, Clone, Default)]
pub struct Probe {
    state: Arc<Mutex<ProbeState>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine reporting to this probe.
    pub fn engine(&self) -> RecordingEngine {
        RecordingEngine {
            probe: self.clone(),
        }
    }

    /// Constructor closure for `LifecycleCoordinator::create`.
    pub fn ctor(&self) -> impl FnOnce(&AssetSource) -> Result<RecordingEngine, EngineError> {
        let engine = self.engine();
        move |_assets: &AssetSource| Ok(engine)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|call| pred(call)).count()
    }

    /// Calls recorded after the last `Resume`.
    pub fn calls_since_resume(&self) -> Vec<Call> {
        let calls = self.calls();
        let start = calls
            .iter()
            .rposition(|call| matches!(call, Call::Resume(_)))
            .map_or(0, |idx| idx + 1);
        calls[start..].to_vec()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn set_fail_resume(&self, fail: bool) {
        self.state.lock().fail_resume = fail;
    }

    pub fn set_fail_draw(&self, fail: bool) {
        self.state.lock().fail_draw = fail;
    }

    pub fn set_fail_geometry(&self, fail: bool) {
        self.state.lock().fail_geometry = fail;
    }

    pub fn detect_on_poll(&self, poll: u32) {
        self.state.lock().detect_on_poll = Some(poll);
    }

    pub fn overlaps(&self) -> u32 {
        self.state.lock().overlaps
    }

    pub fn calls_after_destroy(&self) -> u32 {
        self.state.lock().calls_after_destroy
    }

    /// Spins until `pred` holds or `timeout` passes.
    pub fn wait_until(&self, timeout: Duration, pred: impl Fn(&Self) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if pred(self) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        pred(self)
    }

    fn enter(&self, call: Call) {
        let mut state = self.state.lock();
        if state.in_call {
            state.overlaps += 1;
        }
        if state.destroyed {
            state.calls_after_destroy += 1;
        }
        if call == Call::Destroy {
            state.destroyed = true;
        }
        state.calls.push(call);
        state.in_call = true;
    }

    fn exit(&self) {
        self.state.lock().in_call = false;
    }
}

/// Engine that records every call and fails on demand.
#[derive(Debug)]
pub struct RecordingEngine {
    probe: Probe,
}

impl SessionEngine for RecordingEngine {
    fn configure(&mut self, options: &SessionOptions) -> Result<(), EngineError> {
        self.probe.enter(Call::Configure(*options));
        self.probe.exit();
        Ok(())
    }

    fn resume(&mut self, context: &ResumeContext) -> Result<(), EngineError> {
        self.probe.enter(Call::Resume(context.attempt));
        let fail = self.probe.state.lock().fail_resume;
        self.probe.exit();
        if fail {
            Err(EngineError::new("Failed to resume AR session."))
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.probe.enter(Call::Pause);
        self.probe.exit();
    }

    fn surface_created(&mut self) {
        self.probe.enter(Call::SurfaceCreated);
        self.probe.exit();
    }

    fn apply_geometry(&mut self, geometry: Geometry) -> Result<(), EngineError> {
        self.probe.enter(Call::ApplyGeometry(geometry));
        let fail = self.probe.state.lock().fail_geometry;
        self.probe.exit();
        if fail {
            Err(EngineError::new("invalid display geometry"))
        } else {
            Ok(())
        }
    }

    fn draw_frame(&mut self, _flags: DrawFlags) -> Result<(), EngineError> {
        self.probe.enter(Call::Draw);
        // Widen the window in which a racing call would be caught.
        std::thread::yield_now();
        let fail = self.probe.state.lock().fail_draw;
        self.probe.exit();
        if fail {
            Err(EngineError::new("ArSession_update error"))
        } else {
            Ok(())
        }
    }

    fn has_detected_surfaces(&self) -> Result<bool, EngineError> {
        self.probe.enter(Call::Status);
        let detected = {
            let mut state = self.probe.state.lock();
            state.polls += 1;
            state.detect_on_poll.is_some_and(|poll| state.polls >= poll)
        };
        self.probe.exit();
        Ok(detected)
    }

    fn touch(&mut self, x: f32, y: f32) {
        self.probe.enter(Call::Touch(x, y));
        self.probe.exit();
    }

    fn destroy(&mut self) {
        self.probe.enter(Call::Destroy);
        self.probe.exit();
    }
}

/// Permission subsystem with a fixed answer.
#[derive(Debug, Default)]
pub struct MockPermissions {
    pub granted: bool,
    pub rationale: bool,
    pub requests: u32,
    pub settings_opened: u32,
}

impl MockPermissions {
    pub fn granted() -> Self {
        Self {
            granted: true,
            ..Self::default()
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }
}

impl PermissionGate for MockPermissions {
    fn has_permission(&self) -> bool {
        self.granted
    }

    fn request_permission(&mut self) {
        self.requests += 1;
    }

    fn should_show_rationale(&self) -> bool {
        self.rationale
    }

    fn open_settings(&mut self) {
        self.settings_opened += 1;
    }
}

/// Notifier that remembers what was shown.
#[derive(Debug, Default)]
pub struct MockNotifier {
    pub current: Option<String>,
    pub shown: Vec<String>,
    pub dismissed: u32,
    pub toasts: Vec<String>,
}

impl Notifier for MockNotifier {
    fn show_persistent_message(&mut self, text: &str) {
        self.current = Some(text.to_owned());
        self.shown.push(text.to_owned());
    }

    fn dismiss_message(&mut self) {
        self.current = None;
        self.dismissed += 1;
    }

    fn show_transient_toast(&mut self, text: &str) {
        self.toasts.push(text.to_owned());
    }
}

/// Config where the test drives frames itself.
pub fn host_driven_config() -> ParallaxConfig {
    let mut config = ParallaxConfig::default();
    config.render.mode = RenderMode::HostDriven;
    config
}

/// Config with a fast render thread and a fast watcher.
pub fn continuous_config(target_fps: u32, watcher_interval_ms: u64) -> ParallaxConfig {
    let mut config = ParallaxConfig::default();
    config.render.mode = RenderMode::Continuous;
    config.render.target_fps = target_fps;
    config.watcher.interval_ms = watcher_interval_ms;
    config
}
