//! # PARALLAX Simulator
//!
//! Drives a full lifecycle against the simulated engine: permission
//! request, resume, resize, rotation, touches, pause, resume, destroy.
//!
//! ```bash
//! # Defaults
//! RUST_LOG=info parallax_simulator
//!
//! # With a config file, surfaces detected on the 5th poll
//! RUST_LOG=debug parallax_simulator parallax.toml 5
//! ```

use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use parallax::core::{ParallaxConfig, Rotation};
use parallax::sim::{LogNotifier, SimPermissions, SimulatedEngine};
use parallax::{host_channel, EventLoop, HostEvent, LifecycleCoordinator};
use tracing_subscriber::EnvFilter;

/// Status poll on which the simulated engine reports surfaces.
const DEFAULT_DETECT_AFTER: u32 = 3;

fn main() -> ExitCode {
    // Honor `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match ParallaxConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!("cannot load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => ParallaxConfig::default(),
    };
    let detect_after = match args.next().map(|arg| arg.parse::<u32>()) {
        Some(Ok(n)) => n,
        Some(Err(err)) => {
            tracing::error!("invalid poll count: {err}");
            return ExitCode::FAILURE;
        }
        None => DEFAULT_DETECT_AFTER,
    };

    let (host, events) = host_channel();
    let permissions = SimPermissions::new(host.clone(), true);
    let mut report = None;
    let coordinator = match LifecycleCoordinator::create(
        config,
        permissions,
        LogNotifier::default(),
        |assets| {
            let engine = SimulatedEngine::open(assets, detect_after)?;
            report = Some(engine.report());
            Ok(engine)
        },
    ) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            tracing::error!("{}", err.user_message());
            return ExitCode::FAILURE;
        }
    };
    let interval = coordinator.config().watcher.interval();

    let event_thread = match thread::Builder::new()
        .name("parallax-events".into())
        .spawn(move || EventLoop::new(coordinator, events).run())
    {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!("failed to spawn event thread: {err}");
            return ExitCode::FAILURE;
        }
    };

    let script = [
        HostEvent::SurfaceCreated,
        HostEvent::SurfaceChanged {
            width: 1080,
            height: 2340,
        },
        HostEvent::Resume,
        HostEvent::Touch { x: 540.0, y: 1170.0 },
        HostEvent::DisplayChanged {
            rotation: Rotation::Deg90,
        },
        HostEvent::SurfaceChanged {
            width: 2340,
            height: 1080,
        },
        HostEvent::Touch { x: 1200.0, y: 500.0 },
    ];
    for event in script {
        if host.send(event).is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    // Let the watcher find surfaces, then cycle through the background.
    thread::sleep(interval * (detect_after + 1));
    for event in [HostEvent::Pause, HostEvent::Resume] {
        if host.send(event).is_err() {
            break;
        }
        thread::sleep(Duration::from_millis(200));
    }
    let _ = host.send(HostEvent::Destroy);

    let outcome = match event_thread.join() {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::error!("event thread panicked");
            return ExitCode::FAILURE;
        }
    };
    let coordinator = match outcome {
        Ok(coordinator) => coordinator,
        Err(err) => {
            tracing::error!("run ended: {}", err.user_message());
            return ExitCode::FAILURE;
        }
    };

    let stats = coordinator.frame_stats();
    tracing::info!(
        "frames drawn {}, dropped {}, idle {}, geometry applied {}, touches {}",
        stats.frames_drawn,
        stats.frames_dropped,
        stats.frames_idle,
        stats.geometry_applied,
        stats.touches_forwarded
    );
    if let Some(report) = report {
        tracing::info!("engine saw {:?}", *report.lock());
    }
    ExitCode::SUCCESS
}
