//! # Session Handle
//!
//! Single-owner wrapper around the engine. The handle is either live
//! (`Some(engine)`) or absent (`None`); once absent it stays absent.
//!
//! ## Thread Safety
//!
//! None. The handle is `Send` if the engine is, and the runtime keeps it
//! behind the session lock. Every call here assumes exclusive access.

use crate::engine::{AssetSource, DrawFlags, ResumeContext, SessionEngine, SessionOptions};
use crate::error::{EngineError, LifecycleError, LifecycleResult};
use crate::geometry::Geometry;

/// Owns one engine instance for its whole life.
pub struct SessionHandle<E: SessionEngine> {
    engine: Option<E>,
}

impl<E: SessionEngine> SessionHandle<E> {
    /// Creates the engine through `ctor`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InitFailure`] if the constructor fails.
    pub fn create<F>(assets: &AssetSource, ctor: F) -> LifecycleResult<Self>
    where
        F: FnOnce(&AssetSource) -> Result<E, EngineError>,
    {
        let engine = ctor(assets).map_err(LifecycleError::InitFailure)?;
        tracing::info!("session created (assets: {})", assets.root.display());
        Ok(Self {
            engine: Some(engine),
        })
    }

    /// Wraps an already constructed engine.
    #[must_use]
    pub fn from_engine(engine: E) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Returns true until [`destroy`](Self::destroy) has run.
    #[inline]
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.engine.is_some()
    }

    /// Returns the engine, if still live.
    #[must_use]
    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    fn live(&mut self) -> LifecycleResult<&mut E> {
        self.engine.as_mut().ok_or(LifecycleError::SessionAbsent)
    }

    /// Applies session settings.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Session`] if the engine rejects them,
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn configure(&mut self, options: &SessionOptions) -> LifecycleResult<()> {
        self.live()?
            .configure(options)
            .map_err(LifecycleError::Session)
    }

    /// Resumes the session.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Session`] if the engine fails to resume,
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn resume(&mut self, context: &ResumeContext) -> LifecycleResult<()> {
        self.live()?
            .resume(context)
            .map_err(LifecycleError::Session)
    }

    /// Pauses the session.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn pause(&mut self) -> LifecycleResult<()> {
        self.live()?.pause();
        Ok(())
    }

    /// Forwards the surface-created signal.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn surface_created(&mut self) -> LifecycleResult<()> {
        self.live()?.surface_created();
        Ok(())
    }

    /// Applies display geometry.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Frame`] if the engine rejects it,
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn apply_geometry(&mut self, geometry: Geometry) -> LifecycleResult<()> {
        self.live()?
            .apply_geometry(geometry)
            .map_err(LifecycleError::Frame)
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Frame`] if the engine fails,
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn draw_frame(&mut self, flags: DrawFlags) -> LifecycleResult<()> {
        self.live()?
            .draw_frame(flags)
            .map_err(LifecycleError::Frame)
    }

    /// Queries whether any surface has been detected.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Watcher`] if the query fails,
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn has_detected_surfaces(&self) -> LifecycleResult<bool> {
        self.engine
            .as_ref()
            .ok_or(LifecycleError::SessionAbsent)?
            .has_detected_surfaces()
            .map_err(LifecycleError::Watcher)
    }

    /// Forwards a tap.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::SessionAbsent`] after destroy.
    pub fn touch(&mut self, x: f32, y: f32) -> LifecycleResult<()> {
        self.live()?.touch(x, y);
        Ok(())
    }

    /// Destroys the engine.
    ///
    /// Returns true if this call released it, false if it was already gone.
    /// A second call never reaches the engine.
    pub fn destroy(&mut self) -> bool {
        match self.engine.take() {
            Some(mut engine) => {
                engine.destroy();
                tracing::info!("session destroyed");
                true
            }
            None => false,
        }
    }
}

impl<E: SessionEngine> Drop for SessionHandle<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<E: SessionEngine> std::fmt::Debug for SessionHandle<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct CountingEngine {
        destroyed: Arc<AtomicU32>,
        fail_resume: bool,
    }

    impl SessionEngine for CountingEngine {
        fn configure(&mut self, _options: &SessionOptions) -> Result<(), EngineError> {
            Ok(())
        }
        fn resume(&mut self, _context: &ResumeContext) -> Result<(), EngineError> {
            if self.fail_resume {
                Err(EngineError::new("Failed to resume AR session."))
            } else {
                Ok(())
            }
        }
        fn pause(&mut self) {}
        fn surface_created(&mut self) {}
        fn apply_geometry(&mut self, _geometry: Geometry) -> Result<(), EngineError> {
            Ok(())
        }
        fn draw_frame(&mut self, _flags: DrawFlags) -> Result<(), EngineError> {
            Ok(())
        }
        fn has_detected_surfaces(&self) -> Result<bool, EngineError> {
            Ok(false)
        }
        fn touch(&mut self, _x: f32, _y: f32) {}
        fn destroy(&mut self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn handle(fail_resume: bool) -> (SessionHandle<CountingEngine>, Arc<AtomicU32>) {
        let destroyed = Arc::new(AtomicU32::new(0));
        let engine = CountingEngine {
            destroyed: Arc::clone(&destroyed),
            fail_resume,
        };
        (SessionHandle::from_engine(engine), destroyed)
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (mut session, destroyed) = handle(false);
        assert!(session.destroy());
        assert!(!session.destroy());
        drop(session);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_destroys_live_session() {
        let (session, destroyed) = handle(false);
        drop(session);
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_operations_fail_after_destroy() {
        let (mut session, _) = handle(false);
        session.destroy();

        assert_eq!(
            session.resume(&ResumeContext { attempt: 1 }),
            Err(LifecycleError::SessionAbsent)
        );
        assert_eq!(session.pause(), Err(LifecycleError::SessionAbsent));
        assert_eq!(
            session.draw_frame(DrawFlags::default()),
            Err(LifecycleError::SessionAbsent)
        );
        assert_eq!(
            session.has_detected_surfaces(),
            Err(LifecycleError::SessionAbsent)
        );
        assert!(!session.is_live());
    }

    #[test]
    fn test_resume_failure_maps_to_session_error() {
        let (mut session, _) = handle(true);
        let err = session.resume(&ResumeContext { attempt: 1 }).unwrap_err();
        assert!(matches!(err, LifecycleError::Session(_)));
    }

    #[test]
    fn test_create_failure_is_init_failure() {
        let result: LifecycleResult<SessionHandle<CountingEngine>> =
            SessionHandle::create(&AssetSource::default(), |_| {
                Err(EngineError::new("no camera"))
            });
        assert_eq!(
            result.unwrap_err(),
            LifecycleError::InitFailure(EngineError::new("no camera"))
        );
    }
}
