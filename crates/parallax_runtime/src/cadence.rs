//! # Frame Cadence
//!
//! Fixed-rate pacing for the continuous render thread.
//!
//! The render thread must:
//! - Never draw faster than the target rate
//! - Keep going when a frame runs late (no catch-up bursts)

use std::time::{Duration, Instant};

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CadenceStats {
    /// Shortest frame observed (microseconds).
    pub min_frame_us: u64,
    /// Longest frame observed (microseconds).
    pub max_frame_us: u64,
    /// Rolling average frame time (microseconds).
    pub avg_frame_us: u64,
    /// Frames that took longer than the budget.
    pub late_frames: u64,
    /// Total frames measured.
    pub total_frames: u64,
}

/// Paces frames at a fixed rate.
#[derive(Debug)]
pub struct FrameCadence {
    /// Target frame duration.
    frame_duration: Duration,
    /// Start of the previous frame.
    last_frame: Instant,
    /// Frames begun.
    frame_count: u64,
    /// Timing statistics.
    stats: CadenceStats,
}

impl FrameCadence {
    /// Creates a cadence for `target_fps` frames per second.
    ///
    /// A rate of zero is treated as one frame per second.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let frame_duration = Duration::from_micros(1_000_000 / u64::from(target_fps.max(1)));

        Self {
            frame_duration,
            last_frame: Instant::now(),
            frame_count: 0,
            stats: CadenceStats {
                min_frame_us: u64::MAX,
                avg_frame_us: u64::try_from(frame_duration.as_micros()).unwrap_or(u64::MAX),
                ..CadenceStats::default()
            },
        }
    }

    /// Returns how long to wait before the next frame is due.
    #[must_use]
    pub fn time_until_next_frame(&self) -> Duration {
        self.frame_duration
            .saturating_sub(self.last_frame.elapsed())
    }

    /// Sleeps until the next frame is due.
    pub fn wait_for_next_frame(&self) {
        let remaining = self.time_until_next_frame();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }

    /// Marks the start of a frame.
    ///
    /// Returns the frame start time for duration measurement.
    pub fn begin_frame(&mut self) -> Instant {
        let now = Instant::now();
        self.last_frame = now;
        self.frame_count += 1;
        now
    }

    /// Marks the end of a frame and records its duration.
    pub fn end_frame(&mut self, start: Instant) {
        let duration = start.elapsed();
        let duration_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        self.stats.total_frames += 1;
        self.stats.min_frame_us = self.stats.min_frame_us.min(duration_us);
        self.stats.max_frame_us = self.stats.max_frame_us.max(duration_us);
        self.stats.avg_frame_us = (self.stats.avg_frame_us * 15 + duration_us) / 16;

        if duration > self.frame_duration {
            self.stats.late_frames += 1;
        }
    }

    /// Returns the number of frames begun.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &CadenceStats {
        &self.stats
    }

    /// Returns the target frame duration.
    #[must_use]
    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }
}

impl Default for FrameCadence {
    fn default() -> Self {
        Self::new(parallax_core::config::DEFAULT_TARGET_FPS)
    }
}
