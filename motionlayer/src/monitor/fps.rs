//! Frame-rate sampling and the hysteresis policy.
//!
//! # Transition bands
//!
//! ```text
//!   fps < downgrade_below (30)          any tier -> Low
//!   downgrade_below <= fps < recover_at  no change (deadband)
//!   fps >= recover_at (50)              Low -> Medium, never High
//! ```
//!
//! The asymmetric bands keep the tier from toggling when the frame rate
//! hovers around a single threshold.

use std::sync::Arc;

use tokio::time::Instant;

use super::frame_counter::FrameCounter;
use super::SampleError;
use crate::config::MonitorSettings;
use crate::tier::QualityTier;

/// What a single FPS window asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpsDecision {
    /// Drop straight to `Low`.
    Downgrade,
    /// Lift `Low` to `Medium`.
    Recover,
    /// Leave the tier alone.
    Hold,
}

/// Asymmetric FPS thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsPolicy {
    pub downgrade_below: f64,
    pub recover_at: f64,
}

impl FpsPolicy {
    pub fn from_settings(settings: &MonitorSettings) -> Self {
        Self {
            downgrade_below: settings.fps_downgrade_below,
            recover_at: settings.fps_recover_at,
        }
    }

    /// Decide the transition for one window observed at `tier`.
    pub fn decide(&self, fps: f64, tier: QualityTier) -> FpsDecision {
        if fps < self.downgrade_below && tier != QualityTier::Low {
            FpsDecision::Downgrade
        } else if fps >= self.recover_at && tier == QualityTier::Low {
            FpsDecision::Recover
        } else {
            FpsDecision::Hold
        }
    }
}

/// Turns cumulative frame counts into per-window rates.
#[derive(Debug)]
pub struct FpsSampler {
    counter: Arc<FrameCounter>,
    last_frames: u64,
    last_at: Instant,
}

impl FpsSampler {
    /// Start a window at `now` from the counter's current total.
    pub fn starting_at(counter: Arc<FrameCounter>, now: Instant) -> Self {
        let last_frames = counter.total();
        Self {
            counter,
            last_frames,
            last_at: now,
        }
    }

    /// Close the current window at `now` and return its frame rate.
    ///
    /// A window with no elapsed time is rejected and the baseline is kept,
    /// so the next sample covers the whole span.
    pub fn sample(&mut self, now: Instant) -> Result<f64, SampleError> {
        let elapsed = now.saturating_duration_since(self.last_at);
        if elapsed.is_zero() {
            return Err(SampleError::EmptyWindow);
        }

        let total = self.counter.total();
        let frames = total.saturating_sub(self.last_frames);
        self.last_frames = total;
        self.last_at = now;

        Ok(frames as f64 / elapsed.as_secs_f64())
    }
}
