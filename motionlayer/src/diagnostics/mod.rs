//! Read-only controller snapshot for debugging surfaces.
//!
//! # Example
//!
//! ```
//! use motionlayer::config::ConfigFile;
//! use motionlayer::profile::DeviceProfile;
//! use motionlayer::MotionController;
//!
//! let controller = MotionController::from_profile(DeviceProfile::default(), &ConfigFile::default());
//! let report = controller.diagnostics();
//! println!("{}", report);
//! ```

use std::fmt;

use serde::Serialize;

use crate::classify::ScoreBreakdown;
use crate::profile::DeviceProfile;
use crate::tier::{QualityTier, TierReason};

/// Point-in-time controller report.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    /// Library version
    pub version: &'static str,
    /// Stored tier before overrides
    pub tier: QualityTier,
    /// Tier call-sites act on
    pub effective_tier: QualityTier,
    pub reduced_motion: bool,
    pub battery_constrained: bool,
    pub memory_latched: bool,
    pub last_reason: TierReason,
    pub transitions: u64,
    pub monitor_running: bool,
    pub last_fps: Option<f64>,
    pub last_heap_utilization: Option<f64>,
    pub skipped_samples: u64,
    pub time_scale: f64,
    pub easing_curve: String,
    pub is_handheld: bool,
    pub score: ScoreBreakdown,
    pub profile: DeviceProfile,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MotionLayer Diagnostics")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "MotionLayer Version: {}", self.version)?;
        writeln!(f)?;

        writeln!(f, "## Tier")?;
        writeln!(f, "Effective: {}", self.effective_tier)?;
        writeln!(f, "Stored: {} ({})", self.tier, self.last_reason)?;
        writeln!(f, "Transitions: {}", self.transitions)?;
        writeln!(f, "Reduced motion: {}", yes_no(self.reduced_motion))?;
        writeln!(f, "Battery constrained: {}", yes_no(self.battery_constrained))?;
        writeln!(f, "Memory latch: {}", yes_no(self.memory_latched))?;
        writeln!(f, "Time scale: {}x", self.time_scale)?;
        writeln!(f, "Easing: {}", self.easing_curve)?;
        writeln!(f)?;

        writeln!(f, "## Monitor")?;
        writeln!(
            f,
            "State: {}",
            if self.monitor_running { "running" } else { "idle" }
        )?;
        match self.last_fps {
            Some(fps) => writeln!(f, "Last FPS: {:.1}", fps)?,
            None => writeln!(f, "Last FPS: n/a")?,
        }
        match self.last_heap_utilization {
            Some(heap) => writeln!(f, "Last heap utilization: {:.1}%", heap * 100.0)?,
            None => writeln!(f, "Last heap utilization: n/a")?,
        }
        if self.skipped_samples > 0 {
            writeln!(f, "Skipped samples: {}", self.skipped_samples)?;
        }
        writeln!(f)?;

        writeln!(f, "## Device")?;
        writeln!(f, "Memory: {:.1} GiB", self.profile.memory_gib)?;
        writeln!(f, "Logical cores: {}", self.profile.logical_cores)?;
        writeln!(f, "Network: {}", self.profile.network)?;
        writeln!(f, "Pixel ratio: {}", self.profile.pixel_ratio)?;
        writeln!(f, "Handheld: {}", yes_no(self.is_handheld))?;
        match self.profile.battery {
            Some(battery) => writeln!(
                f,
                "Battery: {:.0}%{}",
                battery.level * 100.0,
                if battery.charging { " (charging)" } else { "" }
            )?,
            None => writeln!(f, "Battery: not reported")?,
        }
        writeln!(f, "Score: {} -> {}", self.score, self.score.tier())?;

        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
