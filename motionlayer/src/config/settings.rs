//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;
use std::time::Duration;

use crate::profile::NetworkClass;
use crate::tier::QualityTier;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Live performance monitor thresholds and intervals
    pub monitor: MonitorSettings,
    /// Battery constraint bands
    pub battery: BatterySettings,
    /// Per-tier motion parameters
    pub motion: MotionSettings,
    /// Optional device signal overrides
    pub device: DeviceSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Live performance monitor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    /// Length of one FPS sampling window.
    pub fps_window: Duration,
    /// A window below this FPS drops the tier to `Low`.
    pub fps_downgrade_below: f64,
    /// A window at or above this FPS lifts `Low` to `Medium`.
    pub fps_recover_at: f64,
    /// Interval between heap utilization samples.
    pub memory_interval: Duration,
    /// Heap utilization above this ratio trips the safety valve.
    pub memory_threshold: f64,
}

/// Battery constraint configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BatterySettings {
    /// Unplugged level below which the tier is forced to `Low`.
    pub low_level: f64,
    /// Charging level above which the constraint clears.
    pub recover_level: f64,
    /// Interval between battery readings while the controller runs.
    pub poll_interval: Duration,
}

/// Motion parameter configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSettings {
    /// Duration and stagger factor at `Low`.
    pub low_factor: f64,
    /// Duration and stagger factor at `Medium`.
    pub medium_factor: f64,
    /// Duration and stagger factor at `High`.
    pub high_factor: f64,
    /// Extra duration factor while reduced motion is requested.
    pub reduced_motion_factor: f64,
    /// Global time base multiplier while reduced motion is requested.
    pub reduced_motion_time_scale: f64,
    /// Easing curve identifier at `Low`.
    pub easing_low: String,
    /// Easing curve identifier at `Medium`.
    pub easing_medium: String,
    /// Easing curve identifier at `High`.
    pub easing_high: String,
}

impl MotionSettings {
    /// Duration and stagger factor for a tier.
    pub fn factor(&self, tier: QualityTier) -> f64 {
        match tier {
            QualityTier::Low => self.low_factor,
            QualityTier::Medium => self.medium_factor,
            QualityTier::High => self.high_factor,
        }
    }

    /// Easing curve identifier for a tier.
    pub fn easing(&self, tier: QualityTier) -> &str {
        match tier {
            QualityTier::Low => &self.easing_low,
            QualityTier::Medium => &self.easing_medium,
            QualityTier::High => &self.easing_high,
        }
    }
}

/// Device signal overrides.
///
/// Used where the host has no native source for a signal (display metrics,
/// network class) or to pin a value for testing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSettings {
    pub network: Option<NetworkClass>,
    pub pixel_ratio: Option<f64>,
    pub viewport_width: Option<u32>,
    pub touch: Option<bool>,
    pub reduced_motion: Option<bool>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
