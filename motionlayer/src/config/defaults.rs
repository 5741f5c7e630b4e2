//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `Default` implementations of
//! the settings structs.

use std::time::Duration;

use super::file::config_directory;
use super::settings::*;

// =============================================================================
// Monitor
// =============================================================================

/// Default FPS sampling window (1 second).
pub const DEFAULT_FPS_WINDOW_MS: u64 = 1_000;

/// Default FPS below which the tier drops to `Low`.
pub const DEFAULT_FPS_DOWNGRADE_BELOW: f64 = 30.0;

/// Default FPS at which `Low` recovers to `Medium`.
pub const DEFAULT_FPS_RECOVER_AT: f64 = 50.0;

/// Default heap sampling interval (5 seconds).
pub const DEFAULT_MEMORY_INTERVAL_MS: u64 = 5_000;

/// Default heap utilization that trips the safety valve.
pub const DEFAULT_MEMORY_THRESHOLD: f64 = 0.80;

/// Shortest accepted sampling window or interval.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 100;

// =============================================================================
// Battery
// =============================================================================

/// Default unplugged battery level that forces `Low`.
pub const DEFAULT_BATTERY_LOW_LEVEL: f64 = 0.15;

/// Default charging battery level that clears the constraint.
pub const DEFAULT_BATTERY_RECOVER_LEVEL: f64 = 0.50;

/// Default interval between battery readings.
pub const DEFAULT_BATTERY_POLL_INTERVAL_MS: u64 = 30_000;

// =============================================================================
// Motion
// =============================================================================

pub const DEFAULT_LOW_FACTOR: f64 = 0.5;
pub const DEFAULT_MEDIUM_FACTOR: f64 = 0.75;
pub const DEFAULT_HIGH_FACTOR: f64 = 1.0;

/// Extra duration factor under reduced motion, compounded with the tier factor.
pub const DEFAULT_REDUCED_MOTION_FACTOR: f64 = 0.1;

/// Global animation time base under reduced motion (a 10x slowdown).
pub const DEFAULT_REDUCED_MOTION_TIME_SCALE: f64 = 0.1;

pub const DEFAULT_EASING_LOW: &str = "power1.out";
pub const DEFAULT_EASING_MEDIUM: &str = "power2.out";
pub const DEFAULT_EASING_HIGH: &str = "expo.out";

// =============================================================================
// Logging
// =============================================================================

/// Default log file name.
pub const DEFAULT_LOG_FILE_NAME: &str = "motionlayer.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            monitor: MonitorSettings::default(),
            battery: BatterySettings::default(),
            motion: MotionSettings::default(),
            device: DeviceSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            fps_window: Duration::from_millis(DEFAULT_FPS_WINDOW_MS),
            fps_downgrade_below: DEFAULT_FPS_DOWNGRADE_BELOW,
            fps_recover_at: DEFAULT_FPS_RECOVER_AT,
            memory_interval: Duration::from_millis(DEFAULT_MEMORY_INTERVAL_MS),
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
        }
    }
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self {
            low_level: DEFAULT_BATTERY_LOW_LEVEL,
            recover_level: DEFAULT_BATTERY_RECOVER_LEVEL,
            poll_interval: Duration::from_millis(DEFAULT_BATTERY_POLL_INTERVAL_MS),
        }
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            low_factor: DEFAULT_LOW_FACTOR,
            medium_factor: DEFAULT_MEDIUM_FACTOR,
            high_factor: DEFAULT_HIGH_FACTOR,
            reduced_motion_factor: DEFAULT_REDUCED_MOTION_FACTOR,
            reduced_motion_time_scale: DEFAULT_REDUCED_MOTION_TIME_SCALE,
            easing_low: DEFAULT_EASING_LOW.to_string(),
            easing_medium: DEFAULT_EASING_MEDIUM.to_string(),
            easing_high: DEFAULT_EASING_HIGH.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join("logs").join(DEFAULT_LOG_FILE_NAME),
        }
    }
}
