//! Device capability probing.
//!
//! This module inspects the host once, best-effort, and produces an
//! immutable [`DeviceProfile`]. Every signal is optional at the
//! [`PlatformTelemetry`] boundary and every absence has exactly one
//! documented default, so "unavailable" is never an unhandled case:
//!
//! | Signal          | Default      |
//! |-----------------|--------------|
//! | Memory          | 4 GiB        |
//! | Logical cores   | 4            |
//! | Network         | `Unknown`    |
//! | Pixel ratio     | 1.0          |
//! | Handheld        | `false`      |
//! | Battery         | not reported |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use motionlayer::profile::{CapabilityProber, NetworkClass, StaticTelemetry};
//!
//! let telemetry = StaticTelemetry::new()
//!     .with_memory_gib(8.0)
//!     .with_logical_cores(8)
//!     .with_network(NetworkClass::Cellular4g);
//! let profile = CapabilityProber::new(Arc::new(telemetry)).probe();
//!
//! assert_eq!(profile.logical_cores, 8);
//! assert!(!profile.is_handheld);
//! ```

mod host;
mod prober;
mod telemetry;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use host::{detect_logical_cores, detect_memory_gib, HostTelemetry};
pub use prober::{is_handheld, CapabilityProber, HANDHELD_MAX_VIEWPORT_WIDTH};
pub use telemetry::{PlatformTelemetry, StaticTelemetry, TelemetryError};

/// Memory estimate used when the platform does not report one.
pub const DEFAULT_MEMORY_GIB: f64 = 4.0;

/// Core count used when the platform does not report one.
pub const DEFAULT_LOGICAL_CORES: usize = 4;

/// Pixel ratio used when the platform does not report one.
pub const DEFAULT_PIXEL_RATIO: f64 = 1.0;

/// Coarse effective network class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NetworkClass {
    /// Not reported by the platform.
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
    /// 2G-class connection.
    #[serde(rename = "2g")]
    Cellular2g,
    /// 3G-class connection.
    #[serde(rename = "3g")]
    Cellular3g,
    /// 4G-class or better connection.
    #[serde(rename = "4g")]
    Cellular4g,
}

impl NetworkClass {
    /// Short name (`unknown`, `2g`, `3g`, `4g`).
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkClass::Unknown => "unknown",
            NetworkClass::Cellular2g => "2g",
            NetworkClass::Cellular3g => "3g",
            NetworkClass::Cellular4g => "4g",
        }
    }
}

impl fmt::Display for NetworkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" | "" => Ok(NetworkClass::Unknown),
            "2g" | "slow-2g" => Ok(NetworkClass::Cellular2g),
            "3g" => Ok(NetworkClass::Cellular3g),
            "4g" => Ok(NetworkClass::Cellular4g),
            other => Err(format!("unknown network class '{}'", other)),
        }
    }
}

/// A battery telemetry reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryReading {
    /// Charge level, 0.0 (empty) to 1.0 (full).
    pub level: f64,
    /// Whether external power is connected.
    pub charging: bool,
}

impl BatteryReading {
    /// Create a reading, clamping the level into `0.0..=1.0`.
    pub fn new(level: f64, charging: bool) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            charging,
        }
    }
}

/// Coarse capability profile of the device, captured once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceProfile {
    /// Device memory estimate in GiB.
    pub memory_gib: f64,
    /// Number of logical CPU cores.
    pub logical_cores: usize,
    /// Effective network class.
    pub network: NetworkClass,
    /// Display pixel density ratio.
    pub pixel_ratio: f64,
    /// Handheld heuristic (touch capable and narrow viewport).
    pub is_handheld: bool,
    /// Battery state, if reported at probe time.
    pub battery: Option<BatteryReading>,
}

impl Default for DeviceProfile {
    /// The profile of a device that reports nothing.
    fn default() -> Self {
        Self {
            memory_gib: DEFAULT_MEMORY_GIB,
            logical_cores: DEFAULT_LOGICAL_CORES,
            network: NetworkClass::Unknown,
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            is_handheld: false,
            battery: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_uses_documented_defaults() {
        let profile = DeviceProfile::default();
        assert_eq!(profile.memory_gib, 4.0);
        assert_eq!(profile.logical_cores, 4);
        assert_eq!(profile.network, NetworkClass::Unknown);
        assert_eq!(profile.pixel_ratio, 1.0);
        assert!(!profile.is_handheld);
        assert!(profile.battery.is_none());
    }

    #[test]
    fn test_network_class_parse() {
        assert_eq!("4G".parse::<NetworkClass>(), Ok(NetworkClass::Cellular4g));
        assert_eq!("slow-2g".parse::<NetworkClass>(), Ok(NetworkClass::Cellular2g));
        assert_eq!("".parse::<NetworkClass>(), Ok(NetworkClass::Unknown));
        assert!("5g".parse::<NetworkClass>().is_err());
    }

    #[test]
    fn test_battery_reading_clamps_level() {
        assert_eq!(BatteryReading::new(1.7, true).level, 1.0);
        assert_eq!(BatteryReading::new(-0.2, false).level, 0.0);
    }
}
