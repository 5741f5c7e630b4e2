//! Native host telemetry.
//!
//! Reads CPU, memory and battery information from the running system with
//! fallbacks for unsupported platforms. Display and network signals have no
//! portable native source, so they come from the `[device]` config overrides.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::DeviceSettings;

use super::telemetry::{PlatformTelemetry, TelemetryError};
use super::{BatteryReading, NetworkClass};

/// Default location of the Linux memory statistics file.
const DEFAULT_MEMINFO_PATH: &str = "/proc/meminfo";

/// Default location of the Linux power supply class directory.
const DEFAULT_POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

const KIB_PER_GIB: f64 = 1024.0 * 1024.0;

/// Telemetry backed by the running host.
///
/// # Platform Support
///
/// - **Linux**: memory and heap pressure from `/proc/meminfo`, battery from
///   `/sys/class/power_supply/BAT*`
/// - **Other platforms**: cores only; everything else unavailable
#[derive(Debug, Clone)]
pub struct HostTelemetry {
    meminfo_path: PathBuf,
    power_supply_dir: PathBuf,
    overrides: DeviceSettings,
}

impl Default for HostTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTelemetry {
    /// Host telemetry with the standard system paths and no overrides.
    pub fn new() -> Self {
        Self {
            meminfo_path: PathBuf::from(DEFAULT_MEMINFO_PATH),
            power_supply_dir: PathBuf::from(DEFAULT_POWER_SUPPLY_DIR),
            overrides: DeviceSettings::default(),
        }
    }

    /// Apply the `[device]` config overrides.
    pub fn with_overrides(mut self, overrides: DeviceSettings) -> Self {
        self.overrides = overrides;
        self
    }

    /// Read memory statistics from a different file.
    pub fn with_meminfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo_path = path.into();
        self
    }

    /// Read batteries from a different power supply directory.
    pub fn with_power_supply_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.power_supply_dir = dir.into();
        self
    }

    fn read_meminfo(&self) -> Result<MemInfo, TelemetryError> {
        let content =
            fs::read_to_string(&self.meminfo_path).map_err(|source| TelemetryError::Read {
                signal: "meminfo",
                source,
            })?;
        parse_meminfo(&content).ok_or_else(|| TelemetryError::Malformed {
            signal: "meminfo",
            detail: "missing MemTotal or MemAvailable".to_string(),
        })
    }

    fn read_battery(&self) -> Result<Option<BatteryReading>, TelemetryError> {
        let entries = match fs::read_dir(&self.power_supply_dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(None),
        };

        let mut batteries: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("BAT"))
            })
            .collect();
        batteries.sort();

        match batteries.first() {
            Some(dir) => read_battery_dir(dir).map(Some),
            None => Ok(None),
        }
    }
}

impl PlatformTelemetry for HostTelemetry {
    fn device_memory_gib(&self) -> Option<f64> {
        detect_memory_gib(&self.meminfo_path)
    }

    fn logical_cores(&self) -> Option<usize> {
        detect_logical_cores()
    }

    fn network_class(&self) -> Option<NetworkClass> {
        self.overrides.network
    }

    fn pixel_ratio(&self) -> Option<f64> {
        self.overrides.pixel_ratio
    }

    fn viewport_width(&self) -> Option<u32> {
        self.overrides.viewport_width
    }

    fn touch_capable(&self) -> Option<bool> {
        self.overrides.touch
    }

    fn battery(&self) -> Option<BatteryReading> {
        match self.read_battery() {
            Ok(reading) => reading,
            Err(e) => {
                tracing::debug!(error = %e, "Battery telemetry unavailable");
                None
            }
        }
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.overrides.reduced_motion
    }

    fn supports_heap_sampling(&self) -> bool {
        self.read_meminfo().is_ok()
    }

    fn heap_utilization(&self) -> Result<f64, TelemetryError> {
        let info = self.read_meminfo()?;
        Ok(info.utilization())
    }
}

/// Memory totals parsed from `/proc/meminfo`, in KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MemInfo {
    pub total_kib: u64,
    pub available_kib: u64,
}

impl MemInfo {
    /// Fraction of memory in use.
    pub fn utilization(&self) -> f64 {
        if self.total_kib == 0 {
            return 0.0;
        }
        let used = self.total_kib.saturating_sub(self.available_kib);
        used as f64 / self.total_kib as f64
    }
}

/// Parse the `MemTotal` and `MemAvailable` lines of a meminfo file.
///
/// Format: `MemTotal:       16384000 kB`
pub(crate) fn parse_meminfo(content: &str) -> Option<MemInfo> {
    let mut total = None;
    let mut available = None;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("MemTotal:") => total = parts.next().and_then(|v| v.parse::<u64>().ok()),
            Some("MemAvailable:") => {
                available = parts.next().and_then(|v| v.parse::<u64>().ok())
            }
            _ => {}
        }
    }

    Some(MemInfo {
        total_kib: total?,
        available_kib: available?,
    })
}

/// Read `capacity` and `status` from one battery directory.
fn read_battery_dir(dir: &Path) -> Result<BatteryReading, TelemetryError> {
    let capacity = fs::read_to_string(dir.join("capacity")).map_err(|source| {
        TelemetryError::Read {
            signal: "battery capacity",
            source,
        }
    })?;
    let status = fs::read_to_string(dir.join("status")).unwrap_or_default();
    parse_battery(&capacity, &status)
}

/// Interpret sysfs battery `capacity` (percent) and `status` strings.
pub(crate) fn parse_battery(capacity: &str, status: &str) -> Result<BatteryReading, TelemetryError> {
    let percent: f64 = capacity
        .trim()
        .parse()
        .map_err(|_| TelemetryError::Malformed {
            signal: "battery",
            detail: format!("capacity '{}'", capacity.trim()),
        })?;
    let charging = matches!(status.trim(), "Charging" | "Full" | "Not charging");
    Ok(BatteryReading::new(percent / 100.0, charging))
}

/// Detect the number of logical CPU cores.
pub fn detect_logical_cores() -> Option<usize> {
    std::thread::available_parallelism().map(|p| p.get()).ok()
}

/// Detect total memory in GiB from a meminfo file.
///
/// Returns `None` on non-Linux platforms or when the file is unreadable.
#[cfg(target_os = "linux")]
pub fn detect_memory_gib(meminfo_path: &Path) -> Option<f64> {
    let content = fs::read_to_string(meminfo_path).ok()?;
    content
        .lines()
        .find(|line| line.starts_with("MemTotal:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|kib| kib.parse::<u64>().ok())
        .map(|kib| kib as f64 / KIB_PER_GIB)
}

#[cfg(not(target_os = "linux"))]
pub fn detect_memory_gib(_meminfo_path: &Path) -> Option<f64> {
    None
}
