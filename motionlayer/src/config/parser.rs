//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::MIN_SAMPLE_INTERVAL_MS;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [monitor] section
    if let Some(section) = ini.section(Some("monitor")) {
        if let Some(v) = section.get("fps_window_ms") {
            config.monitor.fps_window = parse_interval("monitor", "fps_window_ms", v)?;
        }
        if let Some(v) = section.get("fps_downgrade_below") {
            config.monitor.fps_downgrade_below =
                parse_positive("monitor", "fps_downgrade_below", v)?;
        }
        if let Some(v) = section.get("fps_recover_at") {
            config.monitor.fps_recover_at = parse_positive("monitor", "fps_recover_at", v)?;
        }
        if let Some(v) = section.get("memory_interval_ms") {
            config.monitor.memory_interval = parse_interval("monitor", "memory_interval_ms", v)?;
        }
        if let Some(v) = section.get("memory_threshold") {
            config.monitor.memory_threshold = parse_ratio("monitor", "memory_threshold", v)?;
        }
    }

    if config.monitor.fps_downgrade_below >= config.monitor.fps_recover_at {
        return Err(ConfigFileError::InvalidValue {
            section: "monitor".to_string(),
            key: "fps_downgrade_below".to_string(),
            value: config.monitor.fps_downgrade_below.to_string(),
            reason: format!(
                "must be lower than fps_recover_at ({})",
                config.monitor.fps_recover_at
            ),
        });
    }

    // [battery] section
    if let Some(section) = ini.section(Some("battery")) {
        if let Some(v) = section.get("low_level") {
            config.battery.low_level = parse_ratio("battery", "low_level", v)?;
        }
        if let Some(v) = section.get("recover_level") {
            config.battery.recover_level = parse_ratio("battery", "recover_level", v)?;
        }
        if let Some(v) = section.get("poll_interval_ms") {
            config.battery.poll_interval = parse_interval("battery", "poll_interval_ms", v)?;
        }
    }

    if config.battery.low_level >= config.battery.recover_level {
        return Err(ConfigFileError::InvalidValue {
            section: "battery".to_string(),
            key: "low_level".to_string(),
            value: config.battery.low_level.to_string(),
            reason: format!(
                "must be lower than recover_level ({})",
                config.battery.recover_level
            ),
        });
    }

    // [motion] section
    if let Some(section) = ini.section(Some("motion")) {
        if let Some(v) = section.get("low_factor") {
            config.motion.low_factor = parse_positive("motion", "low_factor", v)?;
        }
        if let Some(v) = section.get("medium_factor") {
            config.motion.medium_factor = parse_positive("motion", "medium_factor", v)?;
        }
        if let Some(v) = section.get("high_factor") {
            config.motion.high_factor = parse_positive("motion", "high_factor", v)?;
        }
        if let Some(v) = section.get("reduced_motion_factor") {
            config.motion.reduced_motion_factor =
                parse_positive("motion", "reduced_motion_factor", v)?;
        }
        if let Some(v) = section.get("reduced_motion_time_scale") {
            let scale = parse_positive("motion", "reduced_motion_time_scale", v)?;
            if scale > 1.0 {
                return Err(ConfigFileError::InvalidValue {
                    section: "motion".to_string(),
                    key: "reduced_motion_time_scale".to_string(),
                    value: v.to_string(),
                    reason: "must not exceed 1.0 (it slows the time base)".to_string(),
                });
            }
            config.motion.reduced_motion_time_scale = scale;
        }
        if let Some(v) = section.get("easing_low") {
            config.motion.easing_low = parse_easing("easing_low", v)?;
        }
        if let Some(v) = section.get("easing_medium") {
            config.motion.easing_medium = parse_easing("easing_medium", v)?;
        }
        if let Some(v) = section.get("easing_high") {
            config.motion.easing_high = parse_easing("easing_high", v)?;
        }
    }

    // [device] section - empty values mean "not overridden"
    if let Some(section) = ini.section(Some("device")) {
        if let Some(v) = non_empty(section.get("network")) {
            config.device.network = Some(v.parse().map_err(|_| ConfigFileError::InvalidValue {
                section: "device".to_string(),
                key: "network".to_string(),
                value: v.to_string(),
                reason: "must be one of: 2g, 3g, 4g, unknown".to_string(),
            })?);
        }
        if let Some(v) = non_empty(section.get("pixel_ratio")) {
            config.device.pixel_ratio = Some(parse_positive("device", "pixel_ratio", v)?);
        }
        if let Some(v) = non_empty(section.get("viewport_width")) {
            config.device.viewport_width =
                Some(v.parse().map_err(|_| ConfigFileError::InvalidValue {
                    section: "device".to_string(),
                    key: "viewport_width".to_string(),
                    value: v.to_string(),
                    reason: "must be a positive integer (CSS pixels)".to_string(),
                })?);
        }
        if let Some(v) = non_empty(section.get("touch")) {
            config.device.touch = Some(parse_bool(v));
        }
        if let Some(v) = non_empty(section.get("reduced_motion")) {
            config.device.reduced_motion = Some(parse_bool(v));
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be a number".to_string(),
        })
}

fn parse_positive(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let n = parse_number(section, key, value)?;
    if n <= 0.0 {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(n)
}

fn parse_ratio(section: &str, key: &str, value: &str) -> Result<f64, ConfigFileError> {
    let n = parse_number(section, key, value)?;
    if !(0.0..=1.0).contains(&n) {
        return Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        });
    }
    Ok(n)
}

fn parse_interval(section: &str, key: &str, value: &str) -> Result<Duration, ConfigFileError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms >= MIN_SAMPLE_INTERVAL_MS => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: format!(
                "must be an integer number of milliseconds, at least {}",
                MIN_SAMPLE_INTERVAL_MS
            ),
        }),
    }
}

fn parse_easing(key: &str, value: &str) -> Result<String, ConfigFileError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(ConfigFileError::InvalidValue {
            section: "motion".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: "easing identifier must not be empty".to_string(),
        });
    }
    Ok(v.to_string())
}

/// Parse a boolean value from a config string.
/// Accepts: true/false, yes/no, 1/0, on/off (case-insensitive)
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
