//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let device = &config.device;
    let network = device.network.map(|n| n.as_str()).unwrap_or("");
    let pixel_ratio = device
        .pixel_ratio
        .map(|r| r.to_string())
        .unwrap_or_default();
    let viewport_width = device
        .viewport_width
        .map(|w| w.to_string())
        .unwrap_or_default();
    let touch = device.touch.map(|t| t.to_string()).unwrap_or_default();
    let reduced_motion = device
        .reduced_motion
        .map(|r| r.to_string())
        .unwrap_or_default();

    format!(
        r#"[monitor]
; Length of one frame-rate sampling window in milliseconds (default: 1000)
fps_window_ms = {}
; A window below this many frames per second drops the tier to low (default: 30)
fps_downgrade_below = {}
; A window at or above this rate lifts low back to medium (default: 50)
; Must be higher than fps_downgrade_below; rates in between change nothing
fps_recover_at = {}
; Interval between heap utilization samples in milliseconds (default: 5000)
memory_interval_ms = {}
; Heap utilization (0.0-1.0) above which the tier is forced to low (default: 0.8)
; Once tripped, frame-rate recovery stays blocked until reclassification
memory_threshold = {}

[battery]
; Unplugged battery level (0.0-1.0) below which the tier is forced to low (default: 0.15)
low_level = {}
; Charging battery level above which the constraint clears (default: 0.5)
recover_level = {}
; Interval between battery readings in milliseconds (default: 30000)
poll_interval_ms = {}

[motion]
; Duration and stagger multipliers per tier
low_factor = {}
medium_factor = {}
high_factor = {}
; Extra duration multiplier while reduced motion is requested (default: 0.1)
reduced_motion_factor = {}
; Global time base multiplier while reduced motion is requested, 0 < x <= 1 (default: 0.1)
reduced_motion_time_scale = {}
; Easing curve identifiers handed to the animation engine
easing_low = {}
easing_medium = {}
easing_high = {}

[device]
; Optional overrides for signals the host cannot report. Leave empty to detect.
; Network class: 2g, 3g, 4g, unknown
network = {}
; Device pixel ratio (physical pixels per CSS pixel)
pixel_ratio = {}
; Viewport width in CSS pixels
viewport_width = {}
; Primary input is touch: true/false
touch = {}
; Operating system reduced-motion preference: true/false
reduced_motion = {}

[logging]
; Log file path (default: ~/.motionlayer/logs/motionlayer.log)
file = {}
"#,
        config.monitor.fps_window.as_millis(),
        config.monitor.fps_downgrade_below,
        config.monitor.fps_recover_at,
        config.monitor.memory_interval.as_millis(),
        config.monitor.memory_threshold,
        config.battery.low_level,
        config.battery.recover_level,
        config.battery.poll_interval.as_millis(),
        config.motion.low_factor,
        config.motion.medium_factor,
        config.motion.high_factor,
        config.motion.reduced_motion_factor,
        config.motion.reduced_motion_time_scale,
        config.motion.easing_low,
        config.motion.easing_medium,
        config.motion.easing_high,
        network,
        pixel_ratio,
        viewport_width,
        touch,
        reduced_motion,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
