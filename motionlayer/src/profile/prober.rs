//! One-shot capability probe.

use std::sync::Arc;

use tracing::{debug, info};

use super::telemetry::PlatformTelemetry;
use super::{
    BatteryReading, DeviceProfile, NetworkClass, DEFAULT_LOGICAL_CORES, DEFAULT_MEMORY_GIB,
    DEFAULT_PIXEL_RATIO,
};

/// Viewports narrower than this (in logical px) count towards "handheld".
pub const HANDHELD_MAX_VIEWPORT_WIDTH: u32 = 768;

/// Builds a [`DeviceProfile`] from platform telemetry.
///
/// [`probe`](Self::probe) is synchronous and never fails. Battery state is
/// deliberately left out of it: [`probe_battery`](Self::probe_battery)
/// fetches it on a blocking task so classification never waits on it.
#[derive(Clone)]
pub struct CapabilityProber {
    telemetry: Arc<dyn PlatformTelemetry>,
}

impl std::fmt::Debug for CapabilityProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityProber").finish_non_exhaustive()
    }
}

impl CapabilityProber {
    /// Create a prober over the given telemetry source.
    pub fn new(telemetry: Arc<dyn PlatformTelemetry>) -> Self {
        Self { telemetry }
    }

    /// The telemetry source this prober reads.
    pub fn telemetry(&self) -> &Arc<dyn PlatformTelemetry> {
        &self.telemetry
    }

    /// Capture the immediately available signals.
    ///
    /// Unavailable or nonsensical values (zero cores, non-positive memory or
    /// pixel ratio) are replaced by the documented defaults.
    pub fn probe(&self) -> DeviceProfile {
        let t = &self.telemetry;

        let memory_gib = t
            .device_memory_gib()
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_MEMORY_GIB);
        let logical_cores = t
            .logical_cores()
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_LOGICAL_CORES);
        let network = t.network_class().unwrap_or(NetworkClass::Unknown);
        let pixel_ratio = t
            .pixel_ratio()
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(DEFAULT_PIXEL_RATIO);
        let is_handheld = is_handheld(t.viewport_width(), t.touch_capable());

        let profile = DeviceProfile {
            memory_gib,
            logical_cores,
            network,
            pixel_ratio,
            is_handheld,
            battery: None,
        };

        info!(
            memory_gib = format!("{:.1}", profile.memory_gib),
            cores = profile.logical_cores,
            network = %profile.network,
            pixel_ratio = profile.pixel_ratio,
            handheld = profile.is_handheld,
            "Device profile captured"
        );

        profile
    }

    /// Fetch battery state without blocking the caller's task.
    ///
    /// Returns `None` when the platform has no battery telemetry or the
    /// lookup task fails.
    pub async fn probe_battery(&self) -> Option<BatteryReading> {
        let telemetry = Arc::clone(&self.telemetry);
        match tokio::task::spawn_blocking(move || telemetry.battery()).await {
            Ok(reading) => {
                debug!(?reading, "Battery lookup finished");
                reading
            }
            Err(e) => {
                debug!(error = %e, "Battery lookup task failed");
                None
            }
        }
    }
}

/// Coarse handheld heuristic: touch input on a narrow viewport.
///
/// Either signal missing means "not handheld".
pub fn is_handheld(viewport_width: Option<u32>, touch: Option<bool>) -> bool {
    match (viewport_width, touch) {
        (Some(width), Some(true)) => width < HANDHELD_MAX_VIEWPORT_WIDTH,
        _ => false,
    }
}
