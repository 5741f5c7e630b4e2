//! Platform telemetry boundary.
//!
//! [`PlatformTelemetry`] is the only way the controller reads the host.
//! Every method is optional: returning `None` means "unavailable" and the
//! caller substitutes a documented default.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

use super::{BatteryReading, NetworkClass};

/// Errors from a live telemetry sample.
///
/// These never reach animation call-sites. A sampling loop that receives
/// one logs it and skips that tick.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The platform does not expose this signal.
    #[error("{0} telemetry is not available on this platform")]
    Unsupported(&'static str),

    /// Reading the signal failed.
    #[error("failed to read {signal}: {source}")]
    Read {
        signal: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The signal was read but could not be interpreted.
    #[error("malformed {signal} reading: {detail}")]
    Malformed { signal: &'static str, detail: String },
}

/// Read-only, best-effort access to host capabilities.
///
/// Implementations must be cheap to call and `Send + Sync`; the sampling
/// loops call [`heap_utilization`](Self::heap_utilization) from a tokio task.
pub trait PlatformTelemetry: Send + Sync {
    /// Device memory estimate in GiB.
    fn device_memory_gib(&self) -> Option<f64>;

    /// Number of logical CPU cores.
    fn logical_cores(&self) -> Option<usize>;

    /// Effective network class.
    fn network_class(&self) -> Option<NetworkClass> {
        None
    }

    /// Display pixel density ratio.
    fn pixel_ratio(&self) -> Option<f64> {
        None
    }

    /// Viewport width in logical pixels.
    fn viewport_width(&self) -> Option<u32> {
        None
    }

    /// Whether the primary input is touch.
    fn touch_capable(&self) -> Option<bool> {
        None
    }

    /// Current battery reading.
    ///
    /// May block on I/O; the prober calls it from a blocking task.
    fn battery(&self) -> Option<BatteryReading> {
        None
    }

    /// Current reduced-motion preference, if the platform exposes one.
    fn prefers_reduced_motion(&self) -> Option<bool> {
        None
    }

    /// Whether [`heap_utilization`](Self::heap_utilization) can ever succeed.
    ///
    /// When `false` the memory safety valve is not started at all.
    fn supports_heap_sampling(&self) -> bool {
        false
    }

    /// Heap utilization ratio, 0.0 to 1.0.
    fn heap_utilization(&self) -> Result<f64, TelemetryError> {
        Err(TelemetryError::Unsupported("heap utilization"))
    }
}

/// Telemetry with fixed, caller-supplied values.
///
/// Used by tests and by the CLI to evaluate hypothetical devices. The heap
/// and battery readings can be changed after construction to drive the
/// memory valve and the battery constraint.
///
/// # Example
///
/// ```
/// use motionlayer::profile::{PlatformTelemetry, StaticTelemetry};
///
/// let telemetry = StaticTelemetry::new().with_heap_utilization(0.4);
/// assert!(telemetry.supports_heap_sampling());
/// telemetry.set_heap_utilization(0.95);
/// assert_eq!(telemetry.heap_utilization().unwrap(), 0.95);
/// ```
#[derive(Debug, Default)]
pub struct StaticTelemetry {
    memory_gib: Option<f64>,
    logical_cores: Option<usize>,
    network: Option<NetworkClass>,
    pixel_ratio: Option<f64>,
    viewport_width: Option<u32>,
    touch: Option<bool>,
    battery: Mutex<Option<BatteryReading>>,
    reduced_motion: Option<bool>,
    heap: Option<Mutex<f64>>,
    fail_next_heap_sample: AtomicBool,
}

impl StaticTelemetry {
    /// Telemetry that reports nothing at all.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_gib(mut self, gib: f64) -> Self {
        self.memory_gib = Some(gib);
        self
    }

    pub fn with_logical_cores(mut self, cores: usize) -> Self {
        self.logical_cores = Some(cores);
        self
    }

    pub fn with_network(mut self, network: NetworkClass) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = Some(ratio);
        self
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = Some(width);
        self
    }

    pub fn with_touch(mut self, touch: bool) -> Self {
        self.touch = Some(touch);
        self
    }

    pub fn with_battery(self, reading: BatteryReading) -> Self {
        self.set_battery(Some(reading));
        self
    }

    /// Change the battery reading; `None` means no battery telemetry.
    pub fn set_battery(&self, reading: Option<BatteryReading>) {
        *self.battery.lock() = reading;
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = Some(reduced);
        self
    }

    /// Enable heap sampling with an initial utilization.
    pub fn with_heap_utilization(mut self, ratio: f64) -> Self {
        self.heap = Some(Mutex::new(ratio));
        self
    }

    /// Change the heap reading. No effect unless heap sampling is enabled.
    pub fn set_heap_utilization(&self, ratio: f64) {
        if let Some(heap) = &self.heap {
            *heap.lock() = ratio;
        }
    }

    /// Make the next heap sample fail with a read error.
    pub fn fail_next_heap_sample(&self) {
        self.fail_next_heap_sample.store(true, Ordering::SeqCst);
    }
}

impl PlatformTelemetry for StaticTelemetry {
    fn device_memory_gib(&self) -> Option<f64> {
        self.memory_gib
    }

    fn logical_cores(&self) -> Option<usize> {
        self.logical_cores
    }

    fn network_class(&self) -> Option<NetworkClass> {
        self.network
    }

    fn pixel_ratio(&self) -> Option<f64> {
        self.pixel_ratio
    }

    fn viewport_width(&self) -> Option<u32> {
        self.viewport_width
    }

    fn touch_capable(&self) -> Option<bool> {
        self.touch
    }

    fn battery(&self) -> Option<BatteryReading> {
        *self.battery.lock()
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.reduced_motion
    }

    fn supports_heap_sampling(&self) -> bool {
        self.heap.is_some()
    }

    fn heap_utilization(&self) -> Result<f64, TelemetryError> {
        let heap = self
            .heap
            .as_ref()
            .ok_or(TelemetryError::Unsupported("heap utilization"))?;

        if self.fail_next_heap_sample.swap(false, Ordering::SeqCst) {
            return Err(TelemetryError::Read {
                signal: "heap utilization",
                source: std::io::Error::other("simulated sample failure"),
            });
        }

        Ok(*heap.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_static_telemetry_reports_nothing() {
        let telemetry = StaticTelemetry::new();
        assert!(telemetry.device_memory_gib().is_none());
        assert!(telemetry.logical_cores().is_none());
        assert!(telemetry.network_class().is_none());
        assert!(telemetry.battery().is_none());
        assert!(!telemetry.supports_heap_sampling());
        assert!(matches!(
            telemetry.heap_utilization(),
            Err(TelemetryError::Unsupported(_))
        ));
    }

    #[test]
    fn test_heap_failure_is_one_shot() {
        let telemetry = StaticTelemetry::new().with_heap_utilization(0.5);
        telemetry.fail_next_heap_sample();

        assert!(telemetry.heap_utilization().is_err());
        assert_eq!(telemetry.heap_utilization().unwrap(), 0.5);
    }

    #[test]
    fn test_set_heap_without_sampling_is_ignored() {
        let telemetry = StaticTelemetry::new();
        telemetry.set_heap_utilization(0.9);
        assert!(!telemetry.supports_heap_sampling());
    }

    #[test]
    fn test_telemetry_error_messages() {
        let err = TelemetryError::Malformed {
            signal: "battery",
            detail: "capacity 'abc'".to_string(),
        };
        assert_eq!(err.to_string(), "malformed battery reading: capacity 'abc'");
        assert_eq!(
            TelemetryError::Unsupported("heap utilization").to_string(),
            "heap utilization telemetry is not available on this platform"
        );
    }
}
