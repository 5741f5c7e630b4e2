//! Live performance monitor.
//!
//! Two background loops feed the [`TierState`]:
//!
//! - the FPS loop closes a window every `fps_window` (default 1 s) and applies
//!   the [`FpsPolicy`] hysteresis,
//! - the memory loop samples heap utilization every `memory_interval`
//!   (default 5 s) and applies the [`MemoryValve`]. It only runs when the
//!   telemetry can sample the heap.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start()--> Running --stop()--> Idle
//! ```
//!
//! Both transitions are idempotent. `stop()` cancels the loops, aborts their
//! tasks and disarms the [`FrameCounter`] so frames reported afterwards are
//! dropped. A sample that fails is logged and skipped; the loop carries on
//! with its next tick.

mod fps;
mod frame_counter;
mod memory;

pub use fps::{FpsDecision, FpsPolicy, FpsSampler};
pub use frame_counter::FrameCounter;
pub use memory::MemoryValve;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorSettings;
use crate::profile::{PlatformTelemetry, TelemetryError};
use crate::state::{TierState, TierTransition};

/// Errors starting the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// `start()` was called outside a tokio runtime.
    #[error("performance monitor needs a tokio runtime to start")]
    NoRuntime,
}

/// Why a single sample was skipped.
#[derive(Debug, Error)]
pub enum SampleError {
    /// No time passed since the previous sample.
    #[error("sampling window is empty")]
    EmptyWindow,

    /// The platform failed to report a reading.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Most recent observations, kept for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonitorReadings {
    pub last_fps: Option<f64>,
    pub last_heap_utilization: Option<f64>,
    pub fps_samples: u64,
    pub heap_samples: u64,
    pub skipped_samples: u64,
}

struct Running {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

/// Shared pieces the loops need.
struct Shared {
    state: Arc<TierState>,
    telemetry: Arc<dyn PlatformTelemetry>,
    counter: Arc<FrameCounter>,
    readings: Mutex<MonitorReadings>,
    active_loops: AtomicUsize,
    fps_policy: FpsPolicy,
    valve: MemoryValve,
}

impl Shared {
    fn observe_fps(&self, fps: f64) -> Option<TierTransition> {
        {
            let mut readings = self.readings.lock();
            readings.last_fps = Some(fps);
            readings.fps_samples += 1;
        }

        let tier = self.state.stored_tier();
        let transition = match self.fps_policy.decide(fps, tier) {
            FpsDecision::Downgrade => self.state.apply_fps_downgrade(),
            FpsDecision::Recover => {
                let t = self.state.apply_fps_recovery();
                if t.is_none() {
                    debug!(fps = format!("{:.1}", fps), "FPS recovery held by override");
                }
                t
            }
            FpsDecision::Hold => None,
        };

        match transition {
            Some(t) => info!(
                fps = format!("{:.1}", fps),
                from = %t.from,
                to = %t.to,
                "Tier changed by frame rate"
            ),
            None => debug!(fps = format!("{:.1}", fps), tier = %tier, "FPS sample"),
        }
        transition
    }

    fn observe_heap(&self, utilization: f64) -> Option<TierTransition> {
        {
            let mut readings = self.readings.lock();
            readings.last_heap_utilization = Some(utilization);
            readings.heap_samples += 1;
        }

        let transition = self.valve.apply(utilization, &self.state);
        match transition {
            Some(t) => info!(
                utilization = format!("{:.1}%", utilization * 100.0),
                threshold = format!("{:.1}%", self.valve.threshold * 100.0),
                from = %t.from,
                "Memory safety valve tripped, tier forced to low"
            ),
            None if self.valve.trips(utilization) => warn!(
                utilization = format!("{:.1}%", utilization * 100.0),
                "Heap under pressure, tier already low"
            ),
            None => debug!(
                utilization = format!("{:.1}%", utilization * 100.0),
                "Heap sample"
            ),
        }
        transition
    }

    fn skip(&self, signal: &'static str, error: &SampleError) {
        self.readings.lock().skipped_samples += 1;
        warn!(signal, error = %error, "Skipping failed sample");
    }
}

/// Decrements the active loop count when a loop task ends or is aborted.
struct LoopGuard(Arc<Shared>);

impl LoopGuard {
    fn new(shared: &Arc<Shared>) -> Self {
        shared.active_loops.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(shared))
    }
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.0.active_loops.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Recurring FPS and heap sampler that proposes tier transitions.
pub struct PerformanceMonitor {
    shared: Arc<Shared>,
    fps_window: Duration,
    memory_interval: Duration,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("fps_window", &self.fps_window)
            .field("memory_interval", &self.memory_interval)
            .field("running", &self.is_running())
            .field("readings", &self.readings())
            .finish_non_exhaustive()
    }
}

impl PerformanceMonitor {
    pub fn new(
        state: Arc<TierState>,
        telemetry: Arc<dyn PlatformTelemetry>,
        settings: &MonitorSettings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state,
                telemetry,
                counter: Arc::new(FrameCounter::new()),
                readings: Mutex::new(MonitorReadings::default()),
                active_loops: AtomicUsize::new(0),
                fps_policy: FpsPolicy::from_settings(settings),
                valve: MemoryValve::from_settings(settings),
            }),
            fps_window: settings.fps_window,
            memory_interval: settings.memory_interval,
            running: Mutex::new(None),
        }
    }

    /// The frame callback sink the host reports frames to.
    pub fn frame_counter(&self) -> Arc<FrameCounter> {
        Arc::clone(&self.shared.counter)
    }

    /// Start sampling. A second call while running is a no-op.
    pub fn start(&self) -> Result<(), MonitorError> {
        let mut running = self.running.lock();
        if running.is_some() {
            debug!("Performance monitor already running");
            return Ok(());
        }

        let handle = tokio::runtime::Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;
        let shutdown = CancellationToken::new();
        let mut handles = Vec::with_capacity(2);

        self.shared.counter.arm();
        handles.push(handle.spawn(fps_loop(
            LoopGuard::new(&self.shared),
            self.fps_window,
            shutdown.clone(),
        )));

        let heap_sampling = self.shared.telemetry.supports_heap_sampling();
        if heap_sampling {
            handles.push(handle.spawn(memory_loop(
                LoopGuard::new(&self.shared),
                self.memory_interval,
                shutdown.clone(),
            )));
        }

        info!(
            fps_window_ms = self.fps_window.as_millis() as u64,
            memory_interval_ms = self.memory_interval.as_millis() as u64,
            heap_sampling,
            "Performance monitor started"
        );

        *running = Some(Running { shutdown, handles });
        Ok(())
    }

    /// Stop sampling. A second call while idle is a no-op.
    pub fn stop(&self) {
        let Some(run) = self.running.lock().take() else {
            return;
        };
        run.shutdown.cancel();
        for handle in &run.handles {
            handle.abort();
        }
        self.shared.counter.disarm();
        info!("Performance monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Number of sampling loops whose tasks are still alive.
    pub fn active_loops(&self) -> usize {
        self.shared.active_loops.load(Ordering::SeqCst)
    }

    pub fn readings(&self) -> MonitorReadings {
        *self.shared.readings.lock()
    }

    /// Apply one FPS window as if the loop had measured it.
    pub fn observe_fps(&self, fps: f64) -> Option<TierTransition> {
        self.shared.observe_fps(fps)
    }

    /// Apply one heap sample as if the loop had measured it.
    pub fn observe_heap(&self, utilization: f64) -> Option<TierTransition> {
        self.shared.observe_heap(utilization)
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn fps_loop(guard: LoopGuard, window: Duration, shutdown: CancellationToken) {
    let shared = &guard.0;
    let mut interval = tokio::time::interval(window);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // Skip the first immediate tick
    interval.tick().await;

    let mut sampler = FpsSampler::starting_at(Arc::clone(&shared.counter), Instant::now());

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("FPS loop shutting down");
                break;
            }

            _ = interval.tick() => {
                match sampler.sample(Instant::now()) {
                    Ok(fps) => {
                        shared.observe_fps(fps);
                    }
                    Err(e) => shared.skip("fps", &e),
                }
            }
        }
    }
}

async fn memory_loop(guard: LoopGuard, period: Duration, shutdown: CancellationToken) {
    let shared = &guard.0;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("Memory loop shutting down");
                break;
            }

            _ = interval.tick() => {
                match shared.telemetry.heap_utilization() {
                    Ok(utilization) => {
                        shared.observe_heap(utilization);
                    }
                    Err(e) => shared.skip("heap", &SampleError::from(e)),
                }
            }
        }
    }
}
