//! The adaptive motion controller.
//!
//! [`MotionController`] is built once at the application's composition root
//! and cloned into every call-site that animates. It probes the device,
//! classifies the initial tier, and owns the performance monitor and the
//! preference watcher that keep the tier current afterwards.
//!
//! Call-sites must query per effect and never cache answers across frames;
//! the tier can change between any two calls.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use motionlayer::config::ConfigFile;
//! use motionlayer::profile::{NetworkClass, StaticTelemetry};
//! use motionlayer::{Feature, MotionController, QualityTier};
//!
//! let telemetry = StaticTelemetry::new()
//!     .with_memory_gib(8.0)
//!     .with_logical_cores(8)
//!     .with_network(NetworkClass::Cellular4g);
//! let controller = MotionController::new(&ConfigFile::default(), Arc::new(telemetry));
//!
//! assert_eq!(controller.effective_tier(), QualityTier::High);
//! assert!(controller.allow(Feature::Particles));
//! assert_eq!(controller.scaled_duration(0.6), 0.6);
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::classify::{score, ScoreBreakdown};
use crate::config::{ConfigFile, MotionSettings};
use crate::diagnostics::Diagnostics;
use crate::monitor::{FrameCounter, MonitorError, PerformanceMonitor};
use crate::profile::{CapabilityProber, DeviceProfile, PlatformTelemetry, StaticTelemetry};
use crate::query::MotionQuery;
use crate::state::{TierSnapshot, TierState, TierTransition};
use crate::tier::{Feature, QualityTier, TierReason};
use crate::watcher::{PreferenceClient, PreferenceEvent, PreferenceWatcher};

/// Background tasks owned by a started controller.
struct Background {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

struct Inner {
    prober: CapabilityProber,
    profile: Arc<DeviceProfile>,
    score: ScoreBreakdown,
    motion: MotionSettings,
    state: Arc<TierState>,
    monitor: PerformanceMonitor,
    watcher: Arc<PreferenceWatcher>,
    client: PreferenceClient,
    events: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<PreferenceEvent>>>,
    battery_poll: Duration,
    background: Mutex<Option<Background>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(bg) = self.background.get_mut().take() {
            bg.shutdown.cancel();
            for handle in &bg.handles {
                handle.abort();
            }
        }
    }
}

/// Shared handle to the adaptive motion controller.
///
/// Cheap to clone; every clone sees the same state.
#[derive(Clone)]
pub struct MotionController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionController")
            .field("profile", &self.inner.profile)
            .field("state", &self.inner.state.snapshot())
            .field("monitor", &self.inner.monitor)
            .finish_non_exhaustive()
    }
}

impl MotionController {
    /// Probe the device through `telemetry` and classify the initial tier.
    ///
    /// The reduced-motion preference is applied immediately if the platform
    /// reports one. Battery state is read once [`start`](Self::start) runs
    /// and polled for changes while the controller is started.
    pub fn new(config: &ConfigFile, telemetry: Arc<dyn PlatformTelemetry>) -> Self {
        let prober = CapabilityProber::new(Arc::clone(&telemetry));
        let profile = prober.probe();
        let controller = Self::build(prober, profile, config);

        if let Some(reduced) = telemetry.prefers_reduced_motion() {
            controller.notify(PreferenceEvent::ReducedMotion(reduced));
        }
        controller
    }

    /// Build a controller around an already captured profile.
    ///
    /// No live telemetry is attached: the memory loop never runs and no
    /// battery lookup happens.
    pub fn from_profile(profile: DeviceProfile, config: &ConfigFile) -> Self {
        let prober = CapabilityProber::new(Arc::new(StaticTelemetry::new()));
        Self::build(prober, profile, config)
    }

    fn build(prober: CapabilityProber, profile: DeviceProfile, config: &ConfigFile) -> Self {
        let score = score(&profile);
        let tier = score.tier();
        info!(score = %score, tier = %tier, "Initial tier classified");

        let profile = Arc::new(profile);
        let state = Arc::new(TierState::new(tier));
        let monitor = PerformanceMonitor::new(
            Arc::clone(&state),
            Arc::clone(prober.telemetry()),
            &config.monitor,
        );
        let watcher = Arc::new(PreferenceWatcher::new(
            Arc::clone(&state),
            Arc::clone(&profile),
            config.battery.clone(),
        ));
        let (client, rx) = PreferenceWatcher::channel();

        Self {
            inner: Arc::new(Inner {
                prober,
                profile,
                score,
                motion: config.motion.clone(),
                state,
                monitor,
                watcher,
                client,
                events: Arc::new(tokio::sync::Mutex::new(rx)),
                battery_poll: config.battery.poll_interval,
                background: Mutex::new(None),
            }),
        }
    }

    // =========================================================================
    // Query API
    // =========================================================================

    /// A consistent view for answering several questions about one frame.
    pub fn query(&self) -> MotionQuery<'_> {
        MotionQuery::new(
            self.inner.state.snapshot(),
            &self.inner.profile,
            &self.inner.motion,
        )
    }

    pub fn effective_tier(&self) -> QualityTier {
        self.inner.state.effective_tier()
    }

    pub fn scaled_duration(&self, base_secs: f64) -> f64 {
        self.query().scaled_duration(base_secs)
    }

    pub fn scaled_stagger(&self, base_secs: f64) -> f64 {
        self.query().scaled_stagger(base_secs)
    }

    pub fn allow(&self, feature: Feature) -> bool {
        self.query().allow(feature)
    }

    pub fn allow_named(&self, name: &str) -> bool {
        self.query().allow_named(name)
    }

    pub fn easing_curve(&self) -> &str {
        self.query().easing_curve()
    }

    /// Multiplier for the animation engine's global time base.
    pub fn time_scale(&self) -> f64 {
        self.query().time_scale()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Start the performance monitor, the preference event loop and the
    /// battery poller.
    ///
    /// Idempotent. The poller's first read is the deferred battery lookup.
    pub fn start(&self) -> Result<(), MonitorError> {
        self.inner.monitor.start()?;

        let mut background = self.inner.background.lock();
        if background.is_some() {
            return Ok(());
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.inner.monitor.stop();
            return Err(MonitorError::NoRuntime);
        };

        let shutdown = CancellationToken::new();
        let mut handles = Vec::with_capacity(2);

        // A previous event loop releases the receiver when it is aborted.
        let events = Arc::clone(&self.inner.events);
        let watcher = Arc::clone(&self.inner.watcher);
        let token = shutdown.clone();
        handles.push(runtime.spawn(async move {
            let mut rx = events.lock_owned().await;
            watcher.drain(&mut rx, &token).await;
        }));

        handles.push(runtime.spawn(Arc::clone(&self.inner.watcher).poll_battery(
            self.inner.prober.clone(),
            self.inner.battery_poll,
            shutdown.clone(),
        )));

        *background = Some(Background { shutdown, handles });
        Ok(())
    }

    /// Stop the performance monitor, the preference event loop and the
    /// battery poller.
    ///
    /// Idempotent. Preference events sent through a [`PreferenceClient`]
    /// while stopped queue up and are applied on the next start.
    pub fn stop(&self) {
        self.inner.monitor.stop();
        if let Some(bg) = self.inner.background.lock().take() {
            bg.shutdown.cancel();
            for handle in &bg.handles {
                handle.abort();
            }
            debug!("Controller background tasks stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.monitor.is_running()
    }

    /// Number of live sampling loops.
    pub fn active_loops(&self) -> usize {
        self.inner.monitor.active_loops()
    }

    /// The per-frame callback sink.
    pub fn frame_counter(&self) -> Arc<FrameCounter> {
        self.inner.monitor.frame_counter()
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Apply a preference change synchronously.
    pub fn notify(&self, event: PreferenceEvent) -> Option<TierTransition> {
        self.inner.watcher.handle_event(event)
    }

    /// Sender for preference changes from platform callbacks.
    ///
    /// Events are applied by the event loop while the controller is started.
    pub fn preference_client(&self) -> PreferenceClient {
        self.inner.client.clone()
    }

    /// Feed one FPS window through the monitor policy.
    pub fn observe_fps(&self, fps: f64) -> Option<TierTransition> {
        self.inner.monitor.observe_fps(fps)
    }

    /// Feed one heap sample through the memory safety valve.
    pub fn observe_heap(&self, utilization: f64) -> Option<TierTransition> {
        self.inner.monitor.observe_heap(utilization)
    }

    /// Re-run the classifier against the original profile.
    ///
    /// Clears the memory latch. Reduced motion and battery constraint stay
    /// in force because they mirror live platform signals.
    pub fn reset(&self) -> TierTransition {
        let tier = self.inner.score.tier();
        let transition = self.inner.state.reclassify(tier, TierReason::ManualReset);
        info!(from = %transition.from, to = %tier, "Tier reset to classification");
        transition
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn snapshot(&self) -> TierSnapshot {
        self.inner.state.snapshot()
    }

    /// Receiver notified on every effective-tier change.
    pub fn subscribe(&self) -> watch::Receiver<QualityTier> {
        self.inner.state.subscribe()
    }

    /// The captured profile, with the latest battery reading filled in.
    pub fn profile(&self) -> DeviceProfile {
        let mut profile = (*self.inner.profile).clone();
        profile.battery = self.inner.watcher.last_battery();
        profile
    }

    pub fn score(&self) -> ScoreBreakdown {
        self.inner.score
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let query = self.query();
        let snapshot = self.inner.state.snapshot();
        let readings = self.inner.monitor.readings();
        let profile = self.profile();

        Diagnostics {
            version: crate::VERSION,
            tier: snapshot.tier,
            effective_tier: snapshot.effective_tier(),
            reduced_motion: snapshot.reduced_motion,
            battery_constrained: snapshot.battery_constrained,
            memory_latched: snapshot.memory_latched,
            last_reason: snapshot.reason,
            transitions: snapshot.transitions,
            monitor_running: self.inner.monitor.is_running(),
            last_fps: readings.last_fps,
            last_heap_utilization: readings.last_heap_utilization,
            skipped_samples: readings.skipped_samples,
            time_scale: query.time_scale(),
            easing_curve: query.easing_curve().to_string(),
            is_handheld: profile.is_handheld,
            score: self.inner.score,
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{BatteryReading, NetworkClass};

    fn flagship() -> StaticTelemetry {
        StaticTelemetry::new()
            .with_memory_gib(8.0)
            .with_logical_cores(8)
            .with_network(NetworkClass::Cellular4g)
    }

    #[test]
    fn test_controller_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MotionController>();
    }

    #[test]
    fn test_unknown_device_starts_medium() {
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(StaticTelemetry::new()));
        assert_eq!(controller.effective_tier(), QualityTier::Medium);
        assert_eq!(controller.score().total(), 4);
    }

    #[test]
    fn test_initial_reduced_motion_preference_applied() {
        let controller = MotionController::new(
            &ConfigFile::default(),
            Arc::new(flagship().with_reduced_motion(true)),
        );
        assert_eq!(controller.effective_tier(), QualityTier::Low);
        assert_eq!(controller.snapshot().tier, QualityTier::High);
        assert_eq!(controller.time_scale(), 0.1);
        assert_eq!(controller.scaled_stagger(0.2), 0.0);
    }

    #[test]
    fn test_clones_share_state() {
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(flagship()));
        let other = controller.clone();
        other.observe_fps(12.0);
        assert_eq!(controller.effective_tier(), QualityTier::Low);
    }

    #[test]
    fn test_reset_restores_classification_and_clears_latch() {
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(flagship()));
        controller.observe_heap(0.95);
        assert!(controller.snapshot().memory_latched);

        let t = controller.reset();
        assert_eq!(t.from, QualityTier::Low);
        assert_eq!(t.to, QualityTier::High);
        assert!(!controller.snapshot().memory_latched);
        assert_eq!(controller.effective_tier(), QualityTier::High);
    }

    #[test]
    fn test_custom_easing_from_config() {
        let mut config = ConfigFile::default();
        config.motion.easing_high = "elastic.out".to_string();
        let controller = MotionController::new(&config, Arc::new(flagship()));
        assert_eq!(controller.easing_curve(), "elastic.out");
    }

    #[test]
    fn test_diagnostics_snapshot() {
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(flagship()));
        controller.observe_fps(24.0);
        let d = controller.diagnostics();

        assert_eq!(d.version, crate::VERSION);
        assert_eq!(d.tier, QualityTier::Low);
        assert_eq!(d.last_reason, TierReason::FpsDowngrade);
        assert_eq!(d.last_fps, Some(24.0));
        assert_eq!(d.transitions, 1);
        assert!(!d.monitor_running);
        assert_eq!(d.easing_curve, "power1.out");

        let text = d.to_string();
        assert!(text.contains("Effective: low"));
        assert!(text.contains("Last FPS: 24.0"));
        assert!(text.contains("fps downgrade"));
    }

    #[tokio::test]
    async fn test_start_stop_idempotent() {
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(flagship()));
        controller.start().unwrap();
        controller.start().unwrap();
        assert!(controller.is_running());
        assert_eq!(controller.active_loops(), 1);

        controller.stop();
        controller.stop();
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_battery_lookup_delivered_after_start() {
        let telemetry = flagship().with_battery(BatteryReading::new(0.08, false));
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(telemetry));
        assert!(controller.profile().battery.is_none());
        let mut rx = controller.subscribe();

        controller.start().unwrap();
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow(), QualityTier::Low);
        assert!(controller.snapshot().battery_constrained);
        assert_eq!(
            controller.profile().battery,
            Some(BatteryReading::new(0.08, false))
        );
        controller.stop();
    }

    #[tokio::test]
    async fn test_preference_client_applies_while_started() {
        let controller = MotionController::new(&ConfigFile::default(), Arc::new(flagship()));
        let mut rx = controller.subscribe();
        controller.start().unwrap();

        controller.preference_client().reduced_motion(true);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), QualityTier::Low);
        assert_eq!(controller.time_scale(), 0.1);
        controller.stop();
    }
}
