//! Reduced-motion and battery preference watcher.
//!
//! Platform change notifications arrive as [`PreferenceEvent`]s, either
//! applied synchronously through [`PreferenceWatcher::handle_event`] or sent
//! through a [`PreferenceClient`] and drained by [`PreferenceWatcher::run`].
//!
//! # Battery bands
//!
//! ```text
//! level < low_level (15%) and unplugged      -> constrained, tier forced low
//! level > recover_level (50%) and charging   -> constraint cleared, reclassified
//! anything in between                        -> unchanged
//! ```
//!
//! Recovery re-runs the classifier against the original profile, so it can
//! restore a tier that the frame-rate monitor had moved away from.
//!
//! Platforms without change notifications are covered by
//! [`PreferenceWatcher::poll_battery`], which reads the battery on an
//! interval and applies only readings that differ from the last one.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::classify::classify;
use crate::config::BatterySettings;
use crate::profile::{BatteryReading, CapabilityProber, DeviceProfile};
use crate::state::{TierState, TierTransition};

/// A platform preference change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreferenceEvent {
    /// The reduced-motion preference changed.
    ReducedMotion(bool),
    /// A new battery level or charging state.
    Battery(BatteryReading),
}

/// Fire-and-forget sender for preference events.
///
/// Cheap to clone; sends are silently dropped once the watcher has stopped.
#[derive(Debug, Clone)]
pub struct PreferenceClient {
    tx: mpsc::UnboundedSender<PreferenceEvent>,
}

impl PreferenceClient {
    pub fn new(tx: mpsc::UnboundedSender<PreferenceEvent>) -> Self {
        Self { tx }
    }

    #[inline]
    fn send(&self, event: PreferenceEvent) {
        // Ignore send errors - watcher may have shut down
        let _ = self.tx.send(event);
    }

    pub fn reduced_motion(&self, requested: bool) {
        self.send(PreferenceEvent::ReducedMotion(requested));
    }

    pub fn battery(&self, reading: BatteryReading) {
        self.send(PreferenceEvent::Battery(reading));
    }
}

/// Applies preference events to the tier state.
#[derive(Debug)]
pub struct PreferenceWatcher {
    state: Arc<TierState>,
    profile: Arc<DeviceProfile>,
    bands: BatterySettings,
    last_battery: Mutex<Option<BatteryReading>>,
}

impl PreferenceWatcher {
    pub fn new(state: Arc<TierState>, profile: Arc<DeviceProfile>, bands: BatterySettings) -> Self {
        Self {
            state,
            profile,
            bands,
            last_battery: Mutex::new(None),
        }
    }

    /// Create a client and the receiver to pass to [`run`](Self::run).
    pub fn channel() -> (PreferenceClient, mpsc::UnboundedReceiver<PreferenceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PreferenceClient::new(tx), rx)
    }

    /// Most recent battery reading, if any has arrived.
    pub fn last_battery(&self) -> Option<BatteryReading> {
        *self.last_battery.lock()
    }

    /// Apply one event. Returns the stored-tier change it caused, if any.
    pub fn handle_event(&self, event: PreferenceEvent) -> Option<TierTransition> {
        match event {
            PreferenceEvent::ReducedMotion(requested) => {
                if self.state.set_reduced_motion(requested) {
                    info!(
                        reduced_motion = requested,
                        effective = %self.state.effective_tier(),
                        "Reduced-motion preference changed"
                    );
                }
                None
            }
            PreferenceEvent::Battery(reading) => self.handle_battery(reading),
        }
    }

    /// Apply `reading` only if it differs from the last battery reading.
    ///
    /// Returns `true` if the reading was applied.
    pub fn observe_battery(&self, reading: BatteryReading) -> bool {
        if self.last_battery() == Some(reading) {
            return false;
        }
        self.handle_battery(reading);
        true
    }

    fn handle_battery(&self, reading: BatteryReading) -> Option<TierTransition> {
        *self.last_battery.lock() = Some(reading);
        let constrained = self.state.snapshot().battery_constrained;

        if reading.level < self.bands.low_level && !reading.charging {
            if constrained {
                return None;
            }
            let transition = self.state.constrain_battery();
            info!(
                level = format!("{:.0}%", reading.level * 100.0),
                "Battery low and unplugged, tier forced to low"
            );
            return transition;
        }

        if reading.level > self.bands.recover_level && reading.charging && constrained {
            let tier = classify(&self.profile);
            let transition = self.state.release_battery(tier);
            info!(
                level = format!("{:.0}%", reading.level * 100.0),
                tier = %tier,
                "Battery recovered while charging, tier reclassified"
            );
            return transition;
        }

        debug!(
            level = format!("{:.0}%", reading.level * 100.0),
            charging = reading.charging,
            constrained,
            "Battery reading inside hysteresis band"
        );
        None
    }

    /// Read the battery every `period` until shutdown is signalled.
    ///
    /// The first read happens immediately and doubles as the deferred
    /// battery lookup. Unchanged readings and missing telemetry are ignored.
    pub async fn poll_battery(
        self: Arc<Self>,
        prober: CapabilityProber,
        period: Duration,
        shutdown: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(poll_interval_ms = period.as_millis() as u64, "Battery poller starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("Battery poller shutting down");
                    break;
                }

                _ = interval.tick() => {
                    if let Some(reading) = prober.probe_battery().await {
                        self.observe_battery(reading);
                    }
                }
            }
        }
    }

    /// Drain events until shutdown is signalled or every client is dropped.
    pub async fn run(
        self: Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<PreferenceEvent>,
        shutdown: CancellationToken,
    ) {
        self.drain(&mut rx, &shutdown).await;
    }

    /// Like [`run`](Self::run) over a borrowed receiver, so the channel
    /// outlives one run of the event loop.
    pub async fn drain(
        &self,
        rx: &mut mpsc::UnboundedReceiver<PreferenceEvent>,
        shutdown: &CancellationToken,
    ) {
        debug!("Preference watcher starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("Preference watcher shutting down");
                    break;
                }

                event = rx.recv() => match event {
                    Some(event) => {
                        self.handle_event(event);
                    }
                    None => {
                        debug!("Preference channel closed");
                        break;
                    }
                },
            }
        }
    }
}
