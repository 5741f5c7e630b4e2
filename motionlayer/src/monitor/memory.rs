//! Heap-utilization safety valve.
//!
//! One-way: a sample above the threshold forces a tier above `Low` down to
//! `Low` and latches, and no later FPS window can lift the tier until it is
//! reclassified. A tier that is already `Low` is left alone.

use crate::config::MonitorSettings;
use crate::state::{TierState, TierTransition};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryValve {
    pub threshold: f64,
}

impl MemoryValve {
    pub fn from_settings(settings: &MonitorSettings) -> Self {
        Self {
            threshold: settings.memory_threshold,
        }
    }

    /// Whether `utilization` trips the valve.
    pub fn trips(&self, utilization: f64) -> bool {
        utilization > self.threshold
    }

    /// Apply one heap sample to the state.
    pub fn apply(&self, utilization: f64, state: &TierState) -> Option<TierTransition> {
        if !self.trips(utilization) {
            return None;
        }
        state.apply_memory_valve()
    }
}
