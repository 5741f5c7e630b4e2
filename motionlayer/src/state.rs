//! Authoritative tier state shared by every reader and writer.
//!
//! `TierState` holds the stored tier plus the override flags that sit on top
//! of it. It is mutated only through narrow setters, one per concern:
//!
//! | Writer               | Setter                                   |
//! |----------------------|------------------------------------------|
//! | FPS sampler          | `apply_fps_downgrade`, `apply_fps_recovery` |
//! | Memory sampler       | `apply_memory_valve`                     |
//! | Preference watcher   | `set_reduced_motion`, `constrain_battery`, `release_battery` |
//! | Controller           | `reclassify`                             |
//!
//! Every setter replaces whole values under a single write lock, so a reader
//! never observes a half-updated state. Effective-tier changes are published
//! on a `watch` channel.

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::watch;

use crate::tier::{QualityTier, TierReason};

/// A change of the stored tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierTransition {
    pub from: QualityTier,
    pub to: QualityTier,
    pub reason: TierReason,
}

/// Point-in-time copy of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierSnapshot {
    /// Stored tier, before overrides.
    pub tier: QualityTier,
    /// Why the stored tier last changed.
    pub reason: TierReason,
    pub reduced_motion: bool,
    pub battery_constrained: bool,
    /// The memory safety valve fired and FPS recovery is blocked.
    pub memory_latched: bool,
    /// Number of stored-tier changes since construction.
    pub transitions: u64,
}

impl TierSnapshot {
    /// Tier call-sites act on: `Low` under any override, else the stored tier.
    pub fn effective_tier(&self) -> QualityTier {
        if self.reduced_motion || self.battery_constrained {
            QualityTier::Low
        } else {
            self.tier
        }
    }

    /// Tier ignoring the reduced-motion override.
    ///
    /// Duration scaling compounds the reduced-motion factor on top of this
    /// tier's factor rather than collapsing to the `Low` factor.
    pub fn performance_tier(&self) -> QualityTier {
        if self.battery_constrained {
            QualityTier::Low
        } else {
            self.tier
        }
    }
}

/// Shared, lock-protected tier state.
#[derive(Debug)]
pub struct TierState {
    inner: RwLock<TierSnapshot>,
    effective_tx: watch::Sender<QualityTier>,
}

impl TierState {
    /// Create state seeded with the classified tier.
    pub fn new(initial: QualityTier) -> Self {
        let snapshot = TierSnapshot {
            tier: initial,
            reason: TierReason::Classified,
            reduced_motion: false,
            battery_constrained: false,
            memory_latched: false,
            transitions: 0,
        };
        let (effective_tx, _) = watch::channel(snapshot.effective_tier());
        Self {
            inner: RwLock::new(snapshot),
            effective_tx,
        }
    }

    pub fn snapshot(&self) -> TierSnapshot {
        *self.inner.read()
    }

    pub fn stored_tier(&self) -> QualityTier {
        self.inner.read().tier
    }

    pub fn effective_tier(&self) -> QualityTier {
        self.inner.read().effective_tier()
    }

    pub fn performance_tier(&self) -> QualityTier {
        self.inner.read().performance_tier()
    }

    /// Receiver that observes every effective-tier change.
    pub fn subscribe(&self) -> watch::Receiver<QualityTier> {
        self.effective_tx.subscribe()
    }

    /// FPS writer: drop straight to `Low` unless already there.
    pub fn apply_fps_downgrade(&self) -> Option<TierTransition> {
        self.update(|s| {
            if s.tier == QualityTier::Low {
                return None;
            }
            Some(set_tier(s, QualityTier::Low, TierReason::FpsDowngrade))
        })
    }

    /// FPS writer: lift `Low` to `Medium`, never higher.
    ///
    /// Refused while the memory latch or a battery constraint hold the tier
    /// down. Reduced motion does not block it: the stored tier keeps tracking
    /// frame rate and the override only masks the effective tier. The check
    /// runs under the same lock as the write so a downgrade that landed first
    /// always wins.
    pub fn apply_fps_recovery(&self) -> Option<TierTransition> {
        self.update(|s| {
            if s.tier != QualityTier::Low || s.memory_latched || s.battery_constrained {
                return None;
            }
            Some(set_tier(s, QualityTier::Medium, TierReason::FpsRecovery))
        })
    }

    /// Memory writer: force `Low` and latch.
    ///
    /// Only fires when the tier is above `Low`. A tier that is already `Low`
    /// is left unlatched so FPS recovery can still lift it.
    pub fn apply_memory_valve(&self) -> Option<TierTransition> {
        self.update(|s| {
            if s.tier == QualityTier::Low {
                return None;
            }
            s.memory_latched = true;
            Some(set_tier(s, QualityTier::Low, TierReason::MemoryValve))
        })
    }

    /// Preference writer: record the reduced-motion preference.
    ///
    /// Returns `true` if the flag changed.
    pub fn set_reduced_motion(&self, requested: bool) -> bool {
        self.update(|s| {
            let changed = s.reduced_motion != requested;
            s.reduced_motion = requested;
            changed
        })
    }

    /// Preference writer: battery is low and unplugged.
    pub fn constrain_battery(&self) -> Option<TierTransition> {
        self.update(|s| {
            s.battery_constrained = true;
            if s.tier == QualityTier::Low {
                return None;
            }
            Some(set_tier(s, QualityTier::Low, TierReason::BatteryLow))
        })
    }

    /// Preference writer: battery recovered while charging.
    ///
    /// Clears the constraint and the memory latch, then stores `reclassified`.
    /// Returns `None` without touching anything if no constraint was held.
    pub fn release_battery(&self, reclassified: QualityTier) -> Option<TierTransition> {
        self.update(|s| {
            if !s.battery_constrained {
                return None;
            }
            s.battery_constrained = false;
            s.memory_latched = false;
            let from = s.tier;
            set_tier(s, reclassified, TierReason::BatteryRecovered);
            Some(TierTransition {
                from,
                to: reclassified,
                reason: TierReason::BatteryRecovered,
            })
        })
    }

    /// Store a freshly classified tier and clear the memory latch.
    ///
    /// Override flags reflect live platform signals and are left alone.
    pub fn reclassify(&self, tier: QualityTier, reason: TierReason) -> TierTransition {
        self.update(|s| {
            s.memory_latched = false;
            let from = s.tier;
            set_tier(s, tier, reason);
            TierTransition {
                from,
                to: tier,
                reason,
            }
        })
    }

    fn update<R>(&self, f: impl FnOnce(&mut TierSnapshot) -> R) -> R {
        let mut inner = self.inner.write();
        let result = f(&mut inner);
        let effective = inner.effective_tier();
        self.effective_tx.send_if_modified(|current| {
            if *current == effective {
                false
            } else {
                *current = effective;
                true
            }
        });
        result
    }
}

fn set_tier(s: &mut TierSnapshot, to: QualityTier, reason: TierReason) -> TierTransition {
    let from = s.tier;
    if from != to {
        s.transitions += 1;
    }
    s.tier = to;
    s.reason = reason;
    TierTransition { from, to, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_forces_low_for_every_tier() {
        for tier in QualityTier::ALL {
            for reduced in [true, false] {
                let state = TierState::new(tier);
                state.set_reduced_motion(reduced);

                let expected = if reduced { QualityTier::Low } else { tier };
                assert_eq!(state.effective_tier(), expected, "{} / {}", tier, reduced);
                assert_eq!(state.stored_tier(), tier, "stored tier preserved");
            }
        }
    }

    #[test]
    fn test_fps_downgrade_goes_straight_to_low() {
        let state = TierState::new(QualityTier::High);
        let t = state.apply_fps_downgrade().unwrap();
        assert_eq!(t.from, QualityTier::High);
        assert_eq!(t.to, QualityTier::Low);
        assert_eq!(t.reason, TierReason::FpsDowngrade);
        assert!(state.apply_fps_downgrade().is_none());
    }

    #[test]
    fn test_fps_recovery_stops_at_medium() {
        let state = TierState::new(QualityTier::High);
        state.apply_fps_downgrade();
        let t = state.apply_fps_recovery().unwrap();
        assert_eq!(t.to, QualityTier::Medium);
        assert!(state.apply_fps_recovery().is_none());
        assert_eq!(state.stored_tier(), QualityTier::Medium);
    }

    #[test]
    fn test_memory_latch_blocks_recovery() {
        let state = TierState::new(QualityTier::High);
        assert!(state.apply_memory_valve().is_some());
        assert!(state.snapshot().memory_latched);
        assert!(state.apply_fps_recovery().is_none());
        assert_eq!(state.effective_tier(), QualityTier::Low);
    }

    #[test]
    fn test_memory_valve_ignores_tier_already_low() {
        let state = TierState::new(QualityTier::High);
        state.apply_fps_downgrade();

        assert!(state.apply_memory_valve().is_none());
        assert!(!state.snapshot().memory_latched);

        let t = state.apply_fps_recovery().unwrap();
        assert_eq!(t.to, QualityTier::Medium);
        assert_eq!(state.effective_tier(), QualityTier::Medium);
    }

    #[test]
    fn test_recovery_tracks_fps_under_reduced_motion() {
        let state = TierState::new(QualityTier::Low);
        state.set_reduced_motion(true);

        let t = state.apply_fps_recovery().unwrap();
        assert_eq!(t.to, QualityTier::Medium);
        assert_eq!(state.stored_tier(), QualityTier::Medium);
        assert_eq!(state.effective_tier(), QualityTier::Low);

        state.set_reduced_motion(false);
        assert_eq!(state.effective_tier(), QualityTier::Medium);
    }

    #[test]
    fn test_downgrade_wins_over_recovery_in_same_tick() {
        let state = TierState::new(QualityTier::High);
        state.apply_memory_valve();
        assert!(state.apply_fps_recovery().is_none());
        assert_eq!(state.stored_tier(), QualityTier::Low);
        assert_eq!(state.effective_tier(), QualityTier::Low);

        let state = TierState::new(QualityTier::High);
        state.constrain_battery();
        assert!(state.apply_fps_recovery().is_none());
        assert_eq!(state.stored_tier(), QualityTier::Low);
        assert_eq!(state.effective_tier(), QualityTier::Low);
    }

    #[test]
    fn test_concurrent_writers_never_leave_recovered_tier() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        for _ in 0..200 {
            let state = Arc::new(TierState::new(QualityTier::High));
            let barrier = Arc::new(Barrier::new(2));

            let valve = {
                let (state, barrier) = (Arc::clone(&state), Arc::clone(&barrier));
                thread::spawn(move || {
                    barrier.wait();
                    state.apply_memory_valve();
                })
            };
            let fps = {
                let (state, barrier) = (Arc::clone(&state), Arc::clone(&barrier));
                thread::spawn(move || {
                    barrier.wait();
                    state.apply_fps_recovery();
                })
            };
            valve.join().unwrap();
            fps.join().unwrap();

            // Recovery needs `Low` first, and the valve latches on its way
            // there, so the pair always ends latched at `Low`.
            let snap = state.snapshot();
            assert_eq!(snap.tier, QualityTier::Low);
            assert!(snap.memory_latched);
        }
    }

    #[test]
    fn test_battery_constraint_and_release() {
        let state = TierState::new(QualityTier::High);
        let t = state.constrain_battery().unwrap();
        assert_eq!(t.reason, TierReason::BatteryLow);
        assert_eq!(state.performance_tier(), QualityTier::Low);
        assert!(state.apply_fps_recovery().is_none());

        state.apply_memory_valve();
        let t = state.release_battery(QualityTier::High).unwrap();
        assert_eq!(t.from, QualityTier::Low);
        assert_eq!(t.to, QualityTier::High);
        let snap = state.snapshot();
        assert!(!snap.battery_constrained);
        assert!(!snap.memory_latched);
        assert_eq!(snap.effective_tier(), QualityTier::High);
    }

    #[test]
    fn test_release_without_constraint_is_noop() {
        let state = TierState::new(QualityTier::High);
        state.apply_memory_valve();
        assert!(state.release_battery(QualityTier::High).is_none());
        assert_eq!(state.stored_tier(), QualityTier::Low);
        assert!(state.snapshot().memory_latched);
    }

    #[test]
    fn test_reclassify_clears_latch_keeps_overrides() {
        let state = TierState::new(QualityTier::High);
        state.apply_memory_valve();
        state.set_reduced_motion(true);
        let t = state.reclassify(QualityTier::High, TierReason::ManualReset);
        assert_eq!(t.from, QualityTier::Low);
        let snap = state.snapshot();
        assert!(!snap.memory_latched);
        assert!(snap.reduced_motion);
        assert_eq!(snap.tier, QualityTier::High);
        assert_eq!(snap.reason, TierReason::ManualReset);
    }

    #[test]
    fn test_transition_count() {
        let state = TierState::new(QualityTier::High);
        state.apply_fps_downgrade();
        state.apply_fps_recovery();
        state.reclassify(QualityTier::Medium, TierReason::ManualReset);
        assert_eq!(state.snapshot().transitions, 2);
    }

    #[test]
    fn test_subscribe_sees_effective_changes() {
        let state = TierState::new(QualityTier::High);
        let mut rx = state.subscribe();
        assert_eq!(*rx.borrow_and_update(), QualityTier::High);

        state.set_reduced_motion(true);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), QualityTier::Low);

        // Stored tier drops but the effective tier was already Low.
        state.apply_fps_downgrade();
        assert!(!rx.has_changed().unwrap());
    }
}
