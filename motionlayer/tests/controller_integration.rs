//! Integration tests for the motion controller.
//!
//! These tests drive the public API end to end:
//! - Classification of concrete device profiles
//! - Frame-rate downgrade and hysteresis through the live monitor loop
//! - The one-way memory safety valve
//! - Reduced-motion and battery overrides
//! - Monitor lifecycle idempotence

use std::sync::Arc;
use std::time::Duration;

use motionlayer::classify::{classify, score};
use motionlayer::config::ConfigFile;
use motionlayer::profile::{
    BatteryReading, CapabilityProber, DeviceProfile, NetworkClass, PlatformTelemetry,
    StaticTelemetry,
};
use motionlayer::{Feature, MotionController, PreferenceEvent, QualityTier, TierReason};

// =============================================================================
// Test Helpers
// =============================================================================

fn flagship_telemetry() -> StaticTelemetry {
    StaticTelemetry::new()
        .with_memory_gib(8.0)
        .with_logical_cores(8)
        .with_network(NetworkClass::Cellular4g)
        .with_pixel_ratio(1.0)
}

fn controller(telemetry: StaticTelemetry) -> MotionController {
    MotionController::new(&ConfigFile::default(), Arc::new(telemetry))
}

/// Report frames at `fps` for `seconds` of (paused) time.
async fn render(controller: &MotionController, fps: u32, seconds: u32) {
    let counter = controller.frame_counter();
    let frame = Duration::from_secs(1) / fps;
    for _ in 0..fps * seconds {
        counter.record_frame();
        tokio::time::sleep(frame).await;
    }
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn flagship_desktop_classifies_high() {
    let profile = CapabilityProber::new(Arc::new(flagship_telemetry())).probe();
    let s = score(&profile);

    assert_eq!(
        (s.memory, s.cores, s.network, s.handheld, s.pixel_density),
        (3, 3, 2, 0, 0)
    );
    assert_eq!(s.total(), 8);
    assert_eq!(classify(&profile), QualityTier::High);
}

#[test]
fn budget_phone_classifies_low() {
    let telemetry = StaticTelemetry::new()
        .with_memory_gib(2.0)
        .with_logical_cores(2)
        .with_pixel_ratio(3.0)
        .with_viewport_width(390)
        .with_touch(true);
    let controller = controller(telemetry);

    assert_eq!(controller.score().total(), -1);
    assert_eq!(controller.effective_tier(), QualityTier::Low);
    assert!(controller.profile().is_handheld);
    assert!(!controller.allow(Feature::Parallax));
}

#[test]
fn nothing_observable_defaults_to_medium() {
    let controller = controller(StaticTelemetry::new());
    assert_eq!(controller.effective_tier(), QualityTier::Medium);
    assert_eq!(controller.profile(), DeviceProfile::default());
}

// =============================================================================
// Live monitor
// =============================================================================

#[tokio::test(start_paused = true)]
async fn slow_frames_downgrade_after_first_window() {
    let controller = controller(flagship_telemetry());
    assert_eq!(controller.effective_tier(), QualityTier::High);
    controller.start().unwrap();

    // First window at ~25 fps.
    render(&controller, 25, 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.effective_tier(), QualityTier::Low);
    assert_eq!(controller.snapshot().transitions, 1);

    // Two more slow windows change nothing further.
    render(&controller, 28, 1).await;
    render(&controller, 22, 1).await;
    assert_eq!(controller.effective_tier(), QualityTier::Low);
    assert_eq!(controller.snapshot().transitions, 1);

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn deadband_frames_do_not_recover() {
    let controller = controller(flagship_telemetry());
    controller.start().unwrap();

    render(&controller, 20, 1).await;
    render(&controller, 40, 5).await;
    assert_eq!(controller.effective_tier(), QualityTier::Low);

    render(&controller, 60, 2).await;
    assert_eq!(controller.effective_tier(), QualityTier::Medium);
    assert_eq!(controller.snapshot().reason, TierReason::FpsRecovery);

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn memory_valve_is_not_undone_by_fast_frames() {
    let controller = controller(flagship_telemetry().with_heap_utilization(0.9));
    controller.start().unwrap();
    assert_eq!(controller.active_loops(), 2);

    // The heap sample at 5 s trips the valve.
    render(&controller, 60, 5).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.effective_tier(), QualityTier::Low);
    assert_eq!(controller.snapshot().reason, TierReason::MemoryValve);

    // Ten seconds of 60 fps must not lift it.
    render(&controller, 60, 10).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.effective_tier(), QualityTier::Low);
    assert!(snapshot.memory_latched);

    controller.stop();
}

#[test]
fn heap_spike_on_fps_low_tier_does_not_block_recovery() {
    let c = controller(flagship_telemetry());
    c.observe_fps(20.0);
    assert!(c.observe_heap(0.85).is_none());
    assert!(!c.snapshot().memory_latched);

    let t = c.observe_fps(60.0).unwrap();
    assert_eq!(t.to, QualityTier::Medium);
    assert_eq!(c.effective_tier(), QualityTier::Medium);
}

#[tokio::test(start_paused = true)]
async fn downgrades_win_over_fast_frames_in_the_same_tick() {
    // Memory and FPS loops both fire at 5 s, 10 s and 15 s.
    let telemetry = Arc::new(flagship_telemetry().with_heap_utilization(0.95));
    let controller = MotionController::new(
        &ConfigFile::default(),
        Arc::clone(&telemetry) as Arc<dyn PlatformTelemetry>,
    );
    controller.start().unwrap();

    for _ in 0..3 {
        render(&controller, 60, 5).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.tier, QualityTier::Low);
        assert!(snapshot.memory_latched);
    }

    // A battery constraint landing among fast windows also holds.
    controller.reset();
    telemetry.set_heap_utilization(0.1);
    controller.notify(PreferenceEvent::Battery(BatteryReading::new(0.05, false)));
    render(&controller, 60, 3).await;
    assert_eq!(controller.snapshot().tier, QualityTier::Low);
    assert_eq!(controller.effective_tier(), QualityTier::Low);

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn battery_changes_after_start_are_picked_up() {
    // No frames are rendered here, so keep the FPS window out of the way.
    let mut config = ConfigFile::default();
    config.monitor.fps_window = Duration::from_secs(3600);
    let poll = config.battery.poll_interval;

    let telemetry = Arc::new(flagship_telemetry().with_battery(BatteryReading::new(0.80, false)));
    let controller = MotionController::new(
        &config,
        Arc::clone(&telemetry) as Arc<dyn PlatformTelemetry>,
    );
    let mut rx = controller.subscribe();
    controller.start().unwrap();

    telemetry.set_battery(Some(BatteryReading::new(0.10, false)));
    tokio::time::timeout(poll * 3, rx.changed()).await.unwrap().unwrap();
    assert_eq!(*rx.borrow_and_update(), QualityTier::Low);
    assert!(controller.snapshot().battery_constrained);

    telemetry.set_battery(Some(BatteryReading::new(0.65, true)));
    tokio::time::timeout(poll * 3, rx.changed()).await.unwrap().unwrap();
    assert_eq!(*rx.borrow_and_update(), QualityTier::High);
    assert_eq!(controller.snapshot().reason, TierReason::BatteryRecovered);
    assert_eq!(
        controller.profile().battery,
        Some(BatteryReading::new(0.65, true))
    );

    controller.stop();
}

#[tokio::test(start_paused = true)]
async fn heap_pressure_relief_needs_reset() {
    let telemetry = Arc::new(flagship_telemetry().with_heap_utilization(0.95));
    let controller = MotionController::new(
        &ConfigFile::default(),
        Arc::clone(&telemetry) as Arc<dyn PlatformTelemetry>,
    );
    controller.start().unwrap();
    render(&controller, 60, 6).await;
    assert_eq!(controller.effective_tier(), QualityTier::Low);

    telemetry.set_heap_utilization(0.2);
    render(&controller, 60, 6).await;
    assert_eq!(controller.effective_tier(), QualityTier::Low);

    controller.reset();
    assert_eq!(controller.effective_tier(), QualityTier::High);
    controller.stop();
}

#[tokio::test]
async fn start_twice_runs_one_loop_and_stop_twice_is_noop() {
    let controller = controller(flagship_telemetry());
    controller.start().unwrap();
    controller.start().unwrap();
    assert_eq!(controller.active_loops(), 1);

    controller.stop();
    controller.stop();
    for _ in 0..100 {
        if controller.active_loops() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(controller.active_loops(), 0);
    assert!(!controller.frame_counter().record_frame());
}

#[test]
fn start_outside_runtime_is_an_error() {
    let controller = controller(flagship_telemetry());
    assert!(controller.start().is_err());
    assert!(!controller.is_running());
}

// =============================================================================
// Preferences
// =============================================================================

#[test]
fn reduced_motion_forces_low_for_every_tier() {
    let profiles = [
        (QualityTier::Low, DeviceProfile {
            memory_gib: 1.0,
            logical_cores: 1,
            ..DeviceProfile::default()
        }),
        (QualityTier::Medium, DeviceProfile::default()),
        (QualityTier::High, DeviceProfile {
            memory_gib: 16.0,
            logical_cores: 16,
            network: NetworkClass::Cellular4g,
            ..DeviceProfile::default()
        }),
    ];

    for (tier, profile) in profiles {
        for reduced in [false, true] {
            let c = MotionController::from_profile(profile.clone(), &ConfigFile::default());
            c.notify(PreferenceEvent::ReducedMotion(reduced));

            let expected = if reduced { QualityTier::Low } else { tier };
            assert_eq!(c.effective_tier(), expected);
            if reduced {
                let factor = ConfigFile::default().motion.factor(tier);
                assert_eq!(c.scaled_duration(0.5), 0.5 * factor * 0.1);
                assert_eq!(c.scaled_stagger(0.5), 0.0);
                assert_eq!(c.time_scale(), 0.1);
            }
        }
    }
}

#[test]
fn battery_recovery_restores_original_classification() {
    let c = controller(flagship_telemetry());
    c.observe_fps(18.0);
    c.notify(PreferenceEvent::Battery(BatteryReading::new(0.12, false)));
    assert!(c.snapshot().battery_constrained);

    // Charging but still inside the band.
    c.notify(PreferenceEvent::Battery(BatteryReading::new(0.45, true)));
    assert_eq!(c.effective_tier(), QualityTier::Low);

    c.notify(PreferenceEvent::Battery(BatteryReading::new(0.60, true)));
    assert_eq!(c.effective_tier(), QualityTier::High);
    assert_eq!(c.snapshot().reason, TierReason::BatteryRecovered);
}

#[tokio::test]
async fn subscribers_see_effective_tier_changes() {
    let c = controller(flagship_telemetry());
    let mut rx = c.subscribe();

    c.notify(PreferenceEvent::ReducedMotion(true));
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), QualityTier::Low);

    c.notify(PreferenceEvent::ReducedMotion(false));
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), QualityTier::High);
}

#[test]
fn unknown_feature_names_fail_closed() {
    let c = controller(flagship_telemetry());
    assert!(c.allow_named("particles"));
    assert!(!c.allow_named("hologram"));
}
