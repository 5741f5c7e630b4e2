//! Run command - live monitor against a synthetic frame loop.
//!
//! Renders "frames" at a fixed rate into the controller's frame counter
//! with the host's real telemetry attached, printing the tier once a second.
//! Useful for checking thresholds and intervals before wiring the library
//! into an application.

use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Highest synthetic frame rate accepted.
const MAX_TARGET_FPS: f64 = 1_000.0;

/// Run the live command.
pub fn run(runner: &CliRunner, target_fps: f64, seconds: u64) -> Result<(), CliError> {
    runner.log_startup("run");

    if !(target_fps.is_finite() && target_fps > 0.0 && target_fps <= MAX_TARGET_FPS) {
        return Err(CliError::InvalidArgument(format!(
            "--target-fps must be between 0 and {}, got {}",
            MAX_TARGET_FPS, target_fps
        )));
    }
    if seconds == 0 {
        return Err(CliError::InvalidArgument(
            "--seconds must be at least 1".to_string(),
        ));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let controller = runner.host_controller();

    runtime.block_on(async {
        controller.start()?;
        info!(target_fps, seconds, "Synthetic frame loop started");

        let counter = controller.frame_counter();
        let mut frames = interval(Duration::from_secs_f64(1.0 / target_fps));
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut report = interval(Duration::from_secs(1));
        report.tick().await;

        let deadline = Instant::now() + Duration::from_secs(seconds);
        let mut elapsed = 0u64;

        loop {
            tokio::select! {
                biased;

                _ = tokio::time::sleep_until(deadline) => break,

                _ = report.tick() => {
                    elapsed += 1;
                    let snapshot = controller.snapshot();
                    let readings = controller.diagnostics();
                    println!(
                        "[{:>3}s] tier {:<6} effective {:<6} fps {:>6} heap {:>5}",
                        elapsed,
                        snapshot.tier,
                        snapshot.effective_tier(),
                        readings
                            .last_fps
                            .map(|f| format!("{:.1}", f))
                            .unwrap_or_else(|| "-".to_string()),
                        readings
                            .last_heap_utilization
                            .map(|h| format!("{:.0}%", h * 100.0))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }

                _ = frames.tick() => {
                    counter.record_frame();
                }
            }
        }

        controller.stop();
        Ok::<(), CliError>(())
    })?;

    println!();
    println!("{}", controller.diagnostics());
    Ok(())
}
