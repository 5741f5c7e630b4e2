//! Simulate command - replay an FPS and heap trace through the controller.
//!
//! FPS samples land at the end of each FPS window and heap samples at the
//! end of each memory interval, using the configured durations. Where both
//! fall on the same instant the FPS sample goes first, matching the order
//! the live loops are started in.

use std::time::Duration;

use motionlayer::config::MonitorSettings;
use motionlayer::diagnostics::Diagnostics;
use motionlayer::state::TierTransition;
use motionlayer::{MotionController, PreferenceEvent, QualityTier};
use serde::Serialize;
use tracing::info;

use super::common::ProfileArgs;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the simulate command.
#[derive(Debug)]
pub struct SimulateArgs {
    pub fps: Vec<f64>,
    pub heap: Vec<f64>,
    pub reduced_motion: bool,
    pub profile: ProfileArgs,
    pub json: bool,
}

/// Kind of a replayed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Fps,
    Heap,
}

/// A sample scheduled on the simulated timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledSample {
    pub at: Duration,
    pub kind: SampleKind,
    pub value: f64,
}

/// Outcome of one replayed sample.
#[derive(Debug, Serialize)]
pub struct Step {
    pub at_secs: f64,
    pub kind: SampleKind,
    pub value: f64,
    pub transition: Option<TierTransition>,
    pub effective_tier: QualityTier,
}

#[derive(Serialize)]
struct SimulationReport {
    steps: Vec<Step>,
    result: Diagnostics,
}

/// Run the simulate command.
pub fn run(runner: &CliRunner, args: SimulateArgs) -> Result<(), CliError> {
    runner.log_startup("simulate");
    validate(&args)?;

    if args.profile.is_empty() {
        info!("Simulating with this host's profile");
    }
    let profile = args.profile.apply(runner.probe_host())?;
    let controller = MotionController::from_profile(profile, runner.config());
    if args.reduced_motion {
        controller.notify(PreferenceEvent::ReducedMotion(true));
    }

    let schedule = schedule(&args.fps, &args.heap, &runner.config().monitor);
    let steps = replay(&controller, &schedule);
    let result = controller.diagnostics();

    if args.json {
        let report = SimulationReport { steps, result };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Initial tier: {} (score {})",
        controller.score().tier(),
        controller.score().total()
    );
    for step in &steps {
        if let Some(t) = &step.transition {
            println!(
                "  t={:>6.1}s  {:<4} {:>6.2}  {} -> {} ({})",
                step.at_secs,
                match step.kind {
                    SampleKind::Fps => "fps",
                    SampleKind::Heap => "heap",
                },
                step.value,
                t.from,
                t.to,
                t.reason
            );
        }
    }
    println!();
    println!("{}", result);
    println!("Scaled 1.0s duration: {:.3}s", controller.scaled_duration(1.0));
    Ok(())
}

fn validate(args: &SimulateArgs) -> Result<(), CliError> {
    if let Some(bad) = args.fps.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
        return Err(CliError::InvalidArgument(format!(
            "--fps samples must be non-negative, got {}",
            bad
        )));
    }
    if let Some(bad) = args
        .heap
        .iter()
        .find(|v| !(v.is_finite() && (0.0..=1.0).contains(*v)))
    {
        return Err(CliError::InvalidArgument(format!(
            "--heap samples must be between 0.0 and 1.0, got {}",
            bad
        )));
    }
    Ok(())
}

/// Lay the samples out on one timeline.
pub fn schedule(fps: &[f64], heap: &[f64], settings: &MonitorSettings) -> Vec<ScheduledSample> {
    let fps_samples = fps.iter().enumerate().map(|(i, &value)| ScheduledSample {
        at: settings.fps_window * (i as u32 + 1),
        kind: SampleKind::Fps,
        value,
    });
    let heap_samples = heap.iter().enumerate().map(|(i, &value)| ScheduledSample {
        at: settings.memory_interval * (i as u32 + 1),
        kind: SampleKind::Heap,
        value,
    });

    let mut schedule: Vec<_> = fps_samples.chain(heap_samples).collect();
    // Stable sort keeps FPS ahead of heap on ties.
    schedule.sort_by_key(|s| s.at);
    schedule
}

/// Feed each scheduled sample to the controller.
pub fn replay(controller: &MotionController, schedule: &[ScheduledSample]) -> Vec<Step> {
    schedule
        .iter()
        .map(|sample| {
            let transition = match sample.kind {
                SampleKind::Fps => controller.observe_fps(sample.value),
                SampleKind::Heap => controller.observe_heap(sample.value),
            };
            Step {
                at_secs: sample.at.as_secs_f64(),
                kind: sample.kind,
                value: sample.value,
                transition,
                effective_tier: controller.effective_tier(),
            }
        })
        .collect()
}
