//! Probe command - capability profile and tier of this host.

use motionlayer::classify::score;

use super::common::ClassificationReport;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the probe command.
pub fn run(runner: &CliRunner, json: bool) -> Result<(), CliError> {
    runner.log_startup("probe");

    let profile = runner.probe_host();
    let score = score(&profile);
    ClassificationReport {
        profile: &profile,
        tier: score.tier(),
        score,
    }
    .print(json)
}
