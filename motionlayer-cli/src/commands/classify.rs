//! Classify command - score a device described on the command line.

use motionlayer::classify::score;
use motionlayer::profile::DeviceProfile;

use super::common::{ClassificationReport, ProfileArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the classify command.
///
/// Unspecified signals take the same defaults as a device that reports
/// nothing, so the result does not depend on the host.
pub fn run(runner: &CliRunner, args: &ProfileArgs, json: bool) -> Result<(), CliError> {
    runner.log_startup("classify");

    let profile = args.apply(DeviceProfile::default())?;
    let score = score(&profile);
    ClassificationReport {
        profile: &profile,
        tier: score.tier(),
        score,
    }
    .print(json)
}
