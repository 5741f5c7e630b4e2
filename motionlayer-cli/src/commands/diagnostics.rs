//! Diagnostics command - outputs controller state for bug reports.

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the diagnostics command.
pub fn run(runner: &CliRunner, json: bool) -> Result<(), CliError> {
    runner.log_startup("diagnostics");

    let report = runner.host_controller().diagnostics();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
