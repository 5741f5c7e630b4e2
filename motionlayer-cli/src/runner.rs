//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and controller
//! construction to reduce duplication across command handlers.

use std::sync::Arc;

use motionlayer::config::ConfigFile;
use motionlayer::logging::{init_logging, split_log_path, LoggingGuard};
use motionlayer::profile::{CapabilityProber, DeviceProfile, HostTelemetry, PlatformTelemetry};
use motionlayer::MotionController;
use tracing::info;

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Mirror log output to stdout
    /// * `debug_mode` - Default to debug-level logging when RUST_LOG is not set
    pub fn new(verbose: bool, debug_mode: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(&log_dir, &log_file, verbose, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("MotionLayer v{}", motionlayer::VERSION);
        info!("MotionLayer CLI: {} command", command);
    }

    /// Telemetry for this host, with the config `[device]` overrides applied.
    pub fn host_telemetry(&self) -> Arc<dyn PlatformTelemetry> {
        Arc::new(HostTelemetry::new().with_overrides(self.config.device.clone()))
    }

    /// Probe this host.
    pub fn probe_host(&self) -> DeviceProfile {
        CapabilityProber::new(self.host_telemetry()).probe()
    }

    /// A controller over this host's telemetry.
    pub fn host_controller(&self) -> MotionController {
        MotionController::new(&self.config, self.host_telemetry())
    }
}
