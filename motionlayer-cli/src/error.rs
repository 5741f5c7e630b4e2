//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use motionlayer::config::ConfigFileError;
use motionlayer::monitor::MonitorError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Bad command-line value
    InvalidArgument(String),
    /// Failed to build the async runtime
    Runtime(std::io::Error),
    /// Performance monitor could not start
    Monitor(MonitorError),
    /// Failed to render JSON output
    Json(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Config(_) = self {
            eprintln!();
            eprintln!("Check the file shown by 'motionlayer config path', or recreate it with:");
            eprintln!("  motionlayer config init --force");
        }

        process::exit(self.exit_code())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::Config(_) => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Monitor(e) => write!(f, "Failed to start performance monitor: {}", e),
            CliError::Json(e) => write!(f, "Failed to render JSON: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Monitor(e) => Some(e),
            CliError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<MonitorError> for CliError {
    fn from(e: MonitorError) -> Self {
        CliError::Monitor(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err: CliError = ConfigFileError::InvalidValue {
            section: "battery".to_string(),
            key: "low_level".to_string(),
            value: "2".to_string(),
            reason: "must be between 0.0 and 1.0".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Configuration error: "));
        assert!(err.to_string().contains("battery.low_level"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_invalid_argument_exit_code() {
        let err = CliError::InvalidArgument("--cores must be at least 1".to_string());
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Invalid argument: --cores must be at least 1");
    }

    #[test]
    fn test_monitor_error_has_source() {
        use std::error::Error;
        let err = CliError::from(MonitorError::NoRuntime);
        assert!(err.source().is_some());
        assert_eq!(err.exit_code(), 1);
    }
}
