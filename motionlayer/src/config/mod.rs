//! Operator configuration for the motion controller.
//!
//! Configuration lives in `~/.motionlayer/config.ini`. Every key is optional;
//! missing keys fall back to the `DEFAULT_*` constants in [`defaults`].
//!
//! # Example
//!
//! ```
//! use motionlayer::config::ConfigFile;
//! use motionlayer::QualityTier;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.motion.factor(QualityTier::Medium), 0.75);
//! assert_eq!(config.motion.easing(QualityTier::High), "expo.out");
//! ```

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    BatterySettings, ConfigFile, DeviceSettings, LoggingSettings, MonitorSettings,
    MotionSettings,
};
