//! MotionLayer - adaptive animation performance controller
//!
//! This library decides how much motion an application should perform. It
//! profiles the device once, classifies it into a [`QualityTier`], then keeps
//! the tier current from live frame-rate, heap and preference signals.
//! Every animation call-site asks the [`MotionController`] per effect:
//!
//! ```
//! use motionlayer::config::ConfigFile;
//! use motionlayer::profile::DeviceProfile;
//! use motionlayer::{Feature, MotionController, QualityTier};
//!
//! let controller = MotionController::from_profile(DeviceProfile::default(), &ConfigFile::default());
//!
//! assert_eq!(controller.effective_tier(), QualityTier::Medium);
//! let duration = controller.scaled_duration(0.8);
//! let parallax = controller.allow(Feature::Parallax);
//! let easing = controller.easing_curve();
//! # let _ = (duration, parallax, easing);
//! ```
//!
//! Inside a tokio runtime, [`MotionController::start`] launches the live
//! performance monitor; the host reports frames through
//! [`MotionController::frame_counter`].

pub mod classify;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod logging;
pub mod monitor;
pub mod profile;
pub mod query;
pub mod state;
pub mod tier;
pub mod watcher;

pub use controller::MotionController;
pub use tier::{Feature, QualityTier, TierReason};
pub use watcher::PreferenceEvent;

/// Version of the MotionLayer library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
