//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`classify`] - Classify a described device
//! - [`config`] - Configuration management (path, show, init)
//! - [`diagnostics`] - Controller report for bug reports
//! - [`probe`] - Probe this host
//! - [`run`] - Live monitor against a synthetic frame loop
//! - [`simulate`] - Replay an FPS and heap trace

pub mod classify;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod probe;
pub mod run;
pub mod simulate;
