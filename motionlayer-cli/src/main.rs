//! MotionLayer CLI - Command-line interface
//!
//! This binary exposes the MotionLayer controller for inspecting a host,
//! replaying performance traces and managing configuration.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::common::ProfileArgs;
use commands::config::ConfigCommands;
use commands::simulate::SimulateArgs;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "motionlayer")]
#[command(version = motionlayer::VERSION)]
#[command(about = "Adaptive animation quality tiers for the current device", long_about = None)]
struct Cli {
    /// Mirror log output to stdout
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug-level logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe this host and show its capability profile and tier
    Probe {
        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Classify a described device without probing
    Classify {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Replay an FPS and heap trace through the controller
    Simulate {
        /// Comma-separated FPS samples, one per FPS window
        #[arg(long, value_delimiter = ',', required = true)]
        fps: Vec<f64>,

        /// Comma-separated heap utilization samples, one per memory interval
        #[arg(long, value_delimiter = ',')]
        heap: Vec<f64>,

        /// Start with the reduced-motion preference set
        #[arg(long)]
        reduced_motion: bool,

        /// Describe the simulated device (defaults to this host)
        #[command(flatten)]
        profile: ProfileArgs,

        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },

    /// Run the live monitor against a synthetic frame loop
    Run {
        /// Frames per second the synthetic loop renders
        #[arg(long, default_value = "60")]
        target_fps: f64,

        /// How long to run, in seconds
        #[arg(long, default_value = "10")]
        seconds: u64,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a controller diagnostics report for this host
    Diagnostics {
        /// Print JSON instead of a report
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let (verbose, debug) = (cli.verbose, cli.debug);
    let runner = || CliRunner::new(verbose, debug);

    let result = match cli.command {
        Commands::Probe { json } => runner().and_then(|r| commands::probe::run(&r, json)),
        Commands::Classify { profile, json } => {
            runner().and_then(|r| commands::classify::run(&r, &profile, json))
        }
        Commands::Simulate {
            fps,
            heap,
            reduced_motion,
            profile,
            json,
        } => runner().and_then(|r| {
            commands::simulate::run(
                &r,
                SimulateArgs {
                    fps,
                    heap,
                    reduced_motion,
                    profile,
                    json,
                },
            )
        }),
        Commands::Run {
            target_fps,
            seconds,
        } => runner().and_then(|r| commands::run::run(&r, target_fps, seconds)),
        Commands::Config { command } => commands::config::run(command),
        Commands::Diagnostics { json } => {
            runner().and_then(|r| commands::diagnostics::run(&r, json))
        }
    };

    if let Err(e) = result {
        e.exit();
    }
}
