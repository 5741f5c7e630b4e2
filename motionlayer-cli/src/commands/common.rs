//! Arguments and output helpers shared across commands.

use clap::Args;
use motionlayer::classify::ScoreBreakdown;
use motionlayer::profile::{DeviceProfile, NetworkClass};
use serde::Serialize;

use crate::error::CliError;

/// Device signals that can be given on the command line.
///
/// Every field is optional; unset fields keep the value of the base profile.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileArgs {
    /// Device memory in GiB
    #[arg(long)]
    pub memory: Option<f64>,

    /// Logical CPU cores
    #[arg(long)]
    pub cores: Option<usize>,

    /// Network class: 2g, 3g, 4g, unknown
    #[arg(long)]
    pub network: Option<NetworkClass>,

    /// Display pixel ratio
    #[arg(long)]
    pub pixel_ratio: Option<f64>,

    /// Treat the device as handheld (touch input, narrow viewport)
    #[arg(long)]
    pub handheld: bool,
}

impl ProfileArgs {
    /// Whether any signal was given.
    pub fn is_empty(&self) -> bool {
        self.memory.is_none()
            && self.cores.is_none()
            && self.network.is_none()
            && self.pixel_ratio.is_none()
            && !self.handheld
    }

    /// Overlay the given signals onto `base`.
    pub fn apply(&self, base: DeviceProfile) -> Result<DeviceProfile, CliError> {
        let mut profile = base;
        if let Some(memory) = self.memory {
            if !(memory.is_finite() && memory > 0.0) {
                return Err(CliError::InvalidArgument(format!(
                    "--memory must be a positive number of GiB, got {}",
                    memory
                )));
            }
            profile.memory_gib = memory;
        }
        if let Some(cores) = self.cores {
            if cores == 0 {
                return Err(CliError::InvalidArgument(
                    "--cores must be at least 1".to_string(),
                ));
            }
            profile.logical_cores = cores;
        }
        if let Some(network) = self.network {
            profile.network = network;
        }
        if let Some(ratio) = self.pixel_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(CliError::InvalidArgument(format!(
                    "--pixel-ratio must be positive, got {}",
                    ratio
                )));
            }
            profile.pixel_ratio = ratio;
        }
        if self.handheld {
            profile.is_handheld = true;
        }
        Ok(profile)
    }
}

/// Profile plus its classification, as printed by `probe` and `classify`.
#[derive(Debug, Serialize)]
pub struct ClassificationReport<'a> {
    pub profile: &'a DeviceProfile,
    pub score: ScoreBreakdown,
    pub tier: motionlayer::QualityTier,
}

impl ClassificationReport<'_> {
    pub fn print(&self, json: bool) -> Result<(), CliError> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
            return Ok(());
        }

        let p = self.profile;
        println!("Device Profile");
        println!("==============");
        println!("  Memory:        {:.1} GiB", p.memory_gib);
        println!("  Logical cores: {}", p.logical_cores);
        println!("  Network:       {}", p.network);
        println!("  Pixel ratio:   {}", p.pixel_ratio);
        println!("  Handheld:      {}", if p.is_handheld { "yes" } else { "no" });
        println!();
        println!("Score: {}", self.score);
        println!("Tier:  {}", self.tier);
        Ok(())
    }
}
