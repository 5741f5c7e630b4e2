//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init` for locating,
//! viewing and creating the configuration file.

use std::path::Path;

use clap::Subcommand;
use motionlayer::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Print the effective configuration, defaults included
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            print!("{}", ConfigFile::load_from(&path)?.to_ini_string());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let written = init_at(&path, force)?;
            if written {
                println!("Created {}", path.display());
            } else {
                println!("Configuration already exists at {}", path.display());
                println!("Use --force to overwrite it with defaults.");
            }
            Ok(())
        }
    }
}

/// Write defaults to `path`. Returns false when a file exists and `force`
/// is not set.
fn init_at(path: &Path, force: bool) -> Result<bool, CliError> {
    if path.exists() && !force {
        return Ok(false);
    }
    ConfigFile::default().save_to(path)?;
    Ok(true)
}
