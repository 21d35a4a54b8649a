//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_CONFIG_PATH, DEFAULT_MODE};

/// Continuously cycle the hue of an Elgato light.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, env = "HUE_CYCLER_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
    /// Mode declared under `modes` in the configuration.
    #[arg(long, default_value = DEFAULT_MODE)]
    pub mode: String,
    /// Log every fetched light state, in addition to the config's `verbose` key.
    #[arg(short, long)]
    pub verbose: bool,
}
