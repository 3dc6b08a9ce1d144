//! CLI definition for the bootstrap binary.

use clap::Parser;
use std::path::PathBuf;

/// Resolve service configuration and start structured logging
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory searched for config.{yaml,yml,json,toml} before the working directory
    #[arg(short = 'c', long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Enable verbose bootstrap diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip loading a .env file
    #[arg(long)]
    pub no_dotenv: bool,
}
