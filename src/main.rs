//! Service bootstrap
//!
//! Resolves configuration, builds the application logger and reports the
//! effective settings.

use anyhow::{Context, Result};
use clap::Parser;
use service_bootstrap::bootstrap::{self, BootstrapError};
use service_bootstrap::cli::Cli;
use service_bootstrap::logging::{Field, Logger};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Bootstrap diagnostics go to stderr until the application logger exists
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if !cli.no_dotenv {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e).context("failed to load .env"),
        }
    }

    let (resolved, logger) = bootstrap::init(&cli.config_dir).map_err(|e| match e {
        BootstrapError::Config(e) => anyhow::Error::new(e).context("unable to resolve configuration"),
        BootstrapError::Log(e) => anyhow::Error::new(e).context("unable to create logger"),
    })?;

    let logger = logger.with_fields(&[Field::new("pid", std::process::id())]);
    bootstrap::report_startup(&logger, &resolved);
    logger.named("bootstrap").info("ready", &[]);
    logger.flush();

    Ok(())
}
