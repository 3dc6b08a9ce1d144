//! Logger construction.
//!
//! Each logger gets its own `tracing` dispatcher: a registry with a
//! [`Targets`] filter for the threshold and a `fmt` layer that writes records
//! through [`RecordFormat`] to the sinks.

use super::level::Level;
use super::logger::StructuredLogger;
use super::record::{FATAL_TARGET, RecordFormat};
use super::sink::Sinks;
use super::terminate::{ProcessExit, Terminator};
use crate::config::LoggingSettings;
use crate::error::LogError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Dispatch;
use tracing::debug;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;

/// Builder for [`StructuredLogger`].
///
/// Defaults: stderr console, no file, real process exit on fatal.
pub struct LoggerBuilder {
    level: Level,
    output_path: Option<PathBuf>,
    console: Option<BoxMakeWriter>,
    terminator: Arc<dyn Terminator>,
    name: Option<String>,
}

impl LoggerBuilder {
    /// Start from a level name; unrecognized names mean `info`.
    pub fn new(level_name: &str) -> Self {
        Self {
            level: Level::from_name(level_name),
            output_path: None,
            console: None,
            terminator: Arc::new(ProcessExit),
            name: None,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Also write to this file. An empty path means console only.
    pub fn output_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.output_path = (!path.as_os_str().is_empty()).then(|| path.to_path_buf());
        self
    }

    /// Replace stderr as the console sink.
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = Some(BoxMakeWriter::new(writer));
        self
    }

    pub fn terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Open sinks and build the logger.
    ///
    /// Fails if the output file cannot be opened; there is no fallback to
    /// console-only output.
    pub fn build(self) -> Result<StructuredLogger, LogError> {
        let (sinks, writer) = Sinks::open(self.output_path.as_deref(), self.console)?;

        debug!(level = %self.level, sinks = ?sinks.names(), "logger created");

        let dispatch = record_dispatch(self.level, writer);
        let logger = StructuredLogger::new(self.level, dispatch, sinks, self.terminator);
        Ok(match &self.name {
            Some(name) => logger.with_name(name),
            None => logger,
        })
    }
}

/// Dispatcher gating records at `level` and writing the survivors to `writer`.
fn record_dispatch(level: Level, writer: BoxMakeWriter) -> Dispatch {
    let filter = Targets::new()
        .with_default(level.filter())
        .with_target(FATAL_TARGET, LevelFilter::ERROR);
    let layer = tracing_subscriber::fmt::layer()
        .event_format(RecordFormat)
        .with_writer(writer);
    Dispatch::new(tracing_subscriber::registry().with(filter).with(layer))
}

/// Create a logger at `level_name` writing to stderr and, when
/// `output_path` is non-empty, appending to that file as well.
pub fn create(level_name: &str, output_path: &str) -> Result<StructuredLogger, LogError> {
    LoggerBuilder::new(level_name).output_path(output_path).build()
}

/// Create a logger from resolved logging settings.
pub fn from_settings(settings: &LoggingSettings) -> Result<StructuredLogger, LogError> {
    create(&settings.level, &settings.file)
}
