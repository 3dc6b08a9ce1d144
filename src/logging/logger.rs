//! The logger capability and its structured implementation.

use super::field::{Field, merge_fields};
use super::level::Level;
use super::record::{Context, EVENT_TARGET, FATAL_TARGET, record_event};
use super::sink::Sinks;
use super::terminate::Terminator;
use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::Arc;
use tracing::{Dispatch, dispatcher};

/// Shared handle to any logger implementation.
pub type SharedLogger = Arc<dyn Logger>;

/// Leveled, structured logging.
///
/// Implementations are immutable: `with` and `named` derive new loggers and
/// leave the receiver untouched. The per-level methods pass their call site
/// along so error records can report where they were logged from.
pub trait Logger: Send + Sync {
    /// Whether a record at `level` would be emitted.
    fn enabled(&self, level: Level) -> bool;

    /// Emit a record at `level` if it passes the threshold.
    fn log_at(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    );

    /// Emit a fatal record regardless of threshold, flush, then terminate.
    fn fatal_at(&self, message: &str, fields: &[Field], caller: &'static Location<'static>);

    /// Derive a logger carrying these fields in addition to the current ones.
    fn with(&self, fields: &[Field]) -> SharedLogger;

    /// Derive a logger with `name` appended to the current name.
    fn named(&self, name: &str) -> SharedLogger;

    #[track_caller]
    fn debug(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Debug, message, fields, Location::caller());
    }

    #[track_caller]
    fn info(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Info, message, fields, Location::caller());
    }

    #[track_caller]
    fn warn(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Warn, message, fields, Location::caller());
    }

    #[track_caller]
    fn error(&self, message: &str, fields: &[Field]) {
        self.log_at(Level::Error, message, fields, Location::caller());
    }

    #[track_caller]
    fn fatal(&self, message: &str, fields: &[Field]) {
        self.fatal_at(message, fields, Location::caller());
    }
}

/// JSON-lines logger with its own `tracing` dispatcher.
///
/// The dispatcher holds the threshold filter and the record formatter writing
/// to every sink. Clones share dispatcher, sinks and terminator; fields and
/// name are owned per instance.
#[derive(Clone)]
pub struct StructuredLogger {
    level: Level,
    name: Option<String>,
    fields: Vec<Field>,
    dispatch: Dispatch,
    sinks: Sinks,
    terminator: Arc<dyn Terminator>,
}

impl StructuredLogger {
    pub(crate) fn new(
        level: Level,
        dispatch: Dispatch,
        sinks: Sinks,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self {
            level,
            name: None,
            fields: Vec::new(),
            dispatch,
            sinks,
            terminator,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.names()
    }

    /// Concrete form of [`Logger::with`].
    pub fn with_fields(&self, fields: &[Field]) -> Self {
        Self {
            fields: merge_fields(&self.fields, fields),
            ..self.clone()
        }
    }

    /// Concrete form of [`Logger::named`]; names nest with `.`.
    pub fn with_name(&self, name: &str) -> Self {
        Self {
            name: nested_name(self.name.as_deref(), name),
            ..self.clone()
        }
    }

    pub fn flush(&self) {
        self.sinks.flush();
    }

    fn emit(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        let fields = merge_fields(&self.fields, fields);
        let context = Context(&fields);
        let logger = self.name.as_deref();
        let severity = level.as_str();
        let (caller, stacktrace) = if level.captures_trace() {
            (
                Some(format!("{}:{}", caller.file(), caller.line())),
                Some(Backtrace::force_capture().to_string()),
            )
        } else {
            (None, None)
        };
        let caller = caller.as_deref();
        let stacktrace = stacktrace.as_deref();

        dispatcher::with_default(&self.dispatch, || match level {
            Level::Debug => record_event!(
                EVENT_TARGET, tracing::Level::DEBUG, severity, logger, caller, context, stacktrace, message
            ),
            Level::Info => record_event!(
                EVENT_TARGET, tracing::Level::INFO, severity, logger, caller, context, stacktrace, message
            ),
            Level::Warn => record_event!(
                EVENT_TARGET, tracing::Level::WARN, severity, logger, caller, context, stacktrace, message
            ),
            Level::Error => record_event!(
                EVENT_TARGET, tracing::Level::ERROR, severity, logger, caller, context, stacktrace, message
            ),
            Level::Fatal => record_event!(
                FATAL_TARGET, tracing::Level::ERROR, severity, logger, caller, context, stacktrace, message
            ),
        });
    }
}

/// `parent.name`, or whichever of the two is non-empty.
pub(crate) fn nested_name(parent: Option<&str>, name: &str) -> Option<String> {
    let name = match parent {
        Some(parent) if !name.is_empty() => format!("{parent}.{name}"),
        Some(parent) => parent.to_string(),
        None => name.to_string(),
    };
    (!name.is_empty()).then_some(name)
}

impl Logger for StructuredLogger {
    /// Asks the logger's dispatcher, so the answer is the filter's.
    fn enabled(&self, level: Level) -> bool {
        dispatcher::with_default(&self.dispatch, || match level {
            Level::Debug => tracing::enabled!(target: EVENT_TARGET, tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(target: EVENT_TARGET, tracing::Level::INFO),
            Level::Warn => tracing::enabled!(target: EVENT_TARGET, tracing::Level::WARN),
            Level::Error => tracing::enabled!(target: EVENT_TARGET, tracing::Level::ERROR),
            Level::Fatal => tracing::enabled!(target: FATAL_TARGET, tracing::Level::ERROR),
        })
    }

    fn log_at(
        &self,
        level: Level,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) {
        // Skips the stack trace capture for filtered error records
        if self.enabled(level) {
            self.emit(level, message, fields, caller);
        }
    }

    fn fatal_at(&self, message: &str, fields: &[Field], caller: &'static Location<'static>) {
        self.emit(Level::Fatal, message, fields, caller);
        self.flush();
        self.terminator.terminate(1);
    }

    fn with(&self, fields: &[Field]) -> SharedLogger {
        Arc::new(self.with_fields(fields))
    }

    fn named(&self, name: &str) -> SharedLogger {
        Arc::new(self.with_name(name))
    }
}

impl std::fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("level", &self.level)
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("sinks", &self.sinks)
            .finish()
    }
}
