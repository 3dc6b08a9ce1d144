//! Log record layout.
//!
//! Application records travel through `tracing` as events on two targets and
//! are written by [`RecordFormat`], a `tracing-subscriber` event formatter
//! producing one JSON object per line. Key order is fixed: `level`, `time`,
//! `logger`, `caller`, `msg`, context fields, `stacktrace`.

use super::field::Field;
use chrono::Local;
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field as EventField, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

pub const LEVEL_KEY: &str = "level";
pub const TIME_KEY: &str = "time";
pub const NAME_KEY: &str = "logger";
pub const CALLER_KEY: &str = "caller";
pub const MESSAGE_KEY: &str = "msg";
pub const STACKTRACE_KEY: &str = "stacktrace";

const RESERVED_KEYS: [&str; 6] = [
    LEVEL_KEY,
    TIME_KEY,
    NAME_KEY,
    CALLER_KEY,
    MESSAGE_KEY,
    STACKTRACE_KEY,
];

/// ISO-8601 with milliseconds and numeric offset, e.g. `2024-05-01T12:00:00.000+0000`.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Target of records gated by the logger's threshold.
pub const EVENT_TARGET: &str = "service_bootstrap::record";

/// Target of fatal records; every threshold lets it through.
pub const FATAL_TARGET: &str = "service_bootstrap::fatal";

// Event field names, as written by `record_event!`.
const SEVERITY_FIELD: &str = "severity";
const LOGGER_FIELD: &str = "logger";
const CALLER_FIELD: &str = "caller";
const CONTEXT_FIELD: &str = "context";
const STACKTRACE_FIELD: &str = "stacktrace";
const MESSAGE_FIELD: &str = "message";

/// Emit one record to the current dispatcher.
///
/// `target` and `level` must be constants; the remaining arguments are the
/// severity name, optional logger name, caller and stack trace, the
/// [`Context`] and the message.
macro_rules! record_event {
    ($target:expr, $level:expr, $severity:expr, $logger:expr, $caller:expr, $context:expr, $stacktrace:expr, $message:expr) => {
        ::tracing::event!(
            target: $target,
            $level,
            severity = $severity,
            logger = $logger,
            caller = $caller,
            context = %$context,
            stacktrace = $stacktrace,
            "{}",
            $message
        )
    };
}
pub(crate) use record_event;

/// Context fields rendered as one JSON object so they can ride on a single
/// event field.
pub struct Context<'a>(pub &'a [Field]);

impl fmt::Display for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let object: Map<String, Value> = self
            .0
            .iter()
            .map(|field| (field.key.clone(), field.value.clone()))
            .collect();
        write!(f, "{}", Value::Object(object))
    }
}

/// Event formatter writing records as JSON lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFormat;

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut parts = RecordParts::default();
        event.record(&mut parts);
        if parts.severity.is_none() {
            parts.severity = Some(event.metadata().level().to_string().to_ascii_lowercase());
        }
        let time = Local::now().format(TIME_FORMAT).to_string();
        writeln!(writer, "{}", Value::Object(parts.into_json(time)))
    }
}

/// Record pieces collected from an event's fields.
#[derive(Debug, Default)]
struct RecordParts {
    severity: Option<String>,
    logger: Option<String>,
    caller: Option<String>,
    message: String,
    context: Map<String, Value>,
    stacktrace: Option<String>,
}

impl RecordParts {
    fn into_json(self, time: String) -> Map<String, Value> {
        let mut obj = Map::new();
        obj.insert(LEVEL_KEY.into(), Value::from(self.severity.unwrap_or_default()));
        obj.insert(TIME_KEY.into(), Value::from(time));
        if let Some(name) = self.logger {
            obj.insert(NAME_KEY.into(), Value::from(name));
        }
        if let Some(caller) = self.caller {
            obj.insert(CALLER_KEY.into(), Value::from(caller));
        }
        obj.insert(MESSAGE_KEY.into(), Value::from(self.message));
        for (key, value) in self.context {
            let key = if RESERVED_KEYS.contains(&key.as_str()) {
                format!("field.{key}")
            } else {
                key
            };
            obj.insert(key, value);
        }
        if let Some(trace) = self.stacktrace {
            obj.insert(STACKTRACE_KEY.into(), Value::from(trace));
        }
        obj
    }
}

impl Visit for RecordParts {
    fn record_str(&mut self, field: &EventField, value: &str) {
        let slot = match field.name() {
            SEVERITY_FIELD => &mut self.severity,
            LOGGER_FIELD => &mut self.logger,
            CALLER_FIELD => &mut self.caller,
            STACKTRACE_FIELD => &mut self.stacktrace,
            _ => return self.record_debug(field, &value),
        };
        *slot = Some(value.to_string());
    }

    fn record_debug(&mut self, field: &EventField, value: &dyn fmt::Debug) {
        match field.name() {
            MESSAGE_FIELD => self.message = format!("{value:?}"),
            CONTEXT_FIELD => {
                if let Ok(Value::Object(context)) = serde_json::from_str(&format!("{value:?}")) {
                    self.context = context;
                }
            }
            _ => {}
        }
    }
}
