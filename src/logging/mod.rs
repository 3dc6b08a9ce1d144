//! Structured, leveled logging with console and file fan-out.
//!
//! A logger is built once from a level name and an optional file path:
//! - Empty path: records go to stderr only
//! - Non-empty path: every record goes to the file (append) and to stderr
//!
//! Every logger owns a `tracing` dispatcher whose filter applies the
//! threshold and whose `fmt` layer writes records as JSON lines. Loggers are
//! immutable; [`Logger::with`] and [`Logger::named`] derive new loggers
//! carrying extra context. Fatal records bypass the threshold and end the
//! process through a [`Terminator`], which tests replace with
//! [`RecordingTerminator`].

pub mod capture;
mod factory;
mod field;
mod level;
mod logger;
pub mod record;
mod sink;
mod terminate;

pub use capture::{CapturedRecord, CapturingLogger};
pub use factory::{LoggerBuilder, create, from_settings};
pub use field::{Field, merge_fields};
pub use level::{Level, ParseLevelError};
pub use logger::{Logger, SharedLogger, StructuredLogger};
pub use sink::{SharedBuffer, Sinks};
pub use terminate::{ProcessExit, RecordingTerminator, Terminator};
