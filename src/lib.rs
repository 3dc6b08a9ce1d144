//! Service bootstrap library.
//!
//! Layered configuration resolution ([`config`]) and structured multi-sink
//! logging ([`logging`]), plus the startup glue that connects them.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
