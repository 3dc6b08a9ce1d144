//! Process termination used by fatal logging.

use std::sync::{Mutex, PoisonError};

/// What happens after a fatal record has been written and sinks flushed.
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

/// Exits the process. The default for real loggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code);
    }
}

/// Records exit codes instead of exiting.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> usize {
        self.codes().len()
    }

    pub fn codes(&self) -> Vec<i32> {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        self.codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(code);
    }
}
