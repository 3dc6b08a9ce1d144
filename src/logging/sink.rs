//! Output destinations for log records.
//!
//! The record formatter hands each destination one complete line per
//! `write_all`. With a log file configured, the file writer is teed into the
//! console writer so both receive the same bytes, file first.

use crate::error::LogError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const STDERR: &str = "stderr";
const CONSOLE: &str = "console";

/// What a logger keeps of its destinations after the writer has been handed
/// to the formatter: their names, and the file so it can be flushed.
#[derive(Debug, Clone)]
pub struct Sinks {
    names: Arc<[String]>,
    file: Option<Arc<File>>,
}

impl Sinks {
    /// Open the destinations and build the writer that feeds them.
    ///
    /// `console` replaces stderr when given. Fails if `file` cannot be opened
    /// for appending.
    pub(crate) fn open(
        file: Option<&Path>,
        console: Option<BoxMakeWriter>,
    ) -> Result<(Self, BoxMakeWriter), LogError> {
        let console_name = if console.is_some() { CONSOLE } else { STDERR };
        let console = console.unwrap_or_else(|| BoxMakeWriter::new(io::stderr));

        let Some(path) = file else {
            let sinks = Self {
                names: vec![console_name.to_string()].into(),
                file: None,
            };
            return Ok((sinks, console));
        };

        let file = Arc::new(open_append(path)?);
        let writer = BoxMakeWriter::new(Arc::clone(&file).and(console));
        let sinks = Self {
            names: vec![path.display().to_string(), console_name.to_string()].into(),
            file: Some(file),
        };
        Ok((sinks, writer))
    }

    pub fn names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Push buffered output to its destination. Failures are reported, never
    /// raised.
    pub fn flush(&self) {
        if let Some(file) = &self.file
            && let Err(e) = file.sync_data()
        {
            warn!(sink = %self.names[0], error = %e, "log file flush failed");
        }
        if let Err(e) = io::stderr().flush() {
            warn!(sink = STDERR, error = %e, "stderr flush failed");
        }
    }
}

/// Open `path` for appending, creating it if needed.
fn open_append(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::SinkOpen {
            path: path.to_path_buf(),
            source,
        })
}

/// Cloneable in-memory writer; every clone appends to the same buffer.
///
/// Handy as a console replacement when asserting on logger output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Non-empty lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::TempDir;

    fn write_line(writer: &BoxMakeWriter, line: &str) {
        writer.make_writer().write_all(line.as_bytes()).unwrap();
    }

    #[test]
    fn test_file_is_appended_and_teed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.log");
        std::fs::write(&path, "existing\n").unwrap();
        let console = SharedBuffer::new();

        let (sinks, writer) =
            Sinks::open(Some(path.as_path()), Some(BoxMakeWriter::new(console.clone()))).unwrap();
        write_line(&writer, "new\n");
        sinks.flush();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing\nnew\n");
        assert_eq!(console.contents(), "new\n");
        assert_eq!(sinks.names(), vec![path.display().to_string().as_str(), "console"]);
    }

    #[test]
    fn test_console_only() {
        let (sinks, _) = Sinks::open(None, None).unwrap();
        assert_eq!(sinks.names(), vec!["stderr"]);
    }

    #[test]
    fn test_open_failure_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("app.log");

        let err = Sinks::open(Some(path.as_path()), None).unwrap_err();
        match err {
            LogError::SinkOpen { path: p, .. } => assert_eq!(p, path),
        }
    }

    #[test]
    fn test_concurrent_writes_do_not_interleave() {
        let buffer = SharedBuffer::new();
        let (_, writer) = Sinks::open(None, Some(BoxMakeWriter::new(buffer.clone()))).unwrap();
        let writer = Arc::new(writer);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let writer = Arc::clone(&writer);
                thread::spawn(move || {
                    let line = format!("{}\n", i.to_string().repeat(256));
                    for _ in 0..50 {
                        write_line(&writer, &line);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 400);
        for line in lines {
            let first = line.chars().next().unwrap();
            assert!(line.chars().all(|c| c == first), "torn line: {line}");
        }
    }
}
