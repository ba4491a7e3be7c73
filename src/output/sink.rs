//! Line-oriented output sinks
//!
//! Workers share one sink. Every line is written under a lock so lines from
//! different workers never interleave mid-line.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

/// Destination for finding lines
pub trait LogSink: Send + Sync {
    /// Writes one complete line (without trailing newline)
    fn write_line(&self, line: &str);
}

/// Prints findings to stdout and mirrors them to an append-only log file
#[derive(Debug)]
pub struct ConsoleSink {
    file: Option<Mutex<File>>,
    echo: bool,
}

impl ConsoleSink {
    /// Creates a sink that only prints to stdout
    pub fn stdout() -> Self {
        Self {
            file: None,
            echo: true,
        }
    }

    /// Creates a sink that prints to stdout and appends to `path`
    ///
    /// The file is created if missing; existing content is kept.
    pub fn with_log_file(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(Mutex::new(file)),
            echo: true,
        })
    }

    /// Stops echoing to stdout; the log file still receives every line
    pub fn silent(mut self) -> Self {
        self.echo = false;
        self
    }
}

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        if self.echo {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let _ = writeln!(handle, "{}", line);
        }

        if let Some(file) = &self.file {
            let timestamp = chrono::Local::now().format("%Y/%m/%d %H:%M:%S");
            let mut file = file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Err(e) = writeln!(file, "{} {}", timestamp, line) {
                tracing::warn!("Failed to write to log file: {}", e);
            }
        }
    }
}

/// Collects lines in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the lines that contain `needle`
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
    }
}
