//! Structured request logging.
//!
//! # Responsibilities
//! - Serialize (severity, event, request context, message) into one record
//! - Fan each record out to every configured sink
//!
//! # Design Decisions
//! - One JSON object per line, keys in a fixed order:
//!   `level`, `event`, `http.method`, `http.url`, `user.ip`, `message`
//! - Emission never fails for the caller; a sink that cannot write is
//!   reported through `tracing` and the remaining sinks still receive the record
//! - The console sink rides on the process `tracing` subscriber
//! - No buffering: a record is written as soon as it is emitted

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use serde::Serialize;
use thiserror::Error;

use crate::observability::context::RequestContext;

/// Target used by the console sink for request records.
pub const REQUEST_LOG_TARGET: &str = "course_catalog::requests";

/// Severity of a request log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

impl LogSeverity {
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Info => "INFO",
            LogSeverity::Warning => "WARNING",
            LogSeverity::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single request log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: LogSeverity,
    pub event: String,
    pub context: RequestContext,
    pub message: String,
}

/// Wire shape of a record. Field order here is the serialized order.
#[derive(Serialize)]
struct SerializedRecord<'a> {
    level: &'static str,
    event: &'a str,
    #[serde(rename = "http.method")]
    method: &'a str,
    #[serde(rename = "http.url")]
    url: &'a str,
    #[serde(rename = "user.ip")]
    client_address: &'a str,
    message: &'a str,
}

impl LogRecord {
    /// Serialize to a single-line JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&SerializedRecord {
            level: self.severity.label(),
            event: &self.event,
            method: &self.context.method,
            url: &self.context.url,
            client_address: &self.context.client_address,
            message: &self.message,
        })
    }
}

/// Errors a sink may report.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink lock poisoned")]
    Poisoned,
}

/// Destination for serialized request records.
pub trait LogSink: Send + Sync {
    /// Name used in diagnostics when the sink fails.
    fn name(&self) -> &str;

    /// Write one record. `line` is the serialized form of `record`.
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError>;
}

/// Emits request records to a fixed list of sinks.
pub struct LogEmitter {
    sinks: Vec<Box<dyn LogSink>>,
}

impl LogEmitter {
    pub fn new(sinks: Vec<Box<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    /// Emitter that drops everything.
    pub fn disabled() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Serialize and write one record to every sink, in order.
    pub fn emit(&self, severity: LogSeverity, event: &str, context: &RequestContext, message: &str) {
        let record = LogRecord {
            severity,
            event: event.to_string(),
            context: context.clone(),
            message: message.to_string(),
        };

        let line = match record.to_json() {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(event = %event, error = %e, "Failed to serialize request log record");
                return;
            }
        };

        for sink in &self.sinks {
            if let Err(e) = sink.write(&record, &line) {
                tracing::warn!(sink = sink.name(), event = %event, error = %e, "Log sink write failed");
            }
        }
    }
}

/// Forwards records to the process `tracing` subscriber.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        match record.severity {
            LogSeverity::Info => {
                tracing::info!(target: REQUEST_LOG_TARGET, event = %record.event, "{}", line)
            }
            LogSeverity::Warning => {
                tracing::warn!(target: REQUEST_LOG_TARGET, event = %record.event, "{}", line)
            }
            LogSeverity::Error => {
                tracing::error!(target: REQUEST_LOG_TARGET, event = %record.event, "{}", line)
            }
        }
        Ok(())
    }
}

/// Append-only JSON lines file that rotates by size.
///
/// Once the file has grown past `max_bytes`, the next record starts a fresh
/// file and the old one becomes `<path>.1`, older backups shifting up by one.
/// At most `backup_count` backups are kept. With `backup_count == 0` the file
/// is never rotated.
pub struct RotatingFileSink {
    path: PathBuf,
    file: Mutex<LogFile>,
}

enum LogFile {
    Rotating(FileRotate<AppendCount>),
    Append(File),
}

impl LogFile {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            LogFile::Rotating(file) => file as &mut dyn Write,
            LogFile::Append(file) => file as &mut dyn Write,
        }
    }
}

impl RotatingFileSink {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> Result<Self, SinkError> {
        let path = path.into();
        // Surfaces a bad path now rather than on the first record.
        let append = OpenOptions::new().create(true).append(true).open(&path)?;

        let file = if backup_count == 0 {
            LogFile::Append(append)
        } else {
            let limit = usize::try_from(max_bytes).unwrap_or(usize::MAX);
            LogFile::Rotating(FileRotate::new(
                &path,
                AppendCount::new(backup_count),
                ContentLimit::BytesSurpassed(limit),
                Compression::None,
                #[cfg(unix)]
                None,
            ))
        };

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for RotatingFileSink {
    fn name(&self) -> &str {
        "rotating-file"
    }

    fn write(&self, _record: &LogRecord, line: &str) -> Result<(), SinkError> {
        let mut file = self.file.lock().map_err(|_| SinkError::Poisoned)?;
        let writer = file.writer();

        // One buffer per record, so a rotation never splits a line.
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        writer.write_all(buf.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

/// Keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<(LogRecord, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|r| r.iter().map(|(record, _)| record.clone()).collect())
            .unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|r| r.iter().map(|(_, line)| line.clone()).collect())
            .unwrap_or_default()
    }

    /// Records with the given event name.
    pub fn events(&self, event: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.event == event)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        self.records
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push((record.clone(), line.to_string()));
        Ok(())
    }
}
