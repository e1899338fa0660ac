//! Diagnostic channel for the users view.
//!
//! Every record is emitted as a tracing event, kept in memory, and, when a
//! log file is attached, appended to it as one JSON line.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub ts: DateTime<Utc>,
    pub level: Level,
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: String,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

#[derive(Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    file: Option<(PathBuf, File)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append every record to `path`
    pub fn with_log_file(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            records: Vec::new(),
            file: Some((path.to_path_buf(), file)),
        })
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(p, _)| p.as_path())
    }

    fn record(&mut self, level: Level, event_type: &str, message: String, data: serde_json::Value) {
        match level {
            Level::Info => tracing::info!(event = event_type, %data, "{}", message),
            Level::Error => tracing::error!(event = event_type, %data, "{}", message),
        }

        let diag = Diagnostic {
            ts: Utc::now(),
            level,
            event_type: event_type.to_string(),
            message,
            data,
        };

        if let Some((path, file)) = self.file.as_mut() {
            let written = serde_json::to_string(&diag)
                .map_err(anyhow::Error::from)
                .and_then(|line| {
                    writeln!(file, "{}", line)?;
                    file.flush()?;
                    Ok(())
                });
            if let Err(e) = written {
                tracing::warn!(path = %path.display(), "failed to write diagnostic: {}", e);
            }
        }

        self.records.push(diag);
    }

    pub fn fetch_started(&mut self, source: &str) {
        self.record(
            Level::Info,
            "fetch_started",
            format!("fetching users from {}", source),
            serde_json::json!({ "source": source }),
        );
    }

    pub fn fetch_ok(&mut self, count: usize, duration_ms: u64) {
        self.record(
            Level::Info,
            "fetch_ok",
            format!("fetched {} users", count),
            serde_json::json!({ "count": count, "duration_ms": duration_ms }),
        );
    }

    pub fn fetch_failed(&mut self, error: &str, duration_ms: u64) {
        self.record(
            Level::Error,
            "fetch_failed",
            format!("Error fetching data: {}", error),
            serde_json::json!({ "error": error, "duration_ms": duration_ms }),
        );
    }
}
