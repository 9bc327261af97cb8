//! Session exports: the human-readable event log and a JSON snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use portwatch_types::{SessionSnapshot, TransitionEvent};

use crate::error::ExportError;

/// Heading printed above the event log in on-screen summaries.
pub const SUMMARY_HEADER: &str = "Session Event Log:";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Export destination for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Write the event log, one line per transition.
    ///
    /// The file is overwritten on each export.
    Summary(PathBuf),

    /// Write the full snapshot (series and events) as pretty JSON.
    Json(PathBuf),
}

impl Output {
    /// Create a summary output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use portwatch_core::Output;
    ///
    /// let output = Output::summary("port-summary.txt");
    /// ```
    pub fn summary(path: impl Into<PathBuf>) -> Self {
        Output::Summary(path.into())
    }

    /// Create a JSON output.
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Output::Json(path.into())
    }

    pub fn path(&self) -> &Path {
        match self {
            Output::Summary(path) | Output::Json(path) => path,
        }
    }

    /// Write `snapshot` to this output.
    pub fn emit(&self, snapshot: &SessionSnapshot) -> Result<(), ExportError> {
        let contents = match self {
            Output::Summary(_) => event_log_text(&snapshot.events),
            Output::Json(_) => serde_json::to_string_pretty(snapshot)?,
        };

        fs::write(self.path(), contents).map_err(|source| ExportError::Io {
            path: self.path().to_path_buf(),
            source,
        })?;

        tracing::info!(
            path = %self.path().display(),
            events = snapshot.events.len(),
            "session exported"
        );
        Ok(())
    }
}

/// Format a Unix millisecond timestamp in local time.
pub fn format_timestamp(timestamp_ms: u64) -> String {
    format_timestamp_in(timestamp_ms, &Local)
}

/// Format a Unix millisecond timestamp in `tz`.
pub fn format_timestamp_in<Tz>(timestamp_ms: u64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(timestamp_ms as i64).earliest() {
        Some(time) => time.format(TIMESTAMP_FORMAT).to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// One summary line: `[2024-03-01 12:00:00.000] Port 80 on host went UP`.
pub fn format_event(event: &TransitionEvent) -> String {
    format_event_in(event, &Local)
}

/// Like [`format_event`], rendering the timestamp in `tz`.
pub fn format_event_in<Tz>(event: &TransitionEvent, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "[{}] Port {} on {} went {}",
        format_timestamp_in(event.timestamp_ms, tz),
        event.target.port,
        event.target.host,
        event.state.label()
    )
}

/// Newline-terminated event lines in log order.
pub fn event_log_text(events: &[TransitionEvent]) -> String {
    events
        .iter()
        .map(|event| format_event(event) + "\n")
        .collect()
}

/// The on-screen summary: a header, a blank line, then the event log.
pub fn summary_text(snapshot: &SessionSnapshot) -> String {
    format!("{SUMMARY_HEADER}\n\n{}", event_log_text(&snapshot.events))
}
