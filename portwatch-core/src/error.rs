//! Error types for the monitoring engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A port-spec entry that was skipped.
///
/// These never abort a session start: the offending entry is logged and the
/// remaining ports are monitored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortSpecError {
    /// The entry is not an integer.
    #[error("invalid port: {token:?}")]
    NotANumber { token: String },

    /// The entry is an integer outside 1-65535.
    #[error("port out of range (1-65535): {token:?}")]
    OutOfRange { token: String },

    /// The port was already requested earlier in the same spec.
    #[error("duplicate port: {port}")]
    Duplicate { port: u16 },
}

impl PortSpecError {
    /// The rejected entry as it appeared in the spec (trimmed).
    pub fn token(&self) -> String {
        match self {
            PortSpecError::NotANumber { token } | PortSpecError::OutOfRange { token } => {
                token.clone()
            }
            PortSpecError::Duplicate { port } => port.to_string(),
        }
    }
}

/// Errors returned by the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `start` was called while monitors from a previous start are live.
    #[error("a monitoring session for {host} is already running")]
    AlreadyRunning { host: String },

    /// `start` was called outside a tokio runtime.
    #[error("no tokio runtime available to spawn monitors")]
    NoRuntime,
}

/// Errors that can occur when exporting a session.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing the export file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Encoding the snapshot failed.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}
