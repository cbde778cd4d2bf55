//! Store error type

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a store operation.
///
/// Every variant except `Encode` carries the path it was working on so the
/// request boundary can log it without leaking it to clients.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data directory could not be created.
    #[error("failed to create data directory {}: {source}", path.display())]
    Init { path: PathBuf, source: io::Error },

    /// The backing file does not exist yet.
    #[error("no results file at {}", path.display())]
    NotFound { path: PathBuf },

    /// The backing file exists but is not a JSON array of objects.
    #[error("results file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The backing file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The updated collection could not be written; the file is unchanged.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode results: {source}")]
    Encode { source: serde_json::Error },
}

impl StoreError {
    /// Short name of the step that failed, for log lines.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::NotFound { .. } | Self::Read { .. } | Self::Corrupt { .. } => "read",
            Self::Write { .. } => "write",
            Self::Encode { .. } => "encode",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Path involved in the failure, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Init { path, .. }
            | Self::NotFound { path }
            | Self::Corrupt { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. } => Some(path),
            Self::Encode { .. } => None,
        }
    }
}
