//! Error types for `dclean-core`.
//!
//! Two families live here. Whole-operation failures ([`CoreError`],
//! [`ScanError`]) abort the call that produced them. Per-entry and per-path
//! problems ([`SkipReason`], [`TrashError`], [`DeleteError`]) are recorded
//! inline in scan and deletion results and never abort a batch.

use std::io;
use std::path::PathBuf;

/// Which kind of background task a [`CoreError::Busy`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Scan,
    Delete,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::Scan => f.write_str("scan"),
            TaskKind::Delete => f.write_str("delete"),
        }
    }
}

/// Unified error type for core operations that are not per-entry outcomes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A human-readable size string could not be parsed.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// A task of the same kind is already running in this session.
    #[error("a {0} task is already running")]
    Busy(TaskKind),

    /// The operation was cancelled before it started.
    #[error("operation cancelled")]
    Cancelled,

    /// The background worker went away without handing back a result.
    #[error("background worker stopped without a result")]
    WorkerLost,

    /// A scan failed as a whole.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Convenience alias used throughout `dclean-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Root-level scan failure. Any of these discards the whole scan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Cancellation was requested while the scan was running.
    #[error("scan cancelled")]
    Cancelled,

    /// The scan root does not exist.
    #[error("scan root not found: {0}")]
    RootNotFound(PathBuf),

    /// The scan root exists but cannot be listed.
    #[error("scan root not readable: {path}: {reason}")]
    RootNotReadable { path: PathBuf, reason: String },
}

/// Why an entry was left out of the scan tree (or left unlisted).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("permission denied")]
    PermissionDenied,

    /// A directory symlink whose target was already visited.
    #[error("symlink cycle")]
    Cycle,

    /// The entry disappeared between listing and stat.
    #[error("removed during scan")]
    RaceRemoved,

    /// A symlink that the walker does not follow.
    #[error("symlink not followed")]
    LinkNotFollowed,

    #[error("unreadable: {0}")]
    Unreadable(String),
}

impl From<&io::Error> for SkipReason {
    fn from(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
            io::ErrorKind::NotFound => SkipReason::RaceRemoved,
            _ => SkipReason::Unreadable(err.to_string()),
        }
    }
}

/// Failure reported by the trash capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrashError {
    /// No trash is available for this volume or platform.
    #[error("trash is not supported here")]
    Unsupported,

    #[error("trash is busy")]
    Busy,

    #[error("trash failed: {0}")]
    Underlying(String),
}

/// Failure of a permanent removal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeleteError {
    #[error("permission denied")]
    PermissionDenied,

    /// The path was already gone when removal was attempted.
    #[error("path no longer exists")]
    NotFound,

    /// A directory still had content after its children were removed.
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("{0}")]
    Underlying(String),
}

impl From<io::Error> for DeleteError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied,
            io::ErrorKind::NotFound => DeleteError::NotFound,
            io::ErrorKind::DirectoryNotEmpty => DeleteError::NotEmpty(err.to_string()),
            _ => DeleteError::Underlying(err.to_string()),
        }
    }
}

/// Why one top-level path could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeletionFailure {
    #[error(transparent)]
    Trash(#[from] TrashError),

    #[error(transparent)]
    Delete(#[from] DeleteError),
}
