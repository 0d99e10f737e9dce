//! The reversible-deletion capability.

use std::path::Path;

use crate::error::TrashError;

/// Moves a path into the platform's trash (recycle bin).
///
/// Implementations must never fall back to permanent removal; a trash that
/// cannot take the path reports an error instead.
pub trait TrashCan: Send + Sync {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError>;
}

/// The operating system trash, via the `trash` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrash;

impl TrashCan for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError> {
        trash::delete(path).map_err(trash_error)
    }
}

/// Sorts a platform trash failure into busy (worth retrying later) or not.
fn trash_error(err: trash::Error) -> TrashError {
    match err {
        #[cfg(all(
            unix,
            not(target_os = "macos"),
            not(target_os = "ios"),
            not(target_os = "android")
        ))]
        trash::Error::FileSystem { ref source, .. }
            if source.kind() == std::io::ErrorKind::ResourceBusy =>
        {
            TrashError::Busy
        }
        // ERROR_SHARING_VIOLATION
        #[cfg(windows)]
        trash::Error::Os { code: 32, .. } => TrashError::Busy,
        other => TrashError::Underlying(other.to_string()),
    }
}

/// A trash that is never available, for volumes or platforms without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrash;

impl TrashCan for NoTrash {
    fn move_to_trash(&self, _path: &Path) -> Result<(), TrashError> {
        Err(TrashError::Unsupported)
    }
}
