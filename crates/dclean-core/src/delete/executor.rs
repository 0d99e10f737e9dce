//! Removal of planned targets with per-path outcomes.

use std::fs;
use std::path::{Path, PathBuf};

use super::planner::{DeletionPlan, DeletionTarget};
use super::trash::TrashCan;
use crate::error::{DeleteError, DeletionFailure};
use crate::fs::EntryKind;

/// How targets are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    /// Move to the trash; recoverable.
    ToTrash,
    /// Remove from disk; not recoverable.
    Permanent,
}

impl DeletionMode {
    pub fn from_permanent(permanent: bool) -> Self {
        if permanent {
            DeletionMode::Permanent
        } else {
            DeletionMode::ToTrash
        }
    }
}

/// Result of removing one top-level path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Succeeded { bytes_freed: u64 },
    Failed(DeletionFailure),
}

/// Aggregate of one deletion run. Immutable once [`execute`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionResult {
    pub mode: DeletionMode,
    /// One outcome per planned target, in plan order.
    pub outcomes: Vec<(PathBuf, DeletionOutcome)>,
    pub bytes_freed: u64,
    pub succeeded: usize,
    pub files_removed: usize,
    pub dirs_removed: usize,
}

impl DeletionResult {
    fn new(mode: DeletionMode) -> Self {
        Self {
            mode,
            outcomes: Vec::new(),
            bytes_freed: 0,
            succeeded: 0,
            files_removed: 0,
            dirs_removed: 0,
        }
    }

    fn record(&mut self, target: &DeletionTarget, outcome: Result<(), DeletionFailure>) {
        let outcome = match outcome {
            Ok(()) => {
                self.succeeded += 1;
                self.bytes_freed += target.size_bytes;
                match target.kind {
                    EntryKind::File => self.files_removed += 1,
                    EntryKind::Directory => self.dirs_removed += 1,
                }
                DeletionOutcome::Succeeded {
                    bytes_freed: target.size_bytes,
                }
            }
            Err(reason) => {
                tracing::warn!("failed to delete {}: {reason}", target.path.display());
                DeletionOutcome::Failed(reason)
            }
        };
        self.outcomes.push((target.path.clone(), outcome));
    }

    /// Failed paths with their reasons, in plan order.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &DeletionFailure)> {
        self.outcomes.iter().filter_map(|(path, outcome)| match outcome {
            DeletionOutcome::Failed(reason) => Some((path.as_path(), reason)),
            DeletionOutcome::Succeeded { .. } => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded
    }
}

/// Removes every target of `plan`, independently of one another.
///
/// A failing path is recorded and the run moves on; the call itself never
/// fails. In [`DeletionMode::ToTrash`] a trash error stays a failure and is
/// never retried as a permanent removal. An empty plan yields an empty result.
pub fn execute(plan: &DeletionPlan, mode: DeletionMode, trash: &dyn TrashCan) -> DeletionResult {
    let mut result = DeletionResult::new(mode);
    if plan.is_empty() {
        return result;
    }

    tracing::info!(
        "deleting {} paths ({:?}, {} bytes planned)",
        plan.len(),
        mode,
        plan.total_bytes()
    );
    for target in plan.targets() {
        let outcome = match mode {
            DeletionMode::ToTrash => send_to_trash(&target.path, trash),
            DeletionMode::Permanent => remove_permanently(&target.path).map_err(Into::into),
        };
        result.record(target, outcome);
    }
    tracing::info!(
        "deletion complete: {} succeeded, {} failed, {} bytes freed",
        result.succeeded,
        result.failed(),
        result.bytes_freed
    );
    result
}

fn send_to_trash(path: &Path, trash: &dyn TrashCan) -> Result<(), DeletionFailure> {
    // A path that is already gone is reported as such rather than as a trash error.
    fs::symlink_metadata(path).map_err(DeleteError::from)?;
    trash.move_to_trash(path)?;
    Ok(())
}

fn remove_permanently(path: &Path) -> Result<(), DeleteError> {
    // symlink_metadata does not follow links, so a link is removed, not its target.
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}
