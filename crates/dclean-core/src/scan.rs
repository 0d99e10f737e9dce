//! The full scan pipeline: walk, categorize, and optionally find duplicates.

use std::path::PathBuf;

use crate::category::{self, duplicates, CategoryResults, ContentHasher, Sha256Hasher};
use crate::config::settings::Config;
use crate::error::ScanError;
use crate::fs::{walk, ScanTree, WalkOptions};
use crate::progress::{CancelToken, ScanPhase, ScanProgress};

/// What to scan and how.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub config: Config,
    /// Run the content-hashing duplicate pass.
    pub include_duplicates: bool,
}

impl ScanRequest {
    /// Builds a request whose duplicate flag comes from `config.scan`.
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        let include_duplicates = config.scan.include_duplicates;
        Self {
            root: root.into(),
            config,
            include_duplicates,
        }
    }

    pub fn with_duplicates(mut self, include_duplicates: bool) -> Self {
        self.include_duplicates = include_duplicates;
        self
    }
}

/// The immutable result of a finished scan.
#[derive(Debug)]
pub struct ScanReport {
    pub tree: ScanTree,
    pub categories: CategoryResults,
}

/// Runs the scan pipeline with the SHA-256 content hasher.
pub fn scan(
    request: &ScanRequest,
    cancel: &CancelToken,
    progress: &ScanProgress,
) -> Result<ScanReport, ScanError> {
    scan_with_hasher(request, &Sha256Hasher, cancel, progress)
}

/// Runs the scan pipeline with a caller-supplied content hasher.
///
/// A cancelled scan returns [`ScanError::Cancelled`] and never a partial
/// report.
pub fn scan_with_hasher(
    request: &ScanRequest,
    hasher: &dyn ContentHasher,
    cancel: &CancelToken,
    progress: &ScanProgress,
) -> Result<ScanReport, ScanError> {
    progress.set_phase(ScanPhase::Walking);
    let options = WalkOptions::from(&request.config.scan);
    let tree = walk(&request.root, &options, cancel, progress)?;

    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }
    progress.set_phase(ScanPhase::Categorizing);
    let mut categories = category::categorize(&tree, &request.config.categories);

    if request.include_duplicates {
        progress.set_phase(ScanPhase::Hashing);
        let report = duplicates::find_duplicates(&tree, hasher, cancel, progress)?;
        categories = categories.with_duplicates(report);
    }

    progress.set_phase(ScanPhase::Done);
    Ok(ScanReport { tree, categories })
}
