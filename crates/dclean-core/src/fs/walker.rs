//! Recursive tree walker with bottom-up size aggregation.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::entry::{Entry, EntryId};
use super::tree::ScanTree;
use crate::config::settings::ScanConfig;
use crate::error::{ScanError, SkipReason};
use crate::progress::{CancelToken, ScanProgress};

/// Walk behaviour, usually derived from [`ScanConfig`].
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
    /// Entries processed in one directory between two cancellation checks.
    pub cancel_check_interval: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

impl From<&ScanConfig> for WalkOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            cancel_check_interval: config.cancel_check_interval.max(1),
        }
    }
}

/// Walks `root` depth-first and returns the finished tree.
///
/// Each directory's size is finalized only after all of its children are,
/// so every directory ends up equal to the sum of its children. Entries that
/// cannot be read are recorded in [`ScanTree::skipped`] and the walk carries
/// on with their siblings.
///
/// With `follow_symlinks` on, every physical directory is listed at most
/// once. Links pointing back inside the scan root are never followed since
/// their content is walked under its real path.
///
/// # Errors
///
/// - [`ScanError::RootNotFound`] — `root` does not exist.
/// - [`ScanError::RootNotReadable`] — `root` is not a directory or cannot be listed.
/// - [`ScanError::Cancelled`] — `cancel` was set; any partial tree is dropped.
pub fn walk(
    root: &Path,
    options: &WalkOptions,
    cancel: &CancelToken,
    progress: &ScanProgress,
) -> Result<ScanTree, ScanError> {
    if cancel.is_cancelled() {
        return Err(ScanError::Cancelled);
    }

    let root = fs::canonicalize(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::RootNotFound(root.to_path_buf()),
        _ => ScanError::RootNotReadable {
            path: root.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    let metadata = fs::metadata(&root).map_err(|e| ScanError::RootNotReadable {
        path: root.clone(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::RootNotReadable {
            path: root,
            reason: "not a directory".to_string(),
        });
    }

    let mut walker = Walker::new(root.clone(), options, cancel, progress);
    let listing = walker.list(&root).map_err(|e| ScanError::RootNotReadable {
        path: root.clone(),
        reason: e.to_string(),
    })?;

    tracing::info!("scan started: {}", root.display());
    progress.dir_seen();

    let root_id = walker.tree.root();
    walker.walk_children(root_id, listing, false)?;
    walker.finalize(root_id);

    let tree = walker.tree;
    tracing::info!(
        "scan complete: {} files, {} directories, {} bytes, {} skipped",
        tree.file_count(),
        tree.dir_count(),
        tree.total_bytes(),
        tree.skipped().len()
    );
    Ok(tree)
}

struct Walker<'a> {
    tree: ScanTree,
    /// Canonical scan root.
    root: PathBuf,
    /// Canonical paths of every directory listed so far.
    visited: HashSet<PathBuf>,
    options: &'a WalkOptions,
    cancel: &'a CancelToken,
    progress: &'a ScanProgress,
}

impl<'a> Walker<'a> {
    fn new(
        root: PathBuf,
        options: &'a WalkOptions,
        cancel: &'a CancelToken,
        progress: &'a ScanProgress,
    ) -> Self {
        Self {
            tree: ScanTree::new(Entry::directory(root.clone(), None, false)),
            visited: HashSet::from([root.clone()]),
            root,
            options,
            cancel,
            progress,
        }
    }

    fn walk_children(
        &mut self,
        dir: EntryId,
        listing: Vec<fs::DirEntry>,
        via_link: bool,
    ) -> Result<(), ScanError> {
        for (i, dir_entry) in listing.into_iter().enumerate() {
            if (i + 1) % self.options.cancel_check_interval == 0 && self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }

            let path = dir_entry.path();
            let metadata = match fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(e) => {
                    self.skip(path, SkipReason::from(&e));
                    continue;
                }
            };

            let file_type = metadata.file_type();
            if file_type.is_symlink() {
                self.visit_symlink(dir, path, via_link)?;
            } else if file_type.is_dir() {
                self.visit_dir(dir, path, None, via_link)?;
            } else if file_type.is_file() {
                self.progress.file_seen(metadata.len());
                self.tree
                    .push(Entry::file(path, &metadata, Some(dir), via_link));
            } else {
                self.skip(path, SkipReason::Unreadable("not a regular file".to_string()));
            }
        }
        Ok(())
    }

    fn visit_dir(
        &mut self,
        parent: EntryId,
        path: PathBuf,
        link_target: Option<PathBuf>,
        via_link: bool,
    ) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        if self.options.follow_symlinks {
            let real = match &link_target {
                Some(target) => target.clone(),
                None if via_link => fs::canonicalize(&path).unwrap_or_else(|_| path.clone()),
                None => path.clone(),
            };
            if !self.visited.insert(real) {
                self.skip(path, SkipReason::Cycle);
                return Ok(());
            }
        }

        let followed_link = link_target.is_some();
        let mut entry = Entry::directory(path.clone(), Some(parent), via_link);
        if let Some(target) = link_target {
            entry = entry.with_link_target(target);
        }
        let id = self.tree.push(entry);
        self.progress.dir_seen();

        match self.list(&path) {
            Ok(listing) => self.walk_children(id, listing, via_link || followed_link)?,
            Err(e) => {
                let reason = SkipReason::from(&e);
                self.tree.entry_mut(id).set_listing_error(reason.clone());
                self.skip(path, reason);
            }
        }

        self.finalize(id);
        Ok(())
    }

    /// Follows a directory symlink once per real target outside the root;
    /// everything else is skipped.
    fn visit_symlink(
        &mut self,
        parent: EntryId,
        path: PathBuf,
        via_link: bool,
    ) -> Result<(), ScanError> {
        if !self.options.follow_symlinks {
            self.skip(path, SkipReason::LinkNotFollowed);
            return Ok(());
        }

        let target = match fs::canonicalize(&path) {
            Ok(t) => t,
            Err(_) => {
                self.skip(path, SkipReason::LinkNotFollowed);
                return Ok(());
            }
        };
        let target_is_dir = fs::metadata(&target).map(|m| m.is_dir()).unwrap_or(false);
        if !target_is_dir {
            self.skip(path, SkipReason::LinkNotFollowed);
            return Ok(());
        }
        if target.starts_with(&self.root) || self.visited.contains(&target) {
            self.skip(path, SkipReason::Cycle);
            return Ok(());
        }

        self.visit_dir(parent, path, Some(target), via_link)
    }

    fn finalize(&mut self, id: EntryId) {
        let (size, reclaimable, latest) = self.tree.children(id).fold(
            (0u64, 0u64, None),
            |(size, reclaimable, latest), (_, child)| {
                (
                    size + child.size_bytes(),
                    reclaimable + child.reclaimable_bytes(),
                    later(latest, child.modified()),
                )
            },
        );
        self.tree
            .entry_mut(id)
            .finalize(size, reclaimable, latest);
    }

    /// Lists a directory sorted by file name.
    ///
    /// Rows that fail mid-listing are recorded as skipped against `path`; only
    /// failing to open the directory at all is an error.
    fn list(&mut self, path: &Path) -> io::Result<Vec<fs::DirEntry>> {
        let rows = fs::read_dir(path)?;
        Ok(self.collect_listing(path, rows))
    }

    fn collect_listing(
        &mut self,
        path: &Path,
        rows: impl IntoIterator<Item = io::Result<fs::DirEntry>>,
    ) -> Vec<fs::DirEntry> {
        let mut entries = Vec::new();
        for row in rows {
            match row {
                Ok(entry) => entries.push(entry),
                Err(e) => self.skip(path.to_path_buf(), SkipReason::from(&e)),
            }
        }
        entries.sort_by_key(|e| e.file_name());
        entries
    }

    fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        self.progress.entry_skipped();
        self.tree.record_skip(path, reason);
    }
}

fn later(a: Option<SystemTime>, b: Option<SystemTime>) -> Option<SystemTime> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
