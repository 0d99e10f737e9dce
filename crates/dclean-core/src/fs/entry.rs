//! Scanned entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

use crate::error::SkipReason;

/// Index of an [`Entry`] inside the [`ScanTree`](super::tree::ScanTree) that produced it.
///
/// Ids are only meaningful for the tree they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether an entry is a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single file or directory discovered by a scan.
///
/// A file's `size_bytes` is its byte length at scan time. A directory's is
/// the sum over all descendant files, finalized once its subtree has been
/// walked and never changed afterwards. `reclaimable` is the part of that
/// sum which removing the path would actually release: content reached
/// through a followed directory symlink counts towards the size but not
/// towards what can be freed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: PathBuf,
    name: String,
    kind: EntryKind,
    size_bytes: u64,
    reclaimable: u64,
    modified: Option<SystemTime>,
    accessed: Option<SystemTime>,
    parent: Option<EntryId>,
    children: Vec<EntryId>,
    link_target: Option<PathBuf>,
    via_link: bool,
    listing_error: Option<SkipReason>,
}

impl Entry {
    pub(crate) fn file(
        path: PathBuf,
        metadata: &std::fs::Metadata,
        parent: Option<EntryId>,
        via_link: bool,
    ) -> Self {
        Self {
            name: display_name(&path),
            path,
            kind: EntryKind::File,
            size_bytes: metadata.len(),
            reclaimable: metadata.len(),
            modified: metadata.modified().ok(),
            accessed: metadata.accessed().ok(),
            parent,
            children: Vec::new(),
            link_target: None,
            via_link,
            listing_error: None,
        }
    }

    /// A directory whose size and timestamp are filled in by [`Entry::finalize`].
    pub(crate) fn directory(path: PathBuf, parent: Option<EntryId>, via_link: bool) -> Self {
        Self {
            name: display_name(&path),
            path,
            kind: EntryKind::Directory,
            size_bytes: 0,
            reclaimable: 0,
            modified: None,
            accessed: None,
            parent,
            children: Vec::new(),
            link_target: None,
            via_link,
            listing_error: None,
        }
    }

    pub(crate) fn with_link_target(mut self, target: PathBuf) -> Self {
        self.link_target = Some(target);
        self
    }

    pub(crate) fn add_child(&mut self, child: EntryId) {
        self.children.push(child);
    }

    pub(crate) fn set_listing_error(&mut self, reason: SkipReason) {
        self.listing_error = Some(reason);
    }

    pub(crate) fn finalize(
        &mut self,
        size_bytes: u64,
        reclaimable: u64,
        modified: Option<SystemTime>,
    ) {
        self.size_bytes = size_bytes;
        self.reclaimable = reclaimable.min(size_bytes);
        self.modified = modified;
    }

    /// Returns the full path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last path component, normalised to NFC.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// File length, or the aggregated size of every descendant file.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// File mtime, or the latest mtime among a directory's descendant files.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Last access time of a file, when the platform reports one.
    pub fn accessed(&self) -> Option<SystemTime> {
        self.accessed
    }

    pub fn parent(&self) -> Option<EntryId> {
        self.parent
    }

    pub fn children(&self) -> &[EntryId] {
        &self.children
    }

    /// Resolved target when this directory was reached through a symlink.
    pub fn link_target(&self) -> Option<&Path> {
        self.link_target.as_deref()
    }

    /// `true` for entries that live under a followed directory symlink.
    pub fn via_link(&self) -> bool {
        self.via_link
    }

    /// Why this directory's contents could not be listed, if they couldn't.
    pub fn listing_error(&self) -> Option<&SkipReason> {
        self.listing_error.as_ref()
    }

    /// Bytes that removing this entry's path actually releases.
    ///
    /// Removing a followed symlink only removes the link, never its target,
    /// so a directory excludes whatever its subtree reached through one.
    pub fn reclaimable_bytes(&self) -> u64 {
        if self.link_target.is_some() {
            0
        } else {
            self.reclaimable
        }
    }
}

/// A filesystem object the walker could not (or chose not to) include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().nfc().collect::<String>())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn file_entry_from_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file_path = tmp.path().join("test.txt");
        fs::write(&file_path, "hello").unwrap();

        let metadata = fs::metadata(&file_path).unwrap();
        let entry = Entry::file(file_path.clone(), &metadata, None, false);

        assert_eq!(entry.name(), "test.txt");
        assert_eq!(entry.size_bytes(), 5);
        assert!(entry.is_file());
        assert!(!entry.is_dir());
        assert_eq!(entry.path(), file_path);
        assert!(entry.modified().is_some());
        assert!(entry.children().is_empty());
    }

    #[test]
    fn directory_entry_starts_empty_until_finalized() {
        let mut entry = Entry::directory(PathBuf::from("/data/photos"), Some(EntryId(0)), false);

        assert_eq!(entry.name(), "photos");
        assert_eq!(entry.size_bytes(), 0);
        assert!(entry.modified().is_none());
        assert_eq!(entry.parent(), Some(EntryId(0)));

        let now = SystemTime::now();
        entry.finalize(42, 40, Some(now));
        assert_eq!(entry.size_bytes(), 42);
        assert_eq!(entry.reclaimable_bytes(), 40);
        assert_eq!(entry.modified(), Some(now));
    }

    #[test]
    fn root_path_uses_full_path_as_name() {
        let entry = Entry::directory(PathBuf::from("/"), None, false);
        assert_eq!(entry.name(), "/");
    }

    #[test]
    fn nfd_name_is_composed() {
        // "é" as 'e' + combining acute accent
        let entry = Entry::directory(PathBuf::from("/tmp/cafe\u{301}"), None, false);
        assert_eq!(entry.name(), "caf\u{e9}");
    }

    #[test]
    fn followed_link_reclaims_nothing() {
        let mut entry = Entry::directory(PathBuf::from("/data/link"), None, false)
            .with_link_target(PathBuf::from("/elsewhere"));
        entry.finalize(1000, 1000, None);

        assert_eq!(entry.size_bytes(), 1000);
        assert_eq!(entry.reclaimable_bytes(), 0);
        assert_eq!(entry.link_target(), Some(Path::new("/elsewhere")));
    }
}
