//! Arena-backed scan tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::entry::{Entry, EntryId, SkippedEntry};
use crate::error::SkipReason;

/// The owned result of a completed walk.
///
/// Entries live in a flat arena and refer to each other by [`EntryId`]; a
/// parent owns the ids of its children, and the back link to the parent is
/// an id lookup only. The root is always the first entry.
#[derive(Debug, Clone)]
pub struct ScanTree {
    nodes: Vec<Entry>,
    index: HashMap<PathBuf, EntryId>,
    skipped: Vec<SkippedEntry>,
    file_count: usize,
    dir_count: usize,
}

impl ScanTree {
    pub(crate) fn new(root: Entry) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            skipped: Vec::new(),
            file_count: 0,
            dir_count: 0,
        };
        tree.push(root);
        tree
    }

    /// Appends `entry` and links it under its parent.
    pub(crate) fn push(&mut self, entry: Entry) -> EntryId {
        let id = EntryId(self.nodes.len());
        if entry.is_dir() {
            self.dir_count += 1;
        } else {
            self.file_count += 1;
        }
        if let Some(parent) = entry.parent() {
            self.nodes[parent.0].add_child(id);
        }
        self.index.insert(entry.path().to_path_buf(), id);
        self.nodes.push(entry);
        id
    }

    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        &mut self.nodes[id.0]
    }

    pub(crate) fn record_skip(&mut self, path: PathBuf, reason: SkipReason) {
        tracing::debug!("skipped {}: {reason}", path.display());
        self.skipped.push(SkippedEntry { path, reason });
    }

    pub fn root(&self) -> EntryId {
        EntryId(0)
    }

    pub fn root_entry(&self) -> &Entry {
        &self.nodes[0]
    }

    /// Returns the entry for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was produced by a different tree.
    pub fn get(&self, id: EntryId) -> &Entry {
        &self.nodes[id.0]
    }

    /// Looks up an entry by its exact path.
    pub fn find(&self, path: &Path) -> Option<EntryId> {
        self.index.get(path).copied()
    }

    /// All entries in discovery order (pre-order, root first).
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.nodes.iter().enumerate().map(|(i, e)| (EntryId(i), e))
    }

    pub fn files(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.iter().filter(|(_, e)| e.is_file())
    }

    pub fn directories(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.iter().filter(|(_, e)| e.is_dir())
    }

    pub fn children(&self, id: EntryId) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.nodes[id.0]
            .children()
            .iter()
            .map(move |&child| (child, &self.nodes[child.0]))
    }

    /// Number of entries, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn dir_count(&self) -> usize {
        self.dir_count
    }

    /// Aggregate size of the root directory.
    pub fn total_bytes(&self) -> u64 {
        self.nodes[0].size_bytes()
    }

    /// Entries left out of the tree, in the order they were encountered.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }
}
