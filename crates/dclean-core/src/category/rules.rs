//! Predicate rules for the non-duplicate categories.
//!
//! Each rule is a read-only pass over a finished [`ScanTree`] and returns
//! entry ids in the display order of its category.

use std::time::{Duration, SystemTime};

use crate::config::settings::CategoryConfig;
use crate::fs::{EntryId, ScanTree};

/// Files of at least `threshold` bytes, largest first.
pub fn large_files(tree: &ScanTree, threshold: u64) -> Vec<EntryId> {
    let mut found: Vec<EntryId> = tree
        .files()
        .filter(|(_, e)| e.size_bytes() >= threshold)
        .map(|(id, _)| id)
        .collect();
    found.sort_by(|&a, &b| {
        tree.get(b)
            .size_bytes()
            .cmp(&tree.get(a).size_bytes())
            .then_with(|| tree.get(a).path().cmp(tree.get(b).path()))
    });
    found
}

/// Files last modified at least `age` before `now`, oldest first.
///
/// Files without a readable timestamp, or stamped in the future, never qualify.
pub fn old_files(tree: &ScanTree, age: Duration, now: SystemTime) -> Vec<EntryId> {
    let mut found: Vec<EntryId> = tree
        .files()
        .filter(|(_, e)| {
            e.modified()
                .and_then(|m| now.duration_since(m).ok())
                .is_some_and(|elapsed| elapsed >= age)
        })
        .map(|(id, _)| id)
        .collect();
    found.sort_by(|&a, &b| {
        tree.get(a)
            .modified()
            .cmp(&tree.get(b).modified())
            .then_with(|| tree.get(a).path().cmp(tree.get(b).path()))
    });
    found
}

/// Files not used for at least `age` before `now`, least recently used first.
///
/// A file's last use is its access time, or its modification time when the
/// access time is missing or older (volumes mounted without atime updates).
pub fn not_accessed_files(tree: &ScanTree, age: Duration, now: SystemTime) -> Vec<EntryId> {
    let last_used = |id: EntryId| {
        let e = tree.get(id);
        match (e.accessed(), e.modified()) {
            (Some(a), Some(m)) => Some(a.max(m)),
            (a, m) => a.or(m),
        }
    };
    let mut found: Vec<EntryId> = tree
        .files()
        .filter(|&(id, _)| {
            last_used(id)
                .and_then(|t| now.duration_since(t).ok())
                .is_some_and(|elapsed| elapsed >= age)
        })
        .map(|(id, _)| id)
        .collect();
    found.sort_by(|&a, &b| {
        last_used(a)
            .cmp(&last_used(b))
            .then_with(|| tree.get(a).path().cmp(tree.get(b).path()))
    });
    found
}

/// Lower-cased name sets used by [`temporary_files`].
#[derive(Debug, Clone)]
pub struct TempMatcher {
    suffixes: Vec<String>,
    file_names: Vec<String>,
    junk_dirs: Vec<String>,
}

impl TempMatcher {
    pub fn new(config: &CategoryConfig) -> Self {
        let lower = |items: &[String]| items.iter().map(|s| s.to_lowercase()).collect();
        Self {
            suffixes: lower(&config.temp_suffixes),
            file_names: lower(&config.temp_file_names),
            junk_dirs: lower(&config.junk_dir_names),
        }
    }

    pub fn is_temp_file_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.file_names.iter().any(|n| *n == name)
            || self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    pub fn is_junk_dir_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.junk_dirs.iter().any(|d| *d == name)
    }
}

/// Files whose own name is junk, or that sit anywhere below a junk-named
/// directory (the scan root's own name is not considered). Largest first.
pub fn temporary_files(tree: &ScanTree, matcher: &TempMatcher) -> Vec<EntryId> {
    let mut found = Vec::new();
    let mut stack: Vec<(EntryId, bool)> = tree.children(tree.root()).map(|(id, _)| (id, false)).collect();

    while let Some((id, in_junk_dir)) = stack.pop() {
        let entry = tree.get(id);
        if entry.is_dir() {
            let junk = in_junk_dir || matcher.is_junk_dir_name(entry.name());
            stack.extend(entry.children().iter().map(|&child| (child, junk)));
        } else if in_junk_dir || matcher.is_temp_file_name(entry.name()) {
            found.push(id);
        }
    }

    found.sort_by(|&a, &b| {
        tree.get(b)
            .size_bytes()
            .cmp(&tree.get(a).size_bytes())
            .then_with(|| tree.get(a).path().cmp(tree.get(b).path()))
    });
    found
}

/// Zero-byte files plus directories left with no children, sorted by path.
///
/// The scan root and directories that could not be listed are never reported.
pub fn zero_byte_or_empty(tree: &ScanTree) -> Vec<EntryId> {
    let root = tree.root();
    let mut found: Vec<EntryId> = tree
        .iter()
        .filter(|&(id, e)| {
            if e.is_file() {
                e.size_bytes() == 0
            } else {
                id != root && e.children().is_empty() && e.listing_error().is_none()
            }
        })
        .map(|(id, _)| id)
        .collect();
    found.sort_by(|&a, &b| tree.get(a).path().cmp(tree.get(b).path()));
    found
}
