//! Scanned filesystem model.
//!
//! [`walker::walk`] turns a root directory into a [`ScanTree`]: an arena of
//! [`Entry`] nodes with directory sizes aggregated bottom-up.

pub mod entry;
pub mod tree;
pub mod walker;

pub use entry::{Entry, EntryId, EntryKind, SkippedEntry};
pub use tree::ScanTree;
pub use walker::{walk, WalkOptions};
