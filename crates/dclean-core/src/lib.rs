//! dclean core library — UI-agnostic disk cleanup logic.
//!
//! `dclean-core` scans a directory tree, classifies what it finds into
//! cleanup categories, detects duplicate files, and removes a selection of
//! paths through the trash or permanently. It has no knowledge of any front
//! end; the `dclean` CLI is a thin layer on top of it.
//!
//! # Modules
//!
//! - [`fs`] — Scan tree model and the recursive walker ([`walk`]).
//! - [`category`] — Category rules and the two-phase duplicate detector.
//! - [`scan`] — The full scan pipeline ([`scan()`](scan::scan)) producing a [`ScanReport`].
//! - [`delete`] — Selection planning ([`plan`]), trash capability and the deletion executor.
//! - [`session`] — Background scan/delete tasks with one-shot result handoff.
//! - [`progress`] — Cancellation token and progress counters.
//! - [`config`] — TOML-based settings.
//! - [`units`] — Human-readable byte sizes.
//! - [`volume`] — Capacity of the volume holding a path.
//! - [`error`] — Error types ([`CoreError`], [`ScanError`], per-entry reasons).

pub mod category;
pub mod config;
pub mod delete;
pub mod error;
pub mod fs;
pub mod progress;
pub mod scan;
pub mod session;
pub mod units;
pub mod volume;

pub use category::{
    categorize, categorize_at, Category, CategoryResults, ContentHasher, DuplicateGroup,
    DuplicateReport, Sha256Hasher,
};
pub use config::settings::Config;
pub use delete::{
    execute, plan, DeletionMode, DeletionOutcome, DeletionPlan, DeletionResult, DeletionTarget,
    NoTrash, SystemTrash, TrashCan,
};
pub use error::{
    CoreError, CoreResult, DeleteError, DeletionFailure, ScanError, SkipReason, TaskKind,
    TrashError,
};
pub use fs::{walk, Entry, EntryId, EntryKind, ScanTree, SkippedEntry, WalkOptions};
pub use progress::{CancelToken, ProgressSnapshot, ScanPhase, ScanProgress};
pub use scan::{ScanReport, ScanRequest};
pub use session::{DeleteHandle, ScanHandle, Session};
pub use units::{format_size, parse_size, ByteSize};
pub use volume::{volume_usage, VolumeUsage};
