//! Cooperative cancellation and lock-free progress counters.
//!
//! Workers write to [`ScanProgress`] with relaxed atomics and never wait on
//! a reader; the presentation layer polls [`ScanProgress::snapshot`] at its
//! own pace.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Shared cancellation flag, checked by workers at well-defined points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// What a scan worker is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Walking,
    Categorizing,
    Hashing,
    Done,
}

impl ScanPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ScanPhase::Walking,
            1 => ScanPhase::Categorizing,
            2 => ScanPhase::Hashing,
            _ => ScanPhase::Done,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ScanPhase::Walking => 0,
            ScanPhase::Categorizing => 1,
            ScanPhase::Hashing => 2,
            ScanPhase::Done => 3,
        }
    }
}

/// A point-in-time copy of [`ScanProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub phase: ScanPhase,
    pub files_seen: u64,
    pub dirs_seen: u64,
    pub bytes_seen: u64,
    pub skipped: u64,
    pub hash_candidates: u64,
    pub files_hashed: u64,
}

/// Monotonically increasing scan counters shared with an observer.
#[derive(Debug, Default)]
pub struct ScanProgress {
    phase: AtomicU8,
    files_seen: AtomicU64,
    dirs_seen: AtomicU64,
    bytes_seen: AtomicU64,
    skipped: AtomicU64,
    hash_candidates: AtomicU64,
    files_hashed: AtomicU64,
}

impl ScanProgress {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            phase: ScanPhase::from_u8(self.phase.load(Ordering::Relaxed)),
            files_seen: self.files_seen.load(Ordering::Relaxed),
            dirs_seen: self.dirs_seen.load(Ordering::Relaxed),
            bytes_seen: self.bytes_seen.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            hash_candidates: self.hash_candidates.load(Ordering::Relaxed),
            files_hashed: self.files_hashed.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn set_phase(&self, phase: ScanPhase) {
        self.phase.store(phase.as_u8(), Ordering::Relaxed);
    }

    pub(crate) fn file_seen(&self, bytes: u64) {
        self.files_seen.fetch_add(1, Ordering::Relaxed);
        self.bytes_seen.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn dir_seen(&self) {
        self.dirs_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn entry_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn hash_candidates(&self, count: u64) {
        self.hash_candidates.store(count, Ordering::Relaxed);
    }

    pub(crate) fn file_hashed(&self) {
        self.files_hashed.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let worker_copy = token.clone();
        assert!(!worker_copy.is_cancelled());

        token.cancel();
        assert!(worker_copy.is_cancelled());
    }

    #[test]
    fn snapshot_reflects_counters() {
        let progress = ScanProgress::new();
        progress.file_seen(10);
        progress.file_seen(5);
        progress.dir_seen();
        progress.entry_skipped();
        progress.set_phase(ScanPhase::Hashing);
        progress.hash_candidates(4);
        progress.file_hashed();

        let snap = progress.snapshot();
        assert_eq!(snap.phase, ScanPhase::Hashing);
        assert_eq!(snap.files_seen, 2);
        assert_eq!(snap.bytes_seen, 15);
        assert_eq!(snap.dirs_seen, 1);
        assert_eq!(snap.skipped, 1);
        assert_eq!(snap.hash_candidates, 4);
        assert_eq!(snap.files_hashed, 1);
    }

    #[test]
    fn new_progress_starts_walking() {
        assert_eq!(ScanProgress::new().snapshot().phase, ScanPhase::Walking);
    }
}
