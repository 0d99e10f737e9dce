//! Two-phase duplicate detection.
//!
//! Files are first bucketed by size; only buckets with two or more members
//! are hashed, and each candidate is hashed at most once. Members of a
//! group are treated as byte-identical on equal SHA-256 digests alone. A
//! digest collision would produce a false group; that risk is accepted
//! rather than paying for a byte-for-byte comparison.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{ScanError, SkipReason};
use crate::fs::{EntryId, ScanTree, SkippedEntry};
use crate::progress::{CancelToken, ScanProgress};

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Computes a content digest for one file.
pub trait ContentHasher: Send + Sync {
    /// Returns the lowercase hex digest of the file at `path`.
    fn hash_file(&self, path: &Path) -> io::Result<String>;
}

/// Streaming SHA-256; digests are always 64 hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hash_file(&self, path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Two or more files with equal size and equal digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// File size in bytes (shared by all members).
    pub size: u64,
    /// Hex digest of the shared content.
    pub hash: String,
    /// Members sorted by path (always 2+).
    pub members: Vec<EntryId>,
}

impl DuplicateGroup {
    /// Bytes released by keeping one member and removing the rest.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * (self.members.len() as u64).saturating_sub(1)
    }
}

/// Outcome of one duplicate detection pass.
#[derive(Debug, Clone, Default)]
pub struct DuplicateReport {
    /// Groups sorted by reclaimable bytes, largest first.
    pub groups: Vec<DuplicateGroup>,
    /// Candidates that could not be read while hashing.
    pub unreadable: Vec<SkippedEntry>,
    /// Number of files handed to the hasher.
    pub hash_invocations: usize,
}

impl DuplicateReport {
    pub fn reclaimable_bytes(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::reclaimable_bytes).sum()
    }

    /// Every member of every group, group by group.
    pub fn members(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.groups.iter().flat_map(|g| g.members.iter().copied())
    }
}

/// Finds groups of byte-identical files in `tree`.
///
/// Zero-byte files and files reached through a followed symlink never take
/// part. The cancel token is polled before every hash.
///
/// # Errors
///
/// [`ScanError::Cancelled`] when `cancel` is set during the pass.
pub fn find_duplicates(
    tree: &ScanTree,
    hasher: &dyn ContentHasher,
    cancel: &CancelToken,
    progress: &ScanProgress,
) -> Result<DuplicateReport, ScanError> {
    // Phase 1: group by size. A file with a unique size cannot have a twin.
    let mut size_groups: BTreeMap<u64, Vec<EntryId>> = BTreeMap::new();
    for (id, entry) in tree.files() {
        if entry.size_bytes() == 0 || entry.via_link() {
            continue;
        }
        size_groups.entry(entry.size_bytes()).or_default().push(id);
    }
    size_groups.retain(|_, ids| ids.len() >= 2);

    let candidates: usize = size_groups.values().map(Vec::len).sum();
    progress.hash_candidates(candidates as u64);
    tracing::info!(
        "duplicate scan: {candidates} candidates in {} size groups",
        size_groups.len()
    );

    // Phase 2: hash each candidate once and split its size group by digest.
    let mut report = DuplicateReport::default();
    for (size, ids) in size_groups {
        let mut hash_groups: HashMap<String, Vec<EntryId>> = HashMap::new();
        for id in ids {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let path = tree.get(id).path();
            report.hash_invocations += 1;
            match hasher.hash_file(path) {
                Ok(hash) => {
                    tracing::debug!("hashed {}: {hash}", path.display());
                    hash_groups.entry(hash).or_default().push(id);
                }
                Err(e) => {
                    tracing::warn!("failed to hash file {}: {e}", path.display());
                    report.unreadable.push(SkippedEntry {
                        path: path.to_path_buf(),
                        reason: SkipReason::from(&e),
                    });
                }
            }
            progress.file_hashed();
        }

        for (hash, mut members) in hash_groups {
            if members.len() >= 2 {
                members.sort_by(|&a, &b| tree.get(a).path().cmp(tree.get(b).path()));
                report.groups.push(DuplicateGroup {
                    size,
                    hash,
                    members,
                });
            }
        }
    }

    report.groups.sort_by(|a, b| {
        b.reclaimable_bytes()
            .cmp(&a.reclaimable_bytes())
            .then_with(|| b.size.cmp(&a.size))
            .then_with(|| a.hash.cmp(&b.hash))
    });

    tracing::info!(
        "duplicate scan complete: {} groups, {} reclaimable bytes, {} files hashed",
        report.groups.len(),
        report.reclaimable_bytes(),
        report.hash_invocations
    );
    Ok(report)
}
