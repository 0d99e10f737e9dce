//! Classification of scanned entries into named result sets.
//!
//! [`categorize`] runs the cheap predicate rules over a finished
//! [`ScanTree`]. Duplicate detection reads file contents, so it is a
//! separate, opt-in pass ([`duplicates::find_duplicates`]) whose report is
//! attached with [`CategoryResults::with_duplicates`].

pub mod duplicates;
pub mod rules;

use std::time::SystemTime;

use crate::config::settings::CategoryConfig;
use crate::fs::{EntryId, ScanTree};

pub use duplicates::{ContentHasher, DuplicateGroup, DuplicateReport, Sha256Hasher};
pub use rules::TempMatcher;

/// One classification bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Large,
    Old,
    Temporary,
    ZeroByteOrEmpty,
    Duplicate,
    /// Opt-in: only computed when an access-age threshold is configured.
    NotAccessed,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Large,
        Category::Old,
        Category::Temporary,
        Category::ZeroByteOrEmpty,
        Category::Duplicate,
        Category::NotAccessed,
    ];

    /// Machine-readable name used on the command line (e.g. `"temp"`).
    pub fn name(self) -> &'static str {
        match self {
            Category::Large => "large",
            Category::Old => "old",
            Category::Temporary => "temp",
            Category::ZeroByteOrEmpty => "empty",
            Category::Duplicate => "duplicates",
            Category::NotAccessed => "unaccessed",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Category::Large => "Large Files",
            Category::Old => "Old Files",
            Category::Temporary => "Temporary & Cache",
            Category::ZeroByteOrEmpty => "Zero-Byte Files & Empty Folders",
            Category::Duplicate => "Duplicates",
            Category::NotAccessed => "Not Accessed Recently",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// The category result sets of one scan.
///
/// Entries are referenced by id into the [`ScanTree`] the results were
/// computed from; the tree stays the single owner of entry data.
#[derive(Debug, Clone, Default)]
pub struct CategoryResults {
    large: Vec<EntryId>,
    old: Vec<EntryId>,
    temporary: Vec<EntryId>,
    zero_or_empty: Vec<EntryId>,
    duplicate_members: Vec<EntryId>,
    duplicates: Option<DuplicateReport>,
    not_accessed: Option<Vec<EntryId>>,
}

impl CategoryResults {
    /// Attaches a duplicate report; its members become the Duplicate category.
    pub fn with_duplicates(self, report: DuplicateReport) -> Self {
        Self {
            duplicate_members: report.members().collect(),
            duplicates: Some(report),
            ..self
        }
    }

    pub fn get(&self, category: Category) -> &[EntryId] {
        match category {
            Category::Large => &self.large,
            Category::Old => &self.old,
            Category::Temporary => &self.temporary,
            Category::ZeroByteOrEmpty => &self.zero_or_empty,
            Category::Duplicate => &self.duplicate_members,
            Category::NotAccessed => self.not_accessed.as_deref().unwrap_or_default(),
        }
    }

    /// Whether `category` was computed for this scan. The opt-in categories
    /// are empty rather than absent when they were not requested.
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Duplicate => self.duplicates.is_some(),
            Category::NotAccessed => self.not_accessed.is_some(),
            _ => true,
        }
    }

    /// Sum of the sizes of a category's entries.
    pub fn total_bytes(&self, category: Category, tree: &ScanTree) -> u64 {
        self.get(category)
            .iter()
            .map(|&id| tree.get(id).size_bytes())
            .sum()
    }

    /// The duplicate report, or `None` when detection was not requested.
    pub fn duplicates(&self) -> Option<&DuplicateReport> {
        self.duplicates.as_ref()
    }
}

/// Classifies every entry of `tree` against the current time.
pub fn categorize(tree: &ScanTree, config: &CategoryConfig) -> CategoryResults {
    categorize_at(tree, config, SystemTime::now())
}

/// Classifies every entry of `tree`, measuring file age against `now`.
pub fn categorize_at(tree: &ScanTree, config: &CategoryConfig, now: SystemTime) -> CategoryResults {
    let results = CategoryResults {
        large: rules::large_files(tree, config.large_threshold_bytes()),
        old: rules::old_files(tree, config.old_age(), now),
        temporary: rules::temporary_files(tree, &TempMatcher::new(config)),
        zero_or_empty: rules::zero_byte_or_empty(tree),
        not_accessed: config
            .never_accessed_age()
            .map(|age| rules::not_accessed_files(tree, age, now)),
        ..CategoryResults::default()
    };
    tracing::info!(
        "categorized: {} large, {} old, {} temporary, {} zero-byte/empty",
        results.large.len(),
        results.old.len(),
        results.temporary.len(),
        results.zero_or_empty.len()
    );
    if let Some(found) = &results.not_accessed {
        tracing::info!("categorized: {} not accessed", found.len());
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::walker::{walk, WalkOptions};
    use crate::progress::{CancelToken, ScanProgress};
    use crate::units::ByteSize;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    const MIB: u64 = 1024 * 1024;

    fn scan(root: &Path) -> ScanTree {
        walk(
            root,
            &WalkOptions::default(),
            &CancelToken::new(),
            &ScanProgress::default(),
        )
        .unwrap()
    }

    fn names(tree: &ScanTree, ids: &[EntryId]) -> Vec<String> {
        ids.iter().map(|&id| tree.get(id).name().to_string()).collect()
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
        assert_eq!(Category::from_name("nope"), None);
        assert_eq!(Category::Temporary.label(), "Temporary & Cache");
    }

    #[test]
    fn cleanup_scenario() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        fs::create_dir_all(a.join("tmp")).unwrap();
        fs::create_dir(a.join("empty")).unwrap();

        let big = fs::File::create(a.join("big.bin")).unwrap();
        big.set_len(150 * MIB).unwrap();
        let now = SystemTime::now();
        big.set_modified(now).unwrap();
        drop(big);

        let old = fs::File::create(a.join("old.txt")).unwrap();
        old.set_len(1024).unwrap();
        old.set_modified(now - Duration::from_secs(2 * 365 * 86_400)).unwrap();
        drop(old);

        fs::write(a.join("tmp/cache.tmp"), "0123456789").unwrap();

        let tree = scan(&a);
        let results = categorize_at(&tree, &CategoryConfig::default(), now);

        assert_eq!(names(&tree, results.get(Category::Large)), vec!["big.bin"]);
        assert_eq!(names(&tree, results.get(Category::Old)), vec!["old.txt"]);
        assert_eq!(names(&tree, results.get(Category::Temporary)), vec!["cache.tmp"]);
        assert_eq!(
            names(&tree, results.get(Category::ZeroByteOrEmpty)),
            vec!["empty"]
        );
        assert!(results.get(Category::Duplicate).is_empty());
        assert!(results.duplicates().is_none());
        assert_eq!(tree.total_bytes(), 150 * MIB + 1024 + 10);
    }

    #[test]
    fn categories_may_overlap() {
        let tmp = TempDir::new().unwrap();
        let f = fs::File::create(tmp.path().join("huge.log")).unwrap();
        f.set_len(2048).unwrap();
        let now = SystemTime::now();
        f.set_modified(now - Duration::from_secs(800 * 86_400)).unwrap();
        drop(f);

        let config = CategoryConfig {
            large_threshold: ByteSize(1024),
            ..CategoryConfig::default()
        };
        let tree = scan(tmp.path());
        let results = categorize_at(&tree, &config, now);

        assert_eq!(results.get(Category::Large).len(), 1);
        assert_eq!(results.get(Category::Old).len(), 1);
        assert_eq!(results.get(Category::Temporary).len(), 1);
        assert_eq!(results.total_bytes(Category::Large, &tree), 2048);
    }

    #[test]
    fn attaching_duplicates_fills_duplicate_category() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a"), "twin").unwrap();
        fs::write(tmp.path().join("b"), "twin").unwrap();

        let tree = scan(tmp.path());
        let report = duplicates::find_duplicates(
            &tree,
            &Sha256Hasher,
            &CancelToken::new(),
            &ScanProgress::default(),
        )
        .unwrap();
        let results = categorize(&tree, &CategoryConfig::default()).with_duplicates(report);

        assert_eq!(names(&tree, results.get(Category::Duplicate)), vec!["a", "b"]);
        assert_eq!(results.total_bytes(Category::Duplicate, &tree), 8);
        assert_eq!(results.duplicates().unwrap().groups.len(), 1);
    }

    #[test]
    fn not_accessed_runs_only_when_configured() {
        let tmp = TempDir::new().unwrap();
        let now = SystemTime::now();
        let then = now - Duration::from_secs(400 * 86_400);
        let f = fs::File::create(tmp.path().join("forgotten.txt")).unwrap();
        f.set_times(fs::FileTimes::new().set_accessed(then).set_modified(then))
            .unwrap();
        drop(f);
        let tree = scan(tmp.path());

        let off = categorize_at(&tree, &CategoryConfig::default(), now);
        assert!(!off.is_enabled(Category::NotAccessed));
        assert!(off.get(Category::NotAccessed).is_empty());

        let config = CategoryConfig {
            never_accessed_days: Some(365),
            ..CategoryConfig::default()
        };
        let on = categorize_at(&tree, &config, now);
        assert!(on.is_enabled(Category::NotAccessed));
        assert_eq!(
            names(&tree, on.get(Category::NotAccessed)),
            vec!["forgotten.txt"]
        );
    }
}
