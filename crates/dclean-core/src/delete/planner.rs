//! Reduction of a user selection to its top-level paths.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fs::{EntryKind, ScanTree};

/// Returns the selected paths that have no selected ancestor.
///
/// The result is the minimal antichain under the path-prefix order: every
/// independent subtree is named exactly once and nothing inside an already
/// selected directory is kept. Prefixes are compared per component, so `/a`
/// covers `/a/b` but never `/ab`.
pub fn plan<I, P>(selection: I) -> BTreeSet<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let sorted: BTreeSet<PathBuf> = selection.into_iter().map(Into::into).collect();

    // Path ordering is component-wise, so a subtree is a contiguous run that
    // starts with its root. Only the last kept path can be an ancestor.
    let mut top_level = BTreeSet::new();
    let mut last_kept: Option<PathBuf> = None;
    for path in sorted {
        if last_kept.as_deref().is_some_and(|kept| path.starts_with(kept)) {
            continue;
        }
        last_kept = Some(path.clone());
        top_level.insert(path);
    }
    top_level
}

/// One top-level path to remove and the bytes it is credited with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionTarget {
    pub path: PathBuf,
    /// Size recorded before removal; it cannot be measured afterwards.
    pub size_bytes: u64,
    pub kind: EntryKind,
}

/// Planned top-level targets, in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    targets: Vec<DeletionTarget>,
}

impl DeletionPlan {
    /// Plans `selection` using the sizes recorded by a scan.
    ///
    /// A followed directory symlink is credited zero bytes and planned as a
    /// plain file, because only the link itself is removed. Directories are
    /// credited only what their own subtree holds outside such links. Paths the tree
    /// does not know are measured on disk.
    pub fn from_tree<I, P>(selection: I, tree: &ScanTree) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let targets = plan(selection)
            .into_iter()
            .map(|path| match tree.find(&path) {
                Some(id) => {
                    let entry = tree.get(id);
                    let kind = if entry.link_target().is_some() {
                        EntryKind::File
                    } else {
                        entry.kind()
                    };
                    DeletionTarget {
                        size_bytes: entry.reclaimable_bytes(),
                        kind,
                        path,
                    }
                }
                None => measure_target(path),
            })
            .collect();
        Self { targets }
    }

    /// Plans `selection` and measures every target on disk.
    ///
    /// Symlinks are never followed while measuring. A path that cannot be
    /// inspected is still planned, with zero bytes, so that its failure shows
    /// up in the deletion result.
    pub fn measure<I, P>(selection: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            targets: plan(selection).into_iter().map(measure_target).collect(),
        }
    }

    pub fn targets(&self) -> &[DeletionTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Bytes freed if every target is removed.
    pub fn total_bytes(&self) -> u64 {
        self.targets.iter().map(|t| t.size_bytes).sum()
    }
}

fn measure_target(path: PathBuf) -> DeletionTarget {
    let (size_bytes, kind) = match fs::symlink_metadata(&path) {
        Ok(meta) if meta.is_dir() => (disk_usage(&path), EntryKind::Directory),
        Ok(meta) if meta.is_file() => (meta.len(), EntryKind::File),
        Ok(_) => (0, EntryKind::File),
        Err(e) => {
            tracing::debug!("cannot measure {}: {e}", path.display());
            (0, EntryKind::File)
        }
    };
    DeletionTarget {
        path,
        size_bytes,
        kind,
    }
}

/// Sum of regular file sizes below `dir`; unreadable parts count as zero.
fn disk_usage(dir: &Path) -> u64 {
    let mut total = 0;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let Ok(read_dir) = fs::read_dir(&current) else {
            continue;
        };
        for item in read_dir.flatten() {
            match item.file_type() {
                Ok(ft) if ft.is_dir() => stack.push(item.path()),
                Ok(ft) if ft.is_file() => {
                    total += item.metadata().map(|m| m.len()).unwrap_or(0);
                }
                _ => {}
            }
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::walker::{walk, WalkOptions};
    use crate::progress::{CancelToken, ScanProgress};
    use tempfile::TempDir;

    fn set(paths: &[&str]) -> BTreeSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn plan_drops_descendants_of_selected_dirs() {
        assert_eq!(plan(["/a", "/a/tmp/cache.tmp"]), set(&["/a"]));
    }

    #[test]
    fn plan_compares_whole_components() {
        assert_eq!(plan(["/a", "/ab", "/a/b"]), set(&["/a", "/ab"]));
    }

    #[test]
    fn plan_keeps_independent_subtrees() {
        let planned = plan(["/x/z", "/x/y/1", "/x/y", "/w", "/x/y/2/3"]);
        assert_eq!(planned, set(&["/w", "/x/y", "/x/z"]));
    }

    #[test]
    fn plan_is_an_antichain() {
        let planned = plan(["/r/a/b", "/r", "/s/t", "/s/t/u", "/s/v", "/r/c"]);
        for p in &planned {
            for q in &planned {
                assert!(p == q || !p.starts_with(q), "{p:?} is inside {q:?}");
            }
        }
    }

    #[test]
    fn plan_is_idempotent() {
        let once = plan(["/m/n", "/m", "/o/p", "/o/p/q", "/o/r"]);
        let twice = plan(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn plan_of_nothing_is_empty() {
        assert!(plan(Vec::<PathBuf>::new()).is_empty());
    }

    #[test]
    fn plan_covers_every_selected_path() {
        let selection = ["/q/w/e", "/q", "/z/x", "/z/x/c/v", "/y"];
        let planned = plan(selection);
        for path in selection {
            assert!(planned.iter().any(|top| Path::new(path).starts_with(top)));
        }
    }

    #[test]
    fn from_tree_uses_scanned_sizes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("tmp")).unwrap();
        fs::write(tmp.path().join("tmp/cache.tmp"), "0123456789").unwrap();
        fs::write(tmp.path().join("tmp/other.tmp"), "01234").unwrap();
        fs::write(tmp.path().join("keep.txt"), "k").unwrap();

        let tree = walk(
            tmp.path(),
            &WalkOptions::default(),
            &CancelToken::new(),
            &ScanProgress::default(),
        )
        .unwrap();
        let root = tree.root_entry().path().to_path_buf();
        let plan = DeletionPlan::from_tree(
            [root.join("tmp"), root.join("tmp/cache.tmp")],
            &tree,
        );

        assert_eq!(plan.len(), 1);
        let target = &plan.targets()[0];
        assert_eq!(target.path, root.join("tmp"));
        assert_eq!(target.size_bytes, 15);
        assert_eq!(target.kind, EntryKind::Directory);
        assert_eq!(plan.total_bytes(), 15);
    }

    #[test]
    fn measure_reads_sizes_from_disk() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("d/nested")).unwrap();
        fs::write(tmp.path().join("d/a"), vec![0u8; 100]).unwrap();
        fs::write(tmp.path().join("d/nested/b"), vec![0u8; 20]).unwrap();
        fs::write(tmp.path().join("f"), vec![0u8; 7]).unwrap();

        let plan = DeletionPlan::measure([
            tmp.path().join("d"),
            tmp.path().join("d/a"),
            tmp.path().join("f"),
        ]);

        let sizes: Vec<(u64, EntryKind)> =
            plan.targets().iter().map(|t| (t.size_bytes, t.kind)).collect();
        assert_eq!(sizes, vec![(120, EntryKind::Directory), (7, EntryKind::File)]);
    }

    #[test]
    fn measure_keeps_missing_paths() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");

        let plan = DeletionPlan::measure([&missing]);

        assert_eq!(plan.targets()[0].path, missing);
        assert_eq!(plan.targets()[0].size_bytes, 0);
    }

    #[cfg(unix)]
    #[test]
    fn measure_does_not_follow_symlinks() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("real")).unwrap();
        fs::write(tmp.path().join("real/data"), vec![0u8; 50]).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();

        let plan = DeletionPlan::measure([tmp.path().join("link")]);

        assert_eq!(plan.targets()[0].size_bytes, 0);
        assert_eq!(plan.targets()[0].kind, EntryKind::File);
    }
}
