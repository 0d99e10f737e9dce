//! Capacity of the volume holding a path, for "freed X% of drive" reports.

use std::path::{Path, PathBuf};

use sysinfo::Disks;

/// Size figures for one mounted volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeUsage {
    pub mount_point: PathBuf,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl VolumeUsage {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    /// `bytes` as a percentage of the volume's capacity; 0 when the capacity is unknown.
    pub fn percent_of_total(&self, bytes: u64) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Looks up the volume that `path` lives on.
///
/// Returns `None` when no mounted volume contains the path, which callers
/// treat as "capacity unknown" rather than an error.
pub fn volume_usage(path: &Path) -> Option<VolumeUsage> {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();
    let volumes = disks.list().iter().map(|d| VolumeUsage {
        mount_point: d.mount_point().to_path_buf(),
        total_bytes: d.total_space(),
        available_bytes: d.available_space(),
    });
    let found = containing_volume(&path, volumes);
    if found.is_none() {
        tracing::debug!("no mounted volume contains {}", path.display());
    }
    found
}

/// Picks the volume with the longest mount point that is a prefix of `path`.
fn containing_volume(
    path: &Path,
    volumes: impl IntoIterator<Item = VolumeUsage>,
) -> Option<VolumeUsage> {
    volumes
        .into_iter()
        .filter(|v| path.starts_with(&v.mount_point))
        .max_by_key(|v| v.mount_point.components().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(mount: &str, total: u64) -> VolumeUsage {
        VolumeUsage {
            mount_point: PathBuf::from(mount),
            total_bytes: total,
            available_bytes: total / 2,
        }
    }

    #[test]
    fn innermost_mount_wins() {
        let volumes = vec![volume("/", 1000), volume("/home", 500), volume("/home/user/usb", 64)];

        let found = containing_volume(Path::new("/home/user/docs/a.txt"), volumes).unwrap();

        assert_eq!(found.mount_point, PathBuf::from("/home"));
    }

    #[test]
    fn mount_prefix_matches_whole_components() {
        let volumes = vec![volume("/", 1000), volume("/home", 500)];

        let found = containing_volume(Path::new("/homework/a.txt"), volumes).unwrap();

        assert_eq!(found.mount_point, PathBuf::from("/"));
    }

    #[test]
    fn no_containing_mount_is_none() {
        assert!(containing_volume(Path::new("/data"), vec![volume("/mnt", 10)]).is_none());
    }

    #[test]
    fn percent_of_total() {
        let v = volume("/", 2000);
        assert_eq!(v.percent_of_total(500), 25.0);
        assert_eq!(v.used_bytes(), 1000);
        assert_eq!(volume("/", 0).percent_of_total(500), 0.0);
    }

    #[test]
    fn current_dir_volume_is_found_when_disks_are_listed() {
        let cwd = std::env::current_dir().unwrap();
        if let Some(v) = volume_usage(&cwd) {
            assert!(cwd.canonicalize().unwrap().starts_with(&v.mount_point));
        }
    }
}
