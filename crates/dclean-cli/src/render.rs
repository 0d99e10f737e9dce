//! Text and JSON rendering of scan reports, plans and deletion results.

use std::fmt::Write;

use dclean_core::{
    format_size, Category, DeletionMode, DeletionPlan, DeletionResult, ScanReport, VolumeUsage,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub root: String,
    pub total_bytes: u64,
    pub files: usize,
    pub directories: usize,
    pub skipped: usize,
    pub categories: Vec<CategorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_groups: Option<Vec<GroupSummary>>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub name: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub size: u64,
    pub hash: String,
    pub reclaimable_bytes: u64,
    pub paths: Vec<String>,
}

impl ScanSummary {
    pub fn from_report(report: &ScanReport) -> Self {
        let tree = &report.tree;
        let categories = Category::ALL
            .into_iter()
            .filter(|&c| report.categories.is_enabled(c))
            .map(|c| CategorySummary {
                name: c.name(),
                label: c.label(),
                count: report.categories.get(c).len(),
                bytes: report.categories.total_bytes(c, tree),
            })
            .collect();
        let duplicate_groups = report.categories.duplicates().map(|dups| {
            dups.groups
                .iter()
                .map(|g| GroupSummary {
                    size: g.size,
                    hash: g.hash.clone(),
                    reclaimable_bytes: g.reclaimable_bytes(),
                    paths: g
                        .members
                        .iter()
                        .map(|&id| tree.get(id).path().display().to_string())
                        .collect(),
                })
                .collect()
        });
        Self {
            root: tree.root_entry().path().display().to_string(),
            total_bytes: tree.total_bytes(),
            files: tree.file_count(),
            directories: tree.dir_count(),
            skipped: tree.skipped().len(),
            categories,
            duplicate_groups,
        }
    }
}

pub fn scan_summary_json(report: &ScanReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&ScanSummary::from_report(report))?)
}

pub fn scan_summary_text(report: &ScanReport) -> String {
    let summary = ScanSummary::from_report(report);
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.root);
    let _ = writeln!(
        out,
        "  {} in {} files, {} directories ({} skipped)",
        format_size(summary.total_bytes),
        summary.files,
        summary.directories,
        summary.skipped
    );
    let _ = writeln!(out);
    for c in &summary.categories {
        let _ = writeln!(
            out,
            "  {:<34} {:>8} items {:>12}",
            c.label,
            c.count,
            format_size(c.bytes)
        );
    }
    if let Some(dups) = report.categories.duplicates() {
        let _ = writeln!(
            out,
            "\n  {} duplicate groups, {} reclaimable",
            dups.groups.len(),
            format_size(dups.reclaimable_bytes())
        );
    }
    out
}

/// Lists the members of one category, one path per line.
pub fn category_listing(report: &ScanReport, category: Category) -> String {
    let tree = &report.tree;
    let mut out = String::new();
    let _ = writeln!(out, "{}:", category.label());

    if category == Category::Duplicate {
        let Some(dups) = report.categories.duplicates() else {
            let _ = writeln!(out, "  (duplicate detection was not run; pass --duplicates)");
            return out;
        };
        for group in &dups.groups {
            let _ = writeln!(
                out,
                "  {} x {} ({} reclaimable)",
                group.members.len(),
                format_size(group.size),
                format_size(group.reclaimable_bytes())
            );
            for &id in &group.members {
                let _ = writeln!(out, "    {}", tree.get(id).path().display());
            }
        }
        return out;
    }
    if !report.categories.is_enabled(category) {
        let _ = writeln!(
            out,
            "  (not enabled; set categories.never_accessed_days in the config)"
        );
        return out;
    }

    for &id in report.categories.get(category) {
        let entry = tree.get(id);
        let _ = writeln!(
            out,
            "  {:>12}  {}",
            format_size(entry.size_bytes()),
            entry.path().display()
        );
    }
    out
}

pub fn plan_text(plan: &DeletionPlan, mode: DeletionMode) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} paths ({}):",
        mode_verb(mode),
        plan.len(),
        format_size(plan.total_bytes())
    );
    for target in plan.targets() {
        let _ = writeln!(
            out,
            "  {:>12}  {}",
            format_size(target.size_bytes),
            target.path.display()
        );
    }
    out
}

/// Summarizes a deletion run, relating the freed bytes to `volume` when known.
pub fn deletion_summary(result: &DeletionResult, volume: Option<&VolumeUsage>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} succeeded ({} files, {} folders), {} freed",
        mode_verb(result.mode),
        result.succeeded,
        result.files_removed,
        result.dirs_removed,
        format_size(result.bytes_freed)
    );
    if let Some(volume) = volume {
        let _ = writeln!(
            out,
            "  ({:.2}% of drive {})",
            volume.percent_of_total(result.bytes_freed),
            volume.mount_point.display()
        );
    }
    let failed = result.failed();
    if failed > 0 {
        let _ = writeln!(out, "{failed} failed:");
        for (path, reason) in result.failures() {
            let _ = writeln!(out, "  {}: {reason}", path.display());
        }
    }
    out
}

fn mode_verb(mode: DeletionMode) -> &'static str {
    match mode {
        DeletionMode::ToTrash => "Move to trash",
        DeletionMode::Permanent => "Permanently delete",
    }
}
