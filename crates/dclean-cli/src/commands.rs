//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use dclean_core::{
    volume_usage, Category, Config, DeletionMode, DeletionPlan, DeletionResult, ScanReport,
    ScanRequest, Session, SystemTrash,
};

use crate::background::{run_delete, run_scan};
use crate::cli::{CleanArgs, DeleteArgs, ScanArgs};
use crate::render;

pub async fn scan(args: ScanArgs, config: Config) -> anyhow::Result<ExitCode> {
    let include_duplicates = args.duplicates
        || config.scan.include_duplicates
        || args.category == Some(Category::Duplicate);
    let request = ScanRequest::new(args.root, config).with_duplicates(include_duplicates);
    let report = run_scan(&Session::new(), request).await?;

    if args.json {
        println!("{}", render::scan_summary_json(&report)?);
    } else if let Some(category) = args.category {
        print!("{}", render::category_listing(&report, category));
    } else {
        print!("{}", render::scan_summary_text(&report));
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn clean(args: CleanArgs, config: Config) -> anyhow::Result<ExitCode> {
    let mode = DeletionMode::from_permanent(args.permanent || config.delete.permanent);
    let request = ScanRequest::new(args.root, config)
        .with_duplicates(args.category == Category::Duplicate);
    let session = Session::new();
    let report = run_scan(&session, request).await?;

    let plan = DeletionPlan::from_tree(selection(&report, args.category), &report.tree);
    if plan.is_empty() {
        println!("Nothing to clean in {}.", args.category.label());
        return Ok(ExitCode::SUCCESS);
    }
    print!("{}", render::plan_text(&plan, mode));
    if !args.yes {
        println!("Dry run; pass --yes to delete.");
        return Ok(ExitCode::SUCCESS);
    }

    let result = run_delete(&session, plan, mode, Arc::new(SystemTrash)).await?;
    Ok(finish(&result, report.tree.root_entry().path()))
}

pub async fn delete(args: DeleteArgs, config: Config) -> anyhow::Result<ExitCode> {
    let mode = DeletionMode::from_permanent(args.permanent || config.delete.permanent);
    let paths = args
        .paths
        .iter()
        .map(|p| normalize(p).with_context(|| format!("invalid path: {}", p.display())))
        .collect::<anyhow::Result<Vec<PathBuf>>>()?;

    let plan = DeletionPlan::measure(paths);
    let Some(first) = plan.targets().first().map(|t| t.path.clone()) else {
        return Ok(ExitCode::SUCCESS);
    };
    let result = run_delete(&Session::new(), plan, mode, Arc::new(SystemTrash)).await?;
    Ok(finish(&result, first.parent().unwrap_or(first.as_path())))
}

/// Makes `path` absolute with `.` and `..` resolved and the parent's symlinks
/// followed, so two spellings of one file plan to the same target.
///
/// The final component is kept as given: deleting a symlink must remove the
/// link, not what it points to.
fn normalize(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize().map(|p| p.join(name)),
        _ => absolute.canonicalize(),
    };
    Ok(resolved.unwrap_or(absolute))
}

/// Paths selected for a category clean.
///
/// For duplicates the first member of every group (by path) is kept.
fn selection(report: &ScanReport, category: Category) -> Vec<PathBuf> {
    let tree = &report.tree;
    match (category, report.categories.duplicates()) {
        (Category::Duplicate, Some(dups)) => dups
            .groups
            .iter()
            .flat_map(|g| g.members.iter().skip(1))
            .map(|&id| tree.get(id).path().to_path_buf())
            .collect(),
        _ => report
            .categories
            .get(category)
            .iter()
            .map(|&id| tree.get(id).path().to_path_buf())
            .collect(),
    }
}

fn finish(result: &DeletionResult, volume_of: &Path) -> ExitCode {
    let volume = volume_usage(volume_of);
    print!("{}", render::deletion_summary(result, volume.as_ref()));
    if result.failed() > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dclean_core::{scan::scan, CancelToken, ScanProgress};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn duplicate_selection_keeps_one_copy() {
        let tmp = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            fs::write(tmp.path().join(name), "copy").unwrap();
        }
        let request = ScanRequest::new(tmp.path(), Config::default()).with_duplicates(true);
        let report = scan(&request, &CancelToken::new(), &ScanProgress::default()).unwrap();

        let selected = selection(&report, Category::Duplicate);

        let names: Vec<_> = selected
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn category_selection_takes_every_member() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("x.tmp"), "1").unwrap();
        fs::write(tmp.path().join("y.bak"), "2").unwrap();
        fs::write(tmp.path().join("keep.txt"), "3").unwrap();
        let request = ScanRequest::new(tmp.path(), Config::default());
        let report = scan(&request, &CancelToken::new(), &ScanProgress::default()).unwrap();

        assert_eq!(selection(&report, Category::Temporary).len(), 2);
    }

    #[test]
    fn normalize_merges_spellings_of_one_path() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("dir");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("x"), "x").unwrap();

        let paths = [dir.clone(), dir.join("../dir/x"), dir.join("./x")]
            .iter()
            .map(|p| normalize(p).unwrap())
            .collect::<Vec<_>>();
        let plan = DeletionPlan::measure(paths);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.targets()[0].path, dir.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn normalize_keeps_final_symlink() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("target"), "t").unwrap();
        std::os::unix::fs::symlink(tmp.path().join("target"), tmp.path().join("link")).unwrap();

        let normalized = normalize(&tmp.path().join("link")).unwrap();

        assert_eq!(normalized, tmp.path().canonicalize().unwrap().join("link"));
    }
}
