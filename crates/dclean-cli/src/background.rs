//! Driving the core session tasks from the command line.
//!
//! The scan runs on the session's worker while this side keeps a spinner on
//! stderr up to date and turns Ctrl-C into a cancellation request.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dclean_core::{
    format_size, DeletionMode, DeletionPlan, DeletionResult, ProgressSnapshot, ScanPhase,
    ScanReport, ScanRequest, Session, TrashCan,
};
use indicatif::{ProgressBar, ProgressStyle};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Runs a scan to completion, cancelling it on Ctrl-C.
pub async fn run_scan(session: &Session, request: ScanRequest) -> anyhow::Result<ScanReport> {
    let handle = session.start_scan(request)?;
    let progress = handle.progress_source();
    let cancel = handle.cancel_token();

    let spinner = spinner();
    let wait = handle.wait();
    tokio::pin!(wait);
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
    let mut interrupted = false;

    let result = loop {
        tokio::select! {
            result = &mut wait => break result,
            _ = ticker.tick() => {
                if let Some(message) = progress_message(&progress.snapshot()) {
                    spinner.set_message(message);
                }
            }
            signal = tokio::signal::ctrl_c(), if !interrupted => {
                if let Err(e) = signal {
                    tracing::warn!("failed to listen for Ctrl-C: {e}");
                }
                interrupted = true;
                cancel.cancel();
                spinner.suspend(|| tracing::info!("cancellation requested"));
            }
        }
    };
    spinner.finish_and_clear();
    Ok(result?)
}

/// Runs a deletion to completion. Deletion is never interrupted once started.
pub async fn run_delete(
    session: &Session,
    plan: DeletionPlan,
    mode: DeletionMode,
    trash: Arc<dyn TrashCan>,
) -> anyhow::Result<DeletionResult> {
    let handle = session.start_delete(plan, mode, trash)?;
    handle.wait().await.context("deletion did not run")
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// One-line description of a scan's progress, or `None` once it is done.
fn progress_message(snap: &ProgressSnapshot) -> Option<String> {
    let line = match snap.phase {
        ScanPhase::Walking => format!(
            "scanning: {} files, {} dirs, {}",
            snap.files_seen,
            snap.dirs_seen,
            format_size(snap.bytes_seen)
        ),
        ScanPhase::Categorizing => format!("categorizing {} files", snap.files_seen),
        ScanPhase::Hashing => format!(
            "hashing: {}/{} candidates",
            snap.files_hashed, snap.hash_candidates
        ),
        ScanPhase::Done => return None,
    };
    Some(line)
}
