//! Background scan and delete tasks with one-shot result handoff.
//!
//! A [`Session`] runs at most one scan and at most one deletion at a time.
//! Starting a task while another of the same kind is still running is
//! rejected with [`CoreError::Busy`]; the running task is left untouched.
//! Work runs on Tokio's blocking pool so filesystem I/O never stalls the
//! caller, and the finished result is handed over whole through a oneshot
//! channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::delete::{execute, DeletionMode, DeletionPlan, DeletionResult, TrashCan};
use crate::error::{CoreError, CoreResult, ScanError, TaskKind};
use crate::progress::{CancelToken, ProgressSnapshot, ScanProgress};
use crate::scan::{scan, ScanReport, ScanRequest};

/// Owner of the scan and delete task slots.
#[derive(Debug, Clone, Default)]
pub struct Session {
    scan_busy: Arc<AtomicBool>,
    delete_busy: Arc<AtomicBool>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a task of `kind` is currently running.
    pub fn is_busy(&self, kind: TaskKind) -> bool {
        self.slot(kind).load(Ordering::Acquire)
    }

    /// Starts a scan on the blocking pool.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`CoreError::Busy`] if a scan is already running in this session.
    pub fn start_scan(&self, request: ScanRequest) -> CoreResult<ScanHandle> {
        let slot = TaskSlot::acquire(self.slot(TaskKind::Scan), TaskKind::Scan)?;
        let cancel = CancelToken::new();
        let progress = ScanProgress::new();
        let (tx, rx) = oneshot::channel();

        tracing::info!("starting scan of {}", request.root.display());
        let worker_cancel = cancel.clone();
        let worker_progress = Arc::clone(&progress);
        tokio::task::spawn_blocking(move || {
            let result = scan(&request, &worker_cancel, &worker_progress);
            drop(slot);
            let _ = tx.send(result);
        });

        Ok(ScanHandle {
            cancel,
            progress,
            rx,
        })
    }

    /// Starts removing the targets of `plan` on the blocking pool.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// [`CoreError::Busy`] if a deletion is already running in this session.
    pub fn start_delete(
        &self,
        plan: DeletionPlan,
        mode: DeletionMode,
        trash: Arc<dyn TrashCan>,
    ) -> CoreResult<DeleteHandle> {
        let slot = TaskSlot::acquire(self.slot(TaskKind::Delete), TaskKind::Delete)?;
        let cancel = CancelToken::new();
        let (tx, rx) = oneshot::channel();

        let worker_cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let result = run_delete(&plan, mode, trash.as_ref(), &worker_cancel);
            drop(slot);
            let _ = tx.send(result);
        });

        Ok(DeleteHandle { cancel, rx })
    }

    fn slot(&self, kind: TaskKind) -> &Arc<AtomicBool> {
        match kind {
            TaskKind::Scan => &self.scan_busy,
            TaskKind::Delete => &self.delete_busy,
        }
    }
}

/// Marks a task slot busy for as long as it lives, including during a panic unwind.
#[derive(Debug)]
struct TaskSlot {
    busy: Arc<AtomicBool>,
}

impl TaskSlot {
    fn acquire(busy: &Arc<AtomicBool>, kind: TaskKind) -> CoreResult<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::Busy(kind))?;
        Ok(Self {
            busy: Arc::clone(busy),
        })
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Cancellation is only honoured before execution starts; a run in
/// progress always finishes.
fn run_delete(
    plan: &DeletionPlan,
    mode: DeletionMode,
    trash: &dyn TrashCan,
    cancel: &CancelToken,
) -> CoreResult<DeletionResult> {
    if cancel.is_cancelled() {
        tracing::info!("deletion cancelled before start; nothing removed");
        return Err(CoreError::Cancelled);
    }
    Ok(execute(plan, mode, trash))
}

/// A running scan.
#[derive(Debug)]
pub struct ScanHandle {
    cancel: CancelToken,
    progress: Arc<ScanProgress>,
    rx: oneshot::Receiver<Result<ScanReport, ScanError>>,
}

impl ScanHandle {
    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// Shared progress counters, for polling after the handle is consumed by [`wait`](Self::wait).
    pub fn progress_source(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Requests cancellation; the worker stops at its next polling point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Waits for the finished report.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Scan`] when the scan failed or was cancelled.
    /// - [`CoreError::WorkerLost`] when the worker died without a result.
    pub async fn wait(self) -> CoreResult<ScanReport> {
        match self.rx.await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CoreError::WorkerLost),
        }
    }
}

/// A pending or running deletion.
#[derive(Debug)]
pub struct DeleteHandle {
    cancel: CancelToken,
    rx: oneshot::Receiver<CoreResult<DeletionResult>>,
}

impl DeleteHandle {
    /// Cancels the deletion if it has not started yet. Has no effect on a
    /// run already in progress.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the deletion result.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Cancelled`] when cancelled before it started.
    /// - [`CoreError::WorkerLost`] when the worker died without a result.
    pub async fn wait(self) -> CoreResult<DeletionResult> {
        self.rx.await.unwrap_or(Err(CoreError::WorkerLost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::config::settings::Config;
    use crate::delete::NoTrash;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.tmp"), "temporary").unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();
        tmp
    }

    #[tokio::test]
    async fn scan_result_is_handed_off() {
        let tmp = fixture();
        let session = Session::new();

        let handle = session
            .start_scan(ScanRequest::new(tmp.path(), Config::default()))
            .unwrap();
        let report = handle.wait().await.unwrap();

        assert_eq!(report.categories.get(Category::Temporary).len(), 1);
        assert_eq!(report.categories.get(Category::ZeroByteOrEmpty).len(), 1);
        assert!(!session.is_busy(TaskKind::Scan));
    }

    #[tokio::test]
    async fn second_scan_is_rejected_while_one_runs() {
        let tmp = fixture();
        let session = Session::new();
        let held = TaskSlot::acquire(&session.scan_busy, TaskKind::Scan).unwrap();

        let err = session
            .start_scan(ScanRequest::new(tmp.path(), Config::default()))
            .unwrap_err();
        assert!(matches!(err, CoreError::Busy(TaskKind::Scan)));

        drop(held);
        let handle = session
            .start_scan(ScanRequest::new(tmp.path(), Config::default()))
            .unwrap();
        assert!(handle.wait().await.is_ok());
    }

    #[tokio::test]
    async fn slot_is_free_after_wait() {
        let tmp = fixture();
        let session = Session::new();

        for _ in 0..2 {
            let handle = session
                .start_scan(ScanRequest::new(tmp.path(), Config::default()))
                .unwrap();
            handle.wait().await.unwrap();
        }
    }

    #[tokio::test]
    async fn scan_and_delete_slots_are_independent() {
        let tmp = fixture();
        let session = Session::new();
        let _held = TaskSlot::acquire(&session.scan_busy, TaskKind::Scan).unwrap();

        let plan = DeletionPlan::measure([tmp.path().join("a.tmp")]);
        let handle = session
            .start_delete(plan, DeletionMode::Permanent, Arc::new(NoTrash))
            .unwrap();
        let result = handle.wait().await.unwrap();

        assert_eq!(result.succeeded, 1);
        assert_eq!(result.bytes_freed, 9);
        assert!(!tmp.path().join("a.tmp").exists());
    }

    #[tokio::test]
    async fn missing_root_surfaces_scan_error() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new();

        let handle = session
            .start_scan(ScanRequest::new(tmp.path().join("missing"), Config::default()))
            .unwrap();

        assert!(matches!(
            handle.wait().await,
            Err(CoreError::Scan(ScanError::RootNotFound(_)))
        ));
    }

    #[test]
    fn delete_cancelled_before_start_removes_nothing() {
        let tmp = fixture();
        let plan = DeletionPlan::measure([tmp.path().join("a.tmp")]);
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = run_delete(&plan, DeletionMode::Permanent, &NoTrash, &cancel);

        assert!(matches!(result, Err(CoreError::Cancelled)));
        assert!(tmp.path().join("a.tmp").exists());
    }

    #[test]
    fn slot_guard_releases_on_drop() {
        let busy = Arc::new(AtomicBool::new(false));
        let slot = TaskSlot::acquire(&busy, TaskKind::Delete).unwrap();
        assert!(matches!(
            TaskSlot::acquire(&busy, TaskKind::Delete),
            Err(CoreError::Busy(TaskKind::Delete))
        ));

        drop(slot);
        assert!(TaskSlot::acquire(&busy, TaskKind::Delete).is_ok());
    }
}
