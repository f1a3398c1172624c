//! Worker threads that measure candidate files
//!
//! Each worker:
//! - Pulls paths from the pending-path queue
//! - Reads metadata without following symlinks
//! - Offers regular files at or above the size threshold to the shared
//!   top-N selection
//!
//! Metadata failures (vanished files, permission errors) drop the path
//! silently. The path still counts as observed.

use crate::error::WorkerError;
use crate::scanner::queue::PathReceiver;
use crate::scanner::stats::{progress_fraction, ScanStats};
use crate::scanner::topn::{FileEntry, SharedTopN};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Progress callback: current path and a coarse completion fraction
pub type ProgressCallback = Arc<dyn Fn(&Path, f64) + Send + Sync>;

/// Optional progress callback. Without one, reporting is a no-op.
#[derive(Clone, Default)]
pub struct ProgressHook {
    callback: Option<ProgressCallback>,
}

impl ProgressHook {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Path, f64) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    #[inline]
    pub fn report(&self, path: &Path, fraction: f64) {
        if let Some(cb) = &self.callback {
            cb(path, fraction);
        }
    }
}

impl fmt::Debug for ProgressHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressHook")
            .field("set", &self.is_set())
            .finish()
    }
}

/// State shared by every worker of one scan
#[derive(Debug)]
pub struct WorkerContext {
    pub min_bytes: u64,
    pub top: Arc<SharedTopN>,
    pub stats: Arc<ScanStats>,
    pub shutdown: Arc<AtomicBool>,
    pub progress: ProgressHook,
}

/// A worker thread draining the pending-path queue
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        ctx: Arc<WorkerContext>,
        queue_rx: PathReceiver,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("topn-worker-{}", id))
            .spawn(move || worker_loop(id, &ctx, &queue_rx))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|panic| WorkerError::Panicked {
                id: self.id,
                message: panic_message(&*panic),
            }),
            None => Ok(()),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Worker thread panicked".into()
    }
}

/// Main worker loop
fn worker_loop(id: usize, ctx: &WorkerContext, queue_rx: &PathReceiver) {
    debug!(worker = id, "Worker starting");

    let mut processed = 0u64;

    while let Some(path) = queue_rx.recv() {
        if ctx.shutdown.load(Ordering::Relaxed) {
            debug!(worker = id, "Shutdown requested, leaving queue");
            break;
        }

        let observed = ctx.stats.record_observed();
        ctx.progress
            .report(&path, progress_fraction(observed, queue_rx.len()));

        if let Some(entry) = measure(&path, ctx.min_bytes) {
            ctx.top.offer(entry);
            ctx.stats.record_matched();
        }
        processed += 1;
    }

    debug!(worker = id, processed = processed, "Worker finished");
}

/// Stat a path and return it as a candidate if it is a regular file of at
/// least `min_bytes`.
pub fn measure(path: &Path, min_bytes: u64) -> Option<FileEntry> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "Metadata read failed");
            return None;
        }
    };

    if !meta.file_type().is_file() {
        return None;
    }

    let size = meta.len();
    (size >= min_bytes).then(|| FileEntry::new(size, path))
}
