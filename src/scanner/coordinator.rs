//! Scan coordinator - orchestrates one concurrent scan
//!
//! The coordinator is responsible for:
//! - Setting up the pending-path queue, the shared selection and the counters
//! - Spawning the worker pool and running the producer
//! - Cooperative cancellation through a shared shutdown flag
//! - Draining the selection into the final ranked list
//!
//! A scan never fails. Unreadable entries, failed stats, worker spawn
//! failures and cancellation all resolve to a (possibly partial) result.

use crate::config::ScanConfig;
use crate::scanner::exclude::ExcludeMatcher;
use crate::scanner::producer::produce;
use crate::scanner::queue::{PathQueue, QueueStats};
use crate::scanner::stats::{ScanProgress, ScanStats, ScanStatsSnapshot};
use crate::scanner::topn::{FileEntry, SharedTopN};
use crate::scanner::worker::{ProgressHook, Worker, WorkerContext};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a completed scan
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Largest files, sorted by size descending
    pub files: Vec<FileEntry>,

    /// Final counters
    pub stats: ScanStatsSnapshot,

    /// Time taken for the scan
    pub duration: Duration,

    /// Whether the scan ran to the end (vs was cancelled)
    pub completed: bool,
}

/// Scanner lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Draining,
    Complete,
}

/// Finds the largest files under a root directory
pub struct Scanner {
    /// Configuration
    config: ScanConfig,

    /// Compiled exclusion rules
    matcher: ExcludeMatcher,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,

    /// Counters of the current (or last) scan
    stats: Arc<ScanStats>,

    /// Queue counters of the current (or last) scan
    queue_stats: Arc<QueueStats>,

    state: ScanState,
}

impl Scanner {
    /// Create a new scanner with its own shutdown flag
    pub fn new(config: ScanConfig) -> Self {
        Self::with_shutdown(config, Arc::new(AtomicBool::new(false)))
    }

    /// Create a scanner that stops when `shutdown` is set
    pub fn with_shutdown(config: ScanConfig, shutdown: Arc<AtomicBool>) -> Self {
        let matcher = ExcludeMatcher::new(config.exclude.as_slice());
        let stats = Arc::new(ScanStats::new(config.top_n));

        Self {
            config,
            matcher,
            shutdown,
            stats,
            queue_stats: Arc::new(QueueStats::default()),
            state: ScanState::Idle,
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Request cancellation of a running scan
    pub fn cancel(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Live counters, readable from other threads while the scan runs
    pub fn stats_handle(&self) -> Arc<ScanStats> {
        Arc::clone(&self.stats)
    }

    /// Queue counters of the last scan
    pub fn queue_stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.queue_stats)
    }

    /// Snapshot of progress for display
    pub fn progress(&self, elapsed: Duration) -> ScanProgress {
        let queue = &self.queue_stats;
        ScanProgress {
            stats: self.stats.snapshot(),
            queue_size: queue.enqueued().saturating_sub(queue.dequeued()) as usize,
            total_workers: self.config.worker_count(),
            elapsed,
        }
    }

    /// Run a scan without progress reporting
    pub fn scan(&mut self) -> ScanResult {
        self.run(ProgressHook::none())
    }

    /// Run a scan, calling `callback` once per observed path
    pub fn scan_with_progress<F>(&mut self, callback: F) -> ScanResult
    where
        F: Fn(&Path, f64) + Send + Sync + 'static,
    {
        self.run(ProgressHook::new(callback))
    }

    /// Run a scan with an already-built progress hook
    pub fn run(&mut self, progress: ProgressHook) -> ScanResult {
        let start = Instant::now();
        let worker_count = self.config.worker_count();

        info!(
            root = %self.config.root.display(),
            min_bytes = self.config.min_bytes,
            top_n = self.config.top_n,
            workers = worker_count,
            excludes = self.matcher.len(),
            "Starting scan"
        );

        // Counters are reset in place so handles taken earlier stay live
        self.stats.reset();
        let top = Arc::new(SharedTopN::new(self.config.top_n));
        let queue = PathQueue::new(self.config.queue_size);
        self.queue_stats = queue.stats();
        let (queue_tx, queue_rx) = queue.split();

        let ctx = Arc::new(WorkerContext {
            min_bytes: self.config.min_bytes,
            top: Arc::clone(&top),
            stats: Arc::clone(&self.stats),
            shutdown: Arc::clone(&self.shutdown),
            progress,
        });

        self.state = ScanState::Scanning;

        let mut workers = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            match Worker::spawn(id, Arc::clone(&ctx), queue_rx.clone()) {
                Ok(worker) => workers.push(worker),
                Err(e) => warn!(error = %e, "Continuing with fewer workers"),
            }
        }
        // Only workers hold receivers now, so the producer sees them all exit
        drop(queue_rx);
        debug!(count = workers.len(), "Workers spawned");

        let producer_stats = produce(&self.config.root, &self.matcher, queue_tx, &self.shutdown);

        for worker in workers {
            if let Err(e) = worker.join() {
                warn!(error = %e, "Worker failed to join cleanly");
            }
        }

        self.state = ScanState::Draining;
        let files = top.drain();
        let stats = self.stats.snapshot();
        let completed = !self.shutdown.load(Ordering::Relaxed) && !producer_stats.interrupted;
        let duration = start.elapsed();
        self.state = ScanState::Complete;

        info!(
            observed = stats.observed,
            matched = stats.matched,
            retained = stats.retained,
            excluded = producer_stats.excluded,
            errors = producer_stats.errors,
            completed = completed,
            duration_ms = duration.as_millis() as u64,
            "Scan finished"
        );

        ScanResult {
            files,
            stats,
            duration,
            completed,
        }
    }
}

/// Scan once with the given configuration
pub fn scan(config: ScanConfig) -> ScanResult {
    Scanner::new(config).scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_sized(dir: &Path, name: &str, size: usize) {
        fs::write(dir.join(name), vec![0u8; size]).unwrap();
    }

    #[test]
    fn test_scan_top_two() {
        let dir = tempdir().unwrap();
        write_sized(dir.path(), "a", 10);
        write_sized(dir.path(), "b", 2000);
        write_sized(dir.path(), "c", 500);
        write_sized(dir.path(), "d", 3000);

        let config = ScanConfig::new(dir.path())
            .with_min_bytes(100)
            .with_top_n(2)
            .with_workers(3);
        let mut scanner = Scanner::new(config);
        assert_eq!(scanner.state(), ScanState::Idle);

        let result = scanner.scan();
        let sizes: Vec<u64> = result.files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, vec![3000, 2000]);
        assert_eq!(result.stats.observed, 4);
        assert_eq!(result.stats.retained, 2);
        assert_eq!(result.stats.matched, 3);
        assert!(result.completed);
        assert_eq!(scanner.state(), ScanState::Complete);
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempdir().unwrap();
        write_sized(dir.path(), "a", 10);

        let scanner_config = ScanConfig::new(dir.path()).with_min_bytes(0);
        let mut scanner = Scanner::new(scanner_config);
        scanner.cancel();

        let result = scanner.scan();
        assert!(!result.completed);
        assert!(result.files.is_empty());
        assert_eq!(result.stats.observed, 0);
    }

    #[test]
    fn test_rescan_resets_counters() {
        let dir = tempdir().unwrap();
        write_sized(dir.path(), "a", 10);

        let mut scanner = Scanner::new(ScanConfig::new(dir.path()).with_min_bytes(1));
        let first = scanner.scan();
        let second = scanner.scan();
        assert_eq!(first.stats, second.stats);
        assert_eq!(second.files.len(), 1);
    }

    #[test]
    fn test_progress_snapshot() {
        let dir = tempdir().unwrap();
        write_sized(dir.path(), "a", 10);

        let mut scanner = Scanner::new(ScanConfig::new(dir.path()).with_workers(2));
        scanner.scan();

        let progress = scanner.progress(Duration::from_secs(1));
        assert_eq!(progress.stats.observed, 1);
        assert_eq!(progress.queue_size, 0);
        assert_eq!(progress.total_workers, 2);
        assert_eq!(scanner.queue_stats().enqueued(), 1);
    }
}
