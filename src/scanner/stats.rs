//! Scan statistics shared by all workers

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters, incremented concurrently by the workers
#[derive(Debug)]
pub struct ScanStats {
    /// Paths taken off the queue
    observed: AtomicU64,

    /// Regular files at or above the size threshold
    matched: AtomicU64,

    /// Capacity of the selection set
    top_n: usize,
}

impl ScanStats {
    pub fn new(top_n: usize) -> Self {
        Self {
            observed: AtomicU64::new(0),
            matched: AtomicU64::new(0),
            top_n,
        }
    }

    /// Record an observed path, returning the new total
    pub fn record_observed(&self) -> u64 {
        self.observed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_matched(&self) {
        self.matched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn observed(&self) -> u64 {
        self.observed.load(Ordering::Relaxed)
    }

    pub fn matched(&self) -> u64 {
        self.matched.load(Ordering::Relaxed)
    }

    /// Files currently held by the selection set.
    ///
    /// Every matched file is offered and the set holds `min(offers, N)`
    /// entries, so this is exact without taking the selection lock.
    pub fn retained(&self) -> u64 {
        self.matched().min(self.top_n as u64)
    }

    /// Zero the counters before a new scan
    pub fn reset(&self) {
        self.observed.store(0, Ordering::Relaxed);
        self.matched.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ScanStatsSnapshot {
        ScanStatsSnapshot {
            observed: self.observed(),
            matched: self.matched(),
            retained: self.retained(),
        }
    }
}

/// Point-in-time copy of the scan counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStatsSnapshot {
    /// Paths observed by workers
    pub observed: u64,

    /// Regular files meeting the size threshold
    pub matched: u64,

    /// Files held in the top-N selection
    pub retained: u64,
}

/// Progress information for display
#[derive(Debug, Clone, Default)]
pub struct ScanProgress {
    pub stats: ScanStatsSnapshot,
    pub queue_size: usize,
    pub total_workers: usize,
    pub elapsed: Duration,
}

impl ScanProgress {
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.stats.observed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coarse completion estimate: work done over work known so far
pub fn progress_fraction(observed: u64, queued: usize) -> f64 {
    let total = observed + queued as u64;
    if total == 0 {
        0.0
    } else {
        observed as f64 / total as f64
    }
}
