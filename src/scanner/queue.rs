//! Pending-path queue with backpressure
//!
//! A bounded crossbeam channel between the single producer and the worker
//! pool. When the queue is full the producer blocks instead of buffering, which
//! caps memory on wide trees. Blocking sends wake up periodically so the
//! producer can notice cancellation even while every worker has stopped.

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_QUEUE_SIZE: usize = 1000;

/// How long a blocked send waits before re-checking for shutdown
const SEND_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Statistics for the path queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total paths enqueued
    pub enqueued: AtomicU64,

    /// Total paths dequeued
    pub dequeued: AtomicU64,

    /// Number of sends that found the queue full
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dequeued(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Outcome of a producer send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The path is in the queue
    Sent,
    /// Shutdown was requested while waiting for room
    Cancelled,
    /// Every worker is gone
    Disconnected,
}

/// Bounded queue of paths waiting to be measured
pub struct PathQueue {
    sender: Sender<PathBuf>,
    receiver: Receiver<PathBuf>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl PathQueue {
    /// Create a new queue. A capacity of zero is raised to one; a rendezvous
    /// channel would serialize the producer with every worker.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Split into the producer and consumer ends.
    ///
    /// The queue closes when the sender is dropped, and reports
    /// [`SendOutcome::Disconnected`] once every receiver clone is dropped.
    pub fn split(self) -> (PathSender, PathReceiver) {
        (
            PathSender {
                sender: self.sender,
                stats: Arc::clone(&self.stats),
            },
            PathReceiver {
                receiver: self.receiver,
                stats: self.stats,
            },
        )
    }
}

/// Producer end of the queue
pub struct PathSender {
    sender: Sender<PathBuf>,
    stats: Arc<QueueStats>,
}

impl PathSender {
    /// Send a path, blocking while the queue is full.
    pub fn send(&self, path: PathBuf, shutdown: &AtomicBool) -> SendOutcome {
        let mut path = match self.sender.try_send(path) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                return SendOutcome::Sent;
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                return SendOutcome::Disconnected;
            }
            Err(crossbeam_channel::TrySendError::Full(path)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                path
            }
        };

        loop {
            if shutdown.load(Ordering::Relaxed) {
                return SendOutcome::Cancelled;
            }

            match self.sender.send_timeout(path, SEND_POLL_INTERVAL) {
                Ok(()) => {
                    self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                    return SendOutcome::Sent;
                }
                Err(SendTimeoutError::Timeout(p)) => path = p,
                Err(SendTimeoutError::Disconnected(_)) => return SendOutcome::Disconnected,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Consumer end of the queue (clone for each worker)
#[derive(Clone)]
pub struct PathReceiver {
    receiver: Receiver<PathBuf>,
    stats: Arc<QueueStats>,
}

impl PathReceiver {
    /// Receive a path, blocking until one is available.
    /// Returns `None` once the queue is closed and empty.
    pub fn recv(&self) -> Option<PathBuf> {
        match self.receiver.recv() {
            Ok(path) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(path)
            }
            Err(_) => None,
        }
    }

    /// Try to receive a path without blocking
    pub fn try_recv(&self) -> Option<PathBuf> {
        match self.receiver.try_recv() {
            Ok(path) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(path)
            }
            Err(_) => None,
        }
    }

    /// Current number of queued paths
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
