//! Bounded top-N selection
//!
//! Keeps the N largest files offered so far in a min-heap of capacity N, so
//! memory stays proportional to N no matter how many files the tree holds.
//! Each offer costs O(log N); the only full sort happens in [`TopN::drain`].
//!
//! Files of equal size have no defined relative order, neither inside the
//! heap nor in the drained list.

use parking_lot::Mutex;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::path::PathBuf;

/// A regular file and its size in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub size: u64,
    pub path: PathBuf,
}

impl FileEntry {
    pub fn new(size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            size,
            path: path.into(),
        }
    }
}

/// Heap slot ordered by size alone
#[derive(Debug)]
struct BySize(FileEntry);

impl PartialEq for BySize {
    fn eq(&self, other: &Self) -> bool {
        self.0.size == other.0.size
    }
}

impl Eq for BySize {}

impl PartialOrd for BySize {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BySize {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.size.cmp(&other.0.size)
    }
}

/// Fixed-capacity selection of the largest files seen so far
#[derive(Debug)]
pub struct TopN {
    capacity: usize,
    heap: BinaryHeap<Reverse<BySize>>,
}

impl TopN {
    /// Create a selection holding at most `capacity` files.
    /// A capacity of zero retains nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            // Bounded by the capacity, but don't trust a huge N for the allocation
            heap: BinaryHeap::with_capacity(capacity.min(4096)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Smallest size currently retained
    pub fn min_size(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(slot)| slot.0.size)
    }

    /// Offer a file. Returns true if it was retained.
    pub fn offer(&mut self, entry: FileEntry) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(BySize(entry)));
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut smallest) if smallest.0 .0.size < entry.size => {
                // Replacing through PeekMut re-sifts on drop
                *smallest = Reverse(BySize(entry));
                true
            }
            _ => false,
        }
    }

    /// Empty the selection, returning its files largest first
    pub fn drain(&mut self) -> Vec<FileEntry> {
        std::mem::take(&mut self.heap)
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(slot)| slot.0)
            .collect()
    }
}

/// [`TopN`] behind a single lock, shared by all workers
#[derive(Debug)]
pub struct SharedTopN {
    inner: Mutex<TopN>,
}

impl SharedTopN {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(TopN::new(capacity)),
        }
    }

    pub fn offer(&self, entry: FileEntry) -> bool {
        self.inner.lock().offer(entry)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn min_size(&self) -> Option<u64> {
        self.inner.lock().min_size()
    }

    pub fn drain(&self) -> Vec<FileEntry> {
        self.inner.lock().drain()
    }
}
