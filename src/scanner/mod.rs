//! Concurrent largest-file scanner
//!
//! One producer walks the tree and feeds a bounded queue; a pool of workers
//! stats each path and offers qualifying files to a shared top-N selection.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │   Producer (caller)     │
//!                     │  - walkdir, no symlinks │
//!                     │  - prune excluded dirs  │
//!                     └───────────┬─────────────┘
//!                                 │ bounded queue (backpressure)
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker N │
//! │  lstat    │             │  lstat    │             │  lstat    │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └─────────────────────────┼─────────────────────────┘
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │  SharedTopN (min-heap)  │
//!                     └─────────────────────────┘
//! ```

pub mod coordinator;
pub mod exclude;
pub mod producer;
pub mod queue;
pub mod stats;
pub mod topn;
pub mod worker;

pub use coordinator::{scan, ScanResult, ScanState, Scanner};
pub use exclude::ExcludeMatcher;
pub use stats::{ScanProgress, ScanStats, ScanStatsSnapshot};
pub use topn::{FileEntry, SharedTopN, TopN};
pub use worker::{ProgressCallback, ProgressHook};
