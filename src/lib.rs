//! topn - Find the largest files under a directory
//!
//! Walks a directory tree concurrently and keeps only the N largest regular
//! files seen, so memory use is bounded by N rather than by the size of the
//! tree.
//!
//! # Features
//!
//! - **Parallel Scanning**: A single producer walks the tree while a pool of
//!   worker threads reads file metadata.
//!
//! - **Memory Efficient**: A bounded path queue applies backpressure to the
//!   producer, and the result set is a fixed-size min-heap.
//!
//! - **Exclusions**: Shell globs matched against the full path or the file
//!   name, or plain substrings. Excluded directories are pruned whole.
//!
//! - **Best Effort**: Permission errors and files vanishing mid-scan are
//!   skipped. Cancellation returns whatever was found so far.
//!
//! # Example
//!
//! ```no_run
//! use topn::{ScanConfig, Scanner};
//!
//! let config = ScanConfig::new("/data")
//!     .with_min_bytes(1 << 30)
//!     .with_top_n(20)
//!     .with_exclude(["node_modules", "*.iso"]);
//!
//! let result = Scanner::new(config).scan();
//! for file in &result.files {
//!     println!("{:>12} {}", file.size, file.path.display());
//! }
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod remove;
pub mod scanner;

pub use config::{parse_size, CliArgs, ScanConfig};
pub use error::{ConfigError, Result, TopnError, WorkerError};
pub use scanner::{
    scan, ExcludeMatcher, FileEntry, ProgressHook, ScanResult, ScanStatsSnapshot, Scanner, TopN,
};
