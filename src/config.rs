//! Configuration types for topn
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime scan configuration with validation
//! - Human-friendly size parsing ("1G", "500M", "1.5GB")

use crate::error::ConfigError;
use crate::scanner::queue::DEFAULT_QUEUE_SIZE;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 1024;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Default number of results
pub const DEFAULT_TOP_N: usize = 50;

/// Workers per logical CPU when no count is given; stat calls are I/O bound
const WORKERS_PER_CPU: usize = 4;

/// Find the largest files under a directory
#[derive(Parser, Debug, Clone)]
#[command(
    name = "topn",
    version,
    about = "Find the N largest files under a directory",
    long_about = "Walks a directory tree concurrently and reports the largest regular files.\n\n\
                  Only the top N files are kept in memory while scanning, so huge trees\n\
                  are cheap to audit. Symbolic links are never followed.",
    after_help = "EXAMPLES:\n    \
        topn -d /data -m 1G\n    \
        topn -d ~ -m 500M -n 20 --exclude node_modules --exclude '*.iso'\n    \
        topn -d /var -m 100M -w 32 -v\n    \
        topn -d ~/Downloads -m 1G --remove"
)]
pub struct CliArgs {
    /// Root directory to scan (defaults to $HOME)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Minimum file size (e.g. 1G, 500M, 250K)
    #[arg(short = 'm', long = "min", default_value = "1G", value_name = "SIZE")]
    pub min: String,

    /// Keep only the N largest files
    #[arg(short = 'n', long = "top", default_value_t = DEFAULT_TOP_N, value_name = "NUM")]
    pub top: usize,

    /// Number of worker threads (0 = 4x CPU cores)
    #[arg(short = 'w', long, default_value_t = 0, value_name = "NUM")]
    pub workers: usize,

    /// Pending-path queue size (controls memory usage)
    #[arg(long, default_value_t = DEFAULT_QUEUE_SIZE, value_name = "NUM")]
    pub queue_size: usize,

    /// Exclude paths matching a glob or substring (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Interactively remove files after the scan
    #[arg(long)]
    pub remove: bool,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Default worker count for the machine
pub fn default_workers() -> usize {
    num_cpus::get().max(1) * WORKERS_PER_CPU
}

/// Parse a human-friendly size into bytes.
///
/// Units are binary (`1K` = 1024) and case-insensitive: `K`/`KB`, `M`/`MB`,
/// `G`/`GB`, `T`/`TB`, or `B`/none for bytes. Fractions are allowed and the
/// result is truncated to whole bytes.
pub fn parse_size(input: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSize {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let s = input.trim().to_ascii_uppercase();
    if s.is_empty() {
        return Err(invalid("empty size"));
    }

    let (number, unit) = [
        ("TB", 1u64 << 40),
        ("T", 1 << 40),
        ("GB", 1 << 30),
        ("G", 1 << 30),
        ("MB", 1 << 20),
        ("M", 1 << 20),
        ("KB", 1 << 10),
        ("K", 1 << 10),
        ("B", 1),
    ]
    .iter()
    .find_map(|(suffix, unit)| s.strip_suffix(suffix).map(|n| (n, *unit)))
    .unwrap_or((s.as_str(), 1));

    let number = number.trim();
    let value: f64 = number
        .parse()
        .map_err(|_| invalid("expected a number with an optional K, M, G or T suffix"))?;

    if !value.is_finite() || value < 0.0 {
        return Err(invalid("size must be a non-negative number"));
    }

    let bytes = value * unit as f64;
    if bytes >= u64::MAX as f64 {
        return Err(invalid("size is too large"));
    }

    Ok(bytes as u64)
}

/// Resolve and check the scan root
pub fn resolve_root(dir: &Path) -> Result<PathBuf, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidRoot {
        path: dir.to_path_buf(),
        reason,
    };

    let root = std::path::absolute(dir).map_err(|e| invalid(e.to_string()))?;
    let meta = std::fs::metadata(&root).map_err(|e| invalid(e.to_string()))?;
    if !meta.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }

    Ok(root)
}

/// Validated configuration for one scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory to scan
    pub root: PathBuf,

    /// Smallest file size reported, in bytes
    pub min_bytes: u64,

    /// Number of files to keep (0 keeps none)
    pub top_n: usize,

    /// Worker threads (0 = default heuristic)
    pub workers: usize,

    /// Pending-path queue capacity
    pub queue_size: usize,

    /// Exclusion rules, globs or plain substrings
    pub exclude: Vec<String>,
}

impl ScanConfig {
    /// Configuration with library defaults: no size threshold, top 50,
    /// automatic worker count, no exclusions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            min_bytes: 0,
            top_n: DEFAULT_TOP_N,
            workers: 0,
            queue_size: DEFAULT_QUEUE_SIZE,
            exclude: Vec::new(),
        }
    }

    pub fn with_min_bytes(mut self, min_bytes: u64) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Number of worker threads to start
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            default_workers()
        } else {
            self.workers
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let dir = match &args.dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let root = resolve_root(&dir)?;

        let min_bytes = parse_size(&args.min)?;

        // Validate worker count
        if args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Validate queue size
        if args.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: args.queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        Ok(Self {
            root,
            min_bytes,
            top_n: args.top,
            workers: args.workers,
            queue_size: args.queue_size,
            exclude: args.exclude_patterns.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1G").unwrap(), 1 << 30);
        assert_eq!(parse_size("1.5GB").unwrap(), (1.5 * (1u64 << 30) as f64) as u64);
        assert_eq!(parse_size("500M").unwrap(), 500 << 20);
        assert_eq!(parse_size("1024K").unwrap(), 1 << 20);
        assert_eq!(parse_size("1T").unwrap(), 1 << 40);
        assert_eq!(parse_size("42").unwrap(), 42);
        assert_eq!(parse_size("42B").unwrap(), 42);
    }

    #[test]
    fn test_parse_size_lenient_format() {
        assert_eq!(parse_size(" 250k ").unwrap(), 250 << 10);
        assert_eq!(parse_size("2 mb").unwrap(), 2 << 20);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_size_invalid() {
        assert!(parse_size("").is_err());
        assert!(parse_size("   ").is_err());
        assert!(parse_size("invalid").is_err());
        assert!(parse_size("G").is_err());
        assert!(parse_size("-1G").is_err());
        assert!(parse_size("1Q").is_err());
        assert!(matches!(
            parse_size("abc"),
            Err(ConfigError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_worker_count_default() {
        let config = ScanConfig::new("/");
        assert_eq!(config.worker_count(), default_workers());
        assert!(config.worker_count() >= WORKERS_PER_CPU);

        let config = config.with_workers(3);
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_builder() {
        let config = ScanConfig::new("/data")
            .with_min_bytes(10)
            .with_top_n(5)
            .with_queue_size(64)
            .with_exclude(["*.log", "cache"]);

        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.min_bytes, 10);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.queue_size, 64);
        assert_eq!(config.exclude, vec!["*.log".to_string(), "cache".to_string()]);
    }

    #[test]
    fn test_from_args() {
        let dir = tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();
        let args = CliArgs::parse_from([
            "topn", "-d", dir_arg.as_str(), "-m", "500M", "-n", "10", "--exclude", "*.log",
            "--exclude", "tmp",
        ]);

        let config = ScanConfig::from_args(&args).unwrap();
        assert_eq!(config.min_bytes, 500 << 20);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.exclude, vec!["*.log".to_string(), "tmp".to_string()]);
        assert!(config.root.is_absolute());
    }

    #[test]
    fn test_from_args_invalid() {
        let dir = tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();

        let args = CliArgs::parse_from(["topn", "-d", dir_arg.as_str(), "-m", "lots"]);
        assert!(matches!(
            ScanConfig::from_args(&args),
            Err(ConfigError::InvalidSize { .. })
        ));

        let args = CliArgs::parse_from(["topn", "-d", dir_arg.as_str(), "-w", "5000"]);
        assert!(matches!(
            ScanConfig::from_args(&args),
            Err(ConfigError::InvalidWorkerCount { .. })
        ));

        let args = CliArgs::parse_from(["topn", "-d", dir_arg.as_str(), "--queue-size", "0"]);
        assert!(matches!(
            ScanConfig::from_args(&args),
            Err(ConfigError::InvalidQueueSize { .. })
        ));
    }

    #[test]
    fn test_resolve_root() {
        let dir = tempdir().unwrap();
        assert!(resolve_root(dir.path()).is_ok());

        let missing = dir.path().join("missing");
        assert!(matches!(
            resolve_root(&missing),
            Err(ConfigError::InvalidRoot { .. })
        ));

        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        assert!(resolve_root(&file).is_err());
    }
}
