//! Single-threaded directory traversal feeding the worker pool
//!
//! The producer walks the tree with `walkdir`, never following symlinks.
//! Excluded directories are pruned as a whole, excluded files are skipped, and
//! every remaining non-directory, non-symlink path is pushed onto the pending
//! queue. Unreadable entries are skipped and the walk carries on.

use crate::scanner::exclude::ExcludeMatcher;
use crate::scanner::queue::{PathSender, SendOutcome};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use walkdir::WalkDir;

/// Counters for one traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Paths pushed onto the queue
    pub enqueued: u64,

    /// Entries skipped because they matched an exclusion rule
    pub excluded: u64,

    /// Symlinks skipped
    pub symlinks: u64,

    /// Entries that could not be read
    pub errors: u64,

    /// Whether the walk stopped early on shutdown or lost all workers
    pub interrupted: bool,
}

/// Walk `root` and enqueue candidate paths until done or shut down.
///
/// Consumes the sender so the queue closes when the walk ends.
pub fn produce(
    root: &Path,
    matcher: &ExcludeMatcher,
    queue_tx: PathSender,
    shutdown: &AtomicBool,
) -> ProducerStats {
    let mut stats = ProducerStats::default();

    let mut excluded = 0u64;

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let mut iter = walker.filter_entry(|entry| {
        // Prunes the whole subtree when a directory matches
        let skip = matcher.is_match(entry.path());
        if skip {
            excluded += 1;
        }
        !skip
    });

    loop {
        if shutdown.load(Ordering::Relaxed) {
            stats.interrupted = true;
            break;
        }

        let entry = match iter.next() {
            Some(Ok(entry)) => entry,
            Some(Err(e)) => {
                stats.errors += 1;
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
            None => break,
        };

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            stats.symlinks += 1;
            continue;
        }
        if file_type.is_dir() {
            continue;
        }

        match queue_tx.send(entry.into_path(), shutdown) {
            SendOutcome::Sent => stats.enqueued += 1,
            SendOutcome::Cancelled | SendOutcome::Disconnected => {
                stats.interrupted = true;
                break;
            }
        }
    }

    drop(iter);
    stats.excluded = excluded;

    debug!(
        enqueued = stats.enqueued,
        excluded = stats.excluded,
        symlinks = stats.symlinks,
        errors = stats.errors,
        interrupted = stats.interrupted,
        "Traversal finished"
    );

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::queue::PathQueue;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn collect(root: &Path, rules: &[&str]) -> (ProducerStats, Vec<PathBuf>) {
        let (tx, rx) = PathQueue::new(1024).split();
        let shutdown = AtomicBool::new(false);
        let stats = produce(root, &ExcludeMatcher::new(rules), tx, &shutdown);

        let mut paths = Vec::new();
        while let Some(p) = rx.recv() {
            paths.push(p);
        }
        paths.sort();
        (stats, paths)
    }

    #[test]
    fn test_enqueues_files_only() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.bin"), b"x").unwrap();
        fs::write(dir.path().join("a/b/deep.bin"), b"x").unwrap();

        let (stats, paths) = collect(dir.path(), &[]);
        assert_eq!(stats.enqueued, 2);
        assert!(!stats.interrupted);
        assert_eq!(
            paths,
            vec![dir.path().join("a/b/deep.bin"), dir.path().join("top.bin")]
        );
    }

    #[test]
    fn test_prunes_excluded_subtree() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), b"x").unwrap();
        fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        fs::write(dir.path().join("drop.log"), b"x").unwrap();

        let (stats, paths) = collect(dir.path(), &["node_modules", "*.log"]);
        assert_eq!(paths, vec![dir.path().join("keep.txt")]);
        // The pruned directory counts once, its contents are never visited
        assert_eq!(stats.excluded, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_skips_symlinks() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

        let (stats, paths) = collect(dir.path(), &[]);
        assert_eq!(stats.symlinks, 2);
        assert_eq!(paths, vec![dir.path().join("real")]);
    }

    #[test]
    fn test_shutdown_before_start() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f"), b"x").unwrap();

        let (tx, rx) = PathQueue::new(8).split();
        let shutdown = AtomicBool::new(true);
        let stats = produce(dir.path(), &ExcludeMatcher::default(), tx, &shutdown);

        assert!(stats.interrupted);
        assert_eq!(stats.enqueued, 0);
        assert_eq!(rx.recv(), None);
    }

    #[test]
    fn test_missing_root_is_not_fatal() {
        let dir = tempdir().unwrap();
        let (stats, paths) = collect(&dir.path().join("nope"), &[]);
        assert_eq!(stats.errors, 1);
        assert!(paths.is_empty());
    }
}
