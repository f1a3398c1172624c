//! Progress reporting and result display for the CLI
//!
//! Provides a live spinner using indicatif and styled summaries via console.

use crate::remove::RemoveReport;
use crate::scanner::{FileEntry, ScanResult};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Paths longer than this are shortened from the left in the results table
const MAX_PATH_WIDTH: usize = 70;

/// Progress reporter that displays scan status
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display with the path a worker just reached
    pub fn update(&self, observed: u64, matched: u64, current: &Path) {
        let rate = {
            let secs = self.bar.elapsed().as_secs_f64();
            if secs > 0.0 {
                observed as f64 / secs
            } else {
                0.0
            }
        };

        let msg = format!(
            "Files: {} | Matched: {} | Rate: {:.0}/s | {}",
            format_number(observed),
            format_number(matched),
            rate,
            shorten_path(&current.display().to_string(), 50),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Keep the tail of a long path, prefixed with "..."
pub fn shorten_path(path: &str, max: usize) -> String {
    let count = path.chars().count();
    if count <= max || max <= 3 {
        return path.to_string();
    }

    let tail: String = path.chars().skip(count - (max - 3)).collect();
    format!("...{}", tail)
}

/// Print a header at the start of the scan
pub fn print_header(root: &str, min: &str, top_n: usize, workers: usize) {
    println!();
    println!(
        "{} {}",
        style("topn").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Minimum:").bold(), min);
    println!("  {} {}", style("Top:").bold(), top_n);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!();
}

/// Print a summary of the scan
pub fn print_summary(result: &ScanResult, min: &str) {
    let stats = &result.stats;
    let secs = result.duration.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.observed as f64 / secs
    } else {
        0.0
    };

    println!();
    if result.completed {
        println!("{}", style("Scan Complete").green().bold());
    } else {
        println!("{}", style("Scan Interrupted (partial results)").yellow().bold());
    }
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Files seen:").bold(),
        format_number(stats.observed)
    );
    println!(
        "  {} {} (>= {})",
        style("Matched:").bold(),
        format_number(stats.matched),
        min
    );
    println!(
        "  {} {}",
        style("Kept:").bold(),
        format_number(stats.retained)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        secs,
        rate
    );
    println!();
}

/// Print the ranked results table
pub fn print_results(files: &[FileEntry]) {
    if files.is_empty() {
        println!("{}", style("No large files found.").green());
        return;
    }

    println!(
        "{:<5} {:<12} {}",
        style("Rank").bold(),
        style("Size").bold(),
        style("Path").bold()
    );
    println!("{:<5} {:<12} {}", "----", "----", "-".repeat(50));

    for (i, file) in files.iter().enumerate() {
        println!(
            "{:<5} {:<12} {}",
            format!("#{}", i + 1),
            format_size(file.size, BINARY),
            shorten_path(&file.path.display().to_string(), MAX_PATH_WIDTH)
        );
    }

    let total: u64 = files.iter().map(|f| f.size).sum();
    println!();
    println!(
        "  {} {}",
        style("Total:").bold(),
        format_size(total, BINARY)
    );
}

/// Print what a removal pass did
pub fn print_remove_report(report: &RemoveReport) {
    println!();
    println!(
        "{} {} files, freed {}",
        style("Removed").green().bold(),
        report.removed.len(),
        format_size(report.freed_bytes, BINARY)
    );

    for (path, reason) in &report.failed {
        println!(
            "  {} {}: {}",
            style("failed").red(),
            path.display(),
            reason
        );
    }
}
