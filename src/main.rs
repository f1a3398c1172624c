//! topn - Find the largest files under a directory
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use topn::config::{CliArgs, ScanConfig};
use topn::progress::{
    print_header, print_remove_report, print_results, print_summary, ProgressReporter,
};
use topn::remove::prompt_and_remove;
use topn::scanner::Scanner;
use topn::TopnError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Redraw the spinner every this many observed paths
const PROGRESS_EVERY: u64 = 256;

/// Conventional exit status for SIGINT
const EXIT_INTERRUPTED: u8 = 130;

/// What a Ctrl-C should do at this point of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Stop the scan and keep its partial results
    StopScan,
    /// Leave immediately
    Exit,
}

/// The first Ctrl-C during a scan stops it gracefully. A second one, or any
/// after the scan (e.g. at the removal prompt, where reads are restarted
/// after the signal), exits.
fn interrupt_action(scan_done: bool, stop_requested: bool) -> InterruptAction {
    if scan_done || stop_requested {
        InterruptAction::Exit
    } else {
        InterruptAction::StopScan
    }
}

fn log_filter(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "topn=debug,warn"
    } else if quiet {
        "topn=warn"
    } else {
        "topn=info,warn"
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if matches!(e.downcast_ref::<TopnError>(), Some(TopnError::Interrupted)) => {
            eprintln!("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet)?;

    // Validate and create config
    let config = ScanConfig::from_args(&args).context("Invalid configuration")?;

    let show_progress = !args.quiet;
    if show_progress {
        print_header(
            &config.root.display().to_string(),
            &args.min,
            config.top_n,
            config.worker_count(),
        );
    }

    let mut scanner = Scanner::new(config);

    // Setup signal handler for graceful shutdown
    let shutdown_flag = scanner.shutdown_flag();
    let scan_done = Arc::new(AtomicBool::new(false));
    let handler_done = Arc::clone(&scan_done);
    ctrlc::set_handler(move || {
        let action = interrupt_action(
            handler_done.load(Ordering::SeqCst),
            shutdown_flag.load(Ordering::SeqCst),
        );
        match action {
            InterruptAction::StopScan => {
                eprintln!("\nInterrupt received, finishing with partial results...");
                shutdown_flag.store(true, Ordering::SeqCst);
            }
            InterruptAction::Exit => {
                eprintln!("\nInterrupted");
                std::process::exit(i32::from(EXIT_INTERRUPTED));
            }
        }
    })
    .context("Failed to set signal handler")?;

    let result = if show_progress {
        let reporter = Arc::new(ProgressReporter::new());
        reporter.set_status("Scanning...");

        let stats = scanner.stats_handle();
        let calls = AtomicU64::new(0);
        let sink = Arc::clone(&reporter);
        let result = scanner.scan_with_progress(move |path, _fraction| {
            if calls.fetch_add(1, Ordering::Relaxed) % PROGRESS_EVERY == 0 {
                sink.update(stats.observed(), stats.matched(), path);
            }
        });

        if result.completed {
            reporter.finish_and_clear();
        } else {
            reporter.finish("Scan interrupted");
        }
        result
    } else {
        scanner.scan()
    };
    scan_done.store(true, Ordering::SeqCst);

    if show_progress {
        print_summary(&result, &args.min);
    }
    print_results(&result.files);

    // Partial results are shown but never offered for removal
    if !result.completed {
        info!("Scan was interrupted before completion");
        return Err(TopnError::Interrupted.into());
    }

    if args.remove && !result.files.is_empty() {
        match prompt_and_remove(&Term::stdout(), &result.files) {
            Ok(Some(report)) => print_remove_report(&report),
            Ok(None) => {}
            Err(TopnError::Interrupted) => return Err(TopnError::Interrupted.into()),
            Err(e) => return Err(e).context("File removal aborted"),
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = EnvFilter::new(log_filter(verbose, quiet));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
