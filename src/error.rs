//! Error types for topn
//!
//! This module defines the error hierarchy for everything around the scan:
//! - Configuration and CLI errors (sizes, root directory, selections)
//! - Worker thread errors
//! - I/O errors raised by the CLI collaborators
//!
//! The scan itself is best-effort and never surfaces an error. Traversal and
//! metadata failures are skipped where they happen, and worker failures are
//! logged and absorbed by the coordinator.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the topn application
#[derive(Error, Debug)]
pub enum TopnError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (terminal prompts, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Interrupted by signal
    #[error("Operation interrupted by signal")]
    Interrupted,
}

/// Configuration and CLI errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Size string could not be parsed
    #[error("Invalid size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },

    /// Root is missing or not a directory
    #[error("Invalid root directory '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be at most {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Rank selection for removal could not be parsed
    #[error("Invalid selection '{input}': {reason}")]
    InvalidSelection { input: String, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be started
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },
}

/// Result type alias for TopnError
pub type Result<T> = std::result::Result<T, TopnError>;
