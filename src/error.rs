//! # Error Types Module
//!
//! Custom error types for the minifier. Per-file errors (`Io`, `Compression`,
//! `MissingDependency`) are recovered in the run loop: logged, the file is
//! skipped, the batch continues. Only usage/validation errors abort the run.

/// Custom error types for image minification
#[derive(thiserror::Error, Debug)]
pub enum MinifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
