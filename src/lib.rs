//! # Minify Image Library
//!
//! Batch image minifier: scans a directory tree for PNG/JPEG/GIF/SVG files,
//! recompresses each one through external codec tools and overwrites the
//! original only when the compressed result beats a strict 15% size margin.
//!
//! ## Module architecture:
//! - `config`: Run configuration and validation
//! - `error`: Custom error types for the different failure classes
//! - `files`: Image discovery and format detection
//! - `tools`: External tool availability probing
//! - `codec`: The `compress(bytes) -> bytes` contract over external tools
//! - `cache`: Persistent content-hash cache of already-processed files
//! - `gatekeeper`: Skip / accept / reject decision for a single file
//! - `minifier`: Sequential run loop and final report
//! - `stats`: Savings accumulator
//! - `progress`: Progress bar wrapper
//!
//! ## Usage:
//! ```rust,no_run
//! use minify_image::{Config, Minifier};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config { write: true, ..Default::default() };
//! let mut minifier = Minifier::new(config)?;
//! let savings = minifier.run(std::path::Path::new(".")).await?;
//! println!("saved {} bytes", savings.saved_bytes);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod files;
pub mod gatekeeper;
pub mod minifier;
pub mod progress;
pub mod stats;
pub mod tools;

pub use cache::HashCache;
pub use codec::{ExternalCodec, ImageCodec};
pub use config::Config;
pub use error::MinifyError;
pub use files::ImageFormat;
pub use gatekeeper::{Gatekeeper, Outcome};
pub use minifier::Minifier;
pub use stats::Savings;
