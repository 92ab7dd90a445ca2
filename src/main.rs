//! # Minify Image - Main Entry Point
//!
//! ## Responsibilities:
//! - Command line parsing with `clap`
//! - Logging initialization with `tracing`
//! - Input validation (the source directory must exist)
//! - Building the `Config` and starting the minifier
//!
//! ## Example usage:
//! ```bash
//! minify-image --src ./public            # dry run, estimate only
//! minify-image --src ./public --write    # overwrite files that beat the margin
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use minify_image::{Config, Minifier};

#[derive(Parser)]
#[command(name = "minify-image")]
#[command(about = "Minify images (PNG, JPEG, GIF, SVG) when compressed size is lower by 15%")]
struct Args {
    /// Overwrite files and record the hash cache. If not set, only estimate
    /// the size difference.
    #[arg(long)]
    write: bool,

    /// The directory to process
    #[arg(long, default_value = ".")]
    src: PathBuf,

    /// JPEG quality for mozjpeg (1-100)
    #[arg(short, long, default_value = "80")]
    quality: u8,

    /// Run a lossless jpegtran pass after mozjpeg, keeping the smaller result
    #[arg(long)]
    jpeg_second_pass: bool,

    /// Namespace of the persistent hash cache
    #[arg(long, default_value = "minify-image")]
    cache_namespace: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments: usage errors abort before any batch work
    if !args.src.exists() {
        return Err(anyhow::anyhow!(
            "Source directory does not exist: {}",
            args.src.display()
        ));
    }
    if !args.src.is_dir() {
        return Err(anyhow::anyhow!(
            "Source path is not a directory: {}",
            args.src.display()
        ));
    }

    let config = Config {
        write: args.write,
        jpeg_quality: args.quality,
        jpeg_second_pass: args.jpeg_second_pass,
        cache_namespace: args.cache_namespace,
        ..Default::default()
    };

    info!("Starting image minification in: {}", args.src.display());

    let mut minifier = Minifier::new(config)?;
    minifier.run(&args.src).await?;

    Ok(())
}
