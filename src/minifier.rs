//! # Minifier Run Loop Module
//!
//! Orchestrates one minification run: discovers images format by format
//! (PNG, JPEG, GIF, SVG), feeds them one at a time through the gatekeeper
//! and reports the accumulated savings at the end.
//!
//! Processing is strictly sequential; the only suspension points are file
//! I/O and the external compression call. The hash cache is loaded once
//! before the loop and persisted once after it, and only in write mode —
//! a dry run touches neither the files nor the cache.
//!
//! Per-file failures (unreadable file, missing tool, tool error) are logged
//! and counted, and the batch continues; nothing short of a usage error
//! aborts a run.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cache::HashCache;
use crate::codec::{ExternalCodec, ImageCodec};
use crate::config::Config;
use crate::files::{find_images, format_size, ImageFormat};
use crate::gatekeeper::Gatekeeper;
use crate::progress::ProgressManager;
use crate::stats::Savings;

/// Sequential driver for a whole directory tree
pub struct Minifier<C: ImageCodec = ExternalCodec> {
    config: Config,
    gatekeeper: Gatekeeper<C>,
    cache_dir: Option<PathBuf>,
}

impl Minifier<ExternalCodec> {
    /// Create a minifier backed by the external codec tools
    pub fn new(config: Config) -> Result<Self> {
        let codec = ExternalCodec::new(config.clone());
        Self::with_codec(config, codec)
    }
}

impl<C: ImageCodec> Minifier<C> {
    /// Create a minifier with an explicit codec implementation
    pub fn with_codec(config: Config, codec: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gatekeeper: Gatekeeper::new(codec, config.clone()),
            config,
            cache_dir: None,
        })
    }

    /// Override the cache directory (default: `~/.minify-image`)
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Run the minification over a directory tree and return the savings
    pub async fn run(&mut self, src: &Path) -> Result<Savings> {
        // Discover all candidates up front, grouped per format
        let mut files: Vec<(PathBuf, ImageFormat)> = Vec::new();
        for format in ImageFormat::ALL {
            let found = find_images(src, format)?;
            debug!("Found {} {} files", found.len(), format);
            for path in found {
                files.push((path, format));
            }
        }

        if self.config.write {
            info!("Write mode: files and cache will be updated");
        } else {
            info!("Dry run: only estimating size difference");
        }
        info!("Found {} image files in {}", files.len(), src.display());

        let mut cache = self.load_cache().await?;
        let mut savings = Savings::new();

        if files.is_empty() {
            info!("No image files found to process");
            return Ok(savings);
        }

        let progress = ProgressManager::new(files.len() as u64);

        for (path, format) in &files {
            match self.gatekeeper.process(path, *format, &mut cache).await {
                Ok(outcome) => {
                    savings.record(&outcome);
                    progress.update(&format!(
                        "{} ({})",
                        path.file_name().unwrap_or_default().to_string_lossy(),
                        format
                    ));
                }
                Err(e) => {
                    // Never fatal: log, count, move on to the next file
                    warn!("skip minify (error): {}: {:#}", path.display(), e);
                    savings.record_error();
                    progress.update("error");
                }
            }
        }

        progress.finish(&savings.format_summary());

        // Scoped persistence: flushed once, on normal completion only
        if self.config.write {
            debug!("save cache to disk ({} entries)", cache.len());
            cache.save().await?;
        }

        info!("All image size: {}", format_size(savings.original_bytes));
        if self.config.write {
            info!(
                "Images optimized, saving: {}, {:.2}%",
                format_size(savings.saved_bytes),
                savings.saved_percent()
            );
        } else {
            info!(
                "Estimated saving: {}, {:.2}%",
                format_size(savings.saved_bytes),
                savings.saved_percent()
            );
        }

        Ok(savings)
    }

    async fn load_cache(&self) -> Result<HashCache> {
        if !self.config.write {
            // Dry run neither consults nor persists the store
            return Ok(HashCache::in_memory());
        }
        match &self.cache_dir {
            Some(dir) => HashCache::load_from(dir, &self.config.cache_namespace).await,
            None => HashCache::load(&self.config.cache_namespace).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MinifyError;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Codec that halves the payload (always beats the 15% margin)
    struct HalvingCodec;

    #[async_trait]
    impl ImageCodec for HalvingCodec {
        async fn compress(
            &self,
            _format: ImageFormat,
            bytes: &[u8],
        ) -> Result<Vec<u8>, MinifyError> {
            Ok(bytes[..bytes.len() / 2].to_vec())
        }
    }

    /// Codec that shaves one byte (never beats the margin)
    struct BarelyCodec;

    #[async_trait]
    impl ImageCodec for BarelyCodec {
        async fn compress(
            &self,
            _format: ImageFormat,
            bytes: &[u8],
        ) -> Result<Vec<u8>, MinifyError> {
            Ok(bytes[..bytes.len() - 1].to_vec())
        }
    }

    /// Codec that always fails
    struct FailingCodec;

    #[async_trait]
    impl ImageCodec for FailingCodec {
        async fn compress(
            &self,
            _format: ImageFormat,
            _bytes: &[u8],
        ) -> Result<Vec<u8>, MinifyError> {
            Err(MinifyError::Compression("no tools".to_string()))
        }
    }

    fn populate_tree(root: &Path) {
        std::fs::write(root.join("a.png"), vec![1u8; 1000]).unwrap();
        std::fs::write(root.join("b.jpg"), vec![2u8; 2000]).unwrap();
        std::fs::write(root.join("c.gif"), vec![3u8; 500]).unwrap();
        std::fs::write(root.join("notes.txt"), b"not an image").unwrap();
    }

    fn config(write: bool) -> Config {
        Config {
            write,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dry_run_modifies_nothing() {
        let tree = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        populate_tree(tree.path());

        let mut minifier = Minifier::with_codec(config(false), HalvingCodec)
            .unwrap()
            .with_cache_dir(cache_dir.path().to_path_buf());
        let savings = minifier.run(tree.path()).await.unwrap();

        assert_eq!(savings.files_processed, 3);
        assert_eq!(savings.files_accepted, 3);
        assert_eq!(savings.original_bytes, 3500);
        assert_eq!(savings.saved_bytes, 500 + 1000 + 250);

        // Files untouched, no cache file created
        assert_eq!(std::fs::read(tree.path().join("a.png")).unwrap().len(), 1000);
        assert_eq!(std::fs::read(tree.path().join("b.jpg")).unwrap().len(), 2000);
        assert!(!cache_dir.path().join("minify-image.json").exists());
    }

    #[tokio::test]
    async fn test_write_run_then_idempotent_second_run() {
        let tree = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        populate_tree(tree.path());

        let mut minifier = Minifier::with_codec(config(true), HalvingCodec)
            .unwrap()
            .with_cache_dir(cache_dir.path().to_path_buf());

        let first = minifier.run(tree.path()).await.unwrap();
        assert_eq!(first.files_accepted, 3);
        assert_eq!(first.saved_bytes, 1750);
        assert_eq!(std::fs::read(tree.path().join("a.png")).unwrap().len(), 500);
        assert!(cache_dir.path().join("minify-image.json").exists());

        // Second run over the already-minified tree: all cache skips
        let before: Vec<u8> = std::fs::read(tree.path().join("a.png")).unwrap();
        let second = minifier.run(tree.path()).await.unwrap();
        assert_eq!(second.files_skipped, 3);
        assert_eq!(second.files_accepted, 0);
        assert_eq!(second.saved_bytes, 0);
        assert_eq!(std::fs::read(tree.path().join("a.png")).unwrap(), before);
    }

    #[tokio::test]
    async fn test_dry_run_predicts_write_run() {
        let tree = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        populate_tree(tree.path());

        let mut dry = Minifier::with_codec(config(false), HalvingCodec)
            .unwrap()
            .with_cache_dir(cache_dir.path().to_path_buf());
        let estimate = dry.run(tree.path()).await.unwrap();

        let mut wet = Minifier::with_codec(config(true), HalvingCodec)
            .unwrap()
            .with_cache_dir(cache_dir.path().to_path_buf());
        let actual = wet.run(tree.path()).await.unwrap();

        assert_eq!(estimate.saved_bytes, actual.saved_bytes);
        assert_eq!(estimate.original_bytes, actual.original_bytes);
    }

    #[tokio::test]
    async fn test_rejected_files_stay_and_are_cached() {
        let tree = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        std::fs::write(tree.path().join("a.png"), vec![1u8; 1000]).unwrap();

        let mut minifier = Minifier::with_codec(config(true), BarelyCodec)
            .unwrap()
            .with_cache_dir(cache_dir.path().to_path_buf());

        let first = minifier.run(tree.path()).await.unwrap();
        assert_eq!(first.files_rejected, 1);
        assert_eq!(first.saved_bytes, 0);
        assert_eq!(std::fs::read(tree.path().join("a.png")).unwrap().len(), 1000);

        // The unchanged file is skipped next run thanks to its cached hash
        let second = minifier.run(tree.path()).await.unwrap();
        assert_eq!(second.files_skipped, 1);
    }

    #[tokio::test]
    async fn test_per_file_errors_do_not_abort_the_batch() {
        let tree = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        populate_tree(tree.path());

        let mut minifier = Minifier::with_codec(config(true), FailingCodec)
            .unwrap()
            .with_cache_dir(cache_dir.path().to_path_buf());

        let savings = minifier.run(tree.path()).await.unwrap();
        assert_eq!(savings.errors, 3);
        assert_eq!(savings.files_processed, 3);
        assert_eq!(savings.saved_bytes, 0);
        // Nothing was written or cached for the failed files
        assert_eq!(std::fs::read(tree.path().join("a.png")).unwrap().len(), 1000);
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let tree = TempDir::new().unwrap();
        let mut minifier = Minifier::with_codec(config(false), HalvingCodec).unwrap();
        let savings = minifier.run(tree.path()).await.unwrap();
        assert_eq!(savings.files_processed, 0);
        assert_eq!(savings.saved_bytes, 0);
    }
}
