//! # Configuration Management Module
//!
//! Run configuration for the minifier.
//!
//! ## Parameters:
//! - `write`: Overwrite files and record cache entries (default: false = dry-run)
//! - `savings_margin`: Multiplier the compressed size must beat (default: 1.15,
//!   i.e. accept only when `compressed * 1.15 < original`)
//! - `jpeg_quality`: mozjpeg quality (1-100, default: 80)
//! - `png_quality_min`/`png_quality_max`: pngquant quality range (default: 65-90)
//! - `jpeg_second_pass`: Optional lossless jpegtran pass after mozjpeg
//! - `cache_namespace`: Name of the on-disk hash cache file (default: "minify-image")
//!
//! ## Validation:
//! - jpeg_quality must be 1-100
//! - png quality range must be ordered and within 0-100
//! - savings_margin must be greater than 1.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for image minification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Overwrite files and update the hash cache (false = dry-run, estimate only)
    pub write: bool,
    /// Multiplier the compressed size must beat: accept iff compressed * margin < original
    pub savings_margin: f64,
    /// JPEG quality for mozjpeg (1-100)
    pub jpeg_quality: u8,
    /// Lower bound of the pngquant quality range (0-100)
    pub png_quality_min: u8,
    /// Upper bound of the pngquant quality range (0-100)
    pub png_quality_max: u8,
    /// Run a lossless jpegtran pass after mozjpeg, keeping the smaller result
    pub jpeg_second_pass: bool,
    /// Namespace of the persistent hash cache file
    pub cache_namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write: false,
            savings_margin: 1.15,
            jpeg_quality: 80,
            png_quality_min: 65,
            png_quality_max: 90,
            jpeg_second_pass: false,
            cache_namespace: "minify-image".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(anyhow::anyhow!("JPEG quality must be between 1 and 100"));
        }

        if self.png_quality_max > 100 || self.png_quality_min > self.png_quality_max {
            return Err(anyhow::anyhow!(
                "PNG quality range must be ordered and within 0-100"
            ));
        }

        if self.savings_margin <= 1.0 {
            return Err(anyhow::anyhow!("Savings margin must be greater than 1.0"));
        }

        if self.cache_namespace.is_empty() {
            return Err(anyhow::anyhow!("Cache namespace must not be empty"));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
