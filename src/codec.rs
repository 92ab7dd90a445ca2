//! # Codec Module
//!
//! The single contract the rest of the program relies on:
//! `compress(format, bytes) -> bytes | failure`. Compression itself is opaque,
//! delegated entirely to specialized external tools; no in-process image
//! decoding or encoding happens here.
//!
//! ## Tools per format:
//! - **PNG**: `pngquant` (lossy quantization), then `zopflipng` over the
//!   quantized result when available, keeping the smaller output
//! - **JPEG**: `cjpeg` (mozjpeg), with an optional lossless `jpegtran` second
//!   pass behind `config.jpeg_second_pass`
//! - **GIF**: `gifsicle -O3`
//! - **SVG**: `svgo`
//!
//! Each stage runs over temp files in a per-call temp directory; the input
//! buffer and the file on disk are never touched. A format whose tools are
//! all missing yields `MinifyError::MissingDependency`; a tool that runs but
//! fails yields `MinifyError::Compression`. Both are per-file errors that the
//! run loop recovers from.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::MinifyError;
use crate::files::ImageFormat;
use crate::tools::ToolRegistry;

/// Opaque compression contract: bytes in, smaller (hopefully) bytes out
#[async_trait]
pub trait ImageCodec {
    async fn compress(&self, format: ImageFormat, bytes: &[u8]) -> Result<Vec<u8>, MinifyError>;
}

/// Codec implementation that shells out to external tools
pub struct ExternalCodec {
    config: Config,
    tools: ToolRegistry,
}

impl ExternalCodec {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tools: ToolRegistry::new(),
        }
    }

    /// Tool names a format can be compressed with, for diagnostics
    pub fn tools_for(format: ImageFormat) -> &'static [&'static str] {
        match format {
            ImageFormat::Png => &["pngquant", "zopflipng"],
            ImageFormat::Jpeg => &["cjpeg", "jpegtran"],
            ImageFormat::Gif => &["gifsicle"],
            ImageFormat::Svg => &["svgo"],
        }
    }

    /// File extension used for the temp files handed to the tools
    fn extension(format: ImageFormat) -> &'static str {
        match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Svg => "svg",
        }
    }

    /// Run one tool, returning true on zero exit status
    async fn run_tool(&self, tool: &str, args: &[String]) -> Result<bool, MinifyError> {
        let command_name = self.tools.command_name(tool);
        debug!("Running {} {:?}", command_name, args);

        let start_time = std::time::Instant::now();
        let status = Command::new(&command_name).args(args).status().await?;
        let elapsed = start_time.elapsed();

        if status.success() {
            debug!("{} completed in {:?}", tool, elapsed);
            Ok(true)
        } else {
            warn!("{} exited with {} after {:?}", tool, status, elapsed);
            Ok(false)
        }
    }

    /// Read a tool's output file, treating a missing or empty file as failure
    async fn read_output(&self, tool: &str, path: &Path) -> Result<Vec<u8>, MinifyError> {
        match fs::read(path).await {
            Ok(bytes) if !bytes.is_empty() => Ok(bytes),
            Ok(_) => Err(MinifyError::Compression(format!(
                "{} produced an empty output file",
                tool
            ))),
            Err(_) => Err(MinifyError::Compression(format!(
                "{} produced no output file",
                tool
            ))),
        }
    }

    async fn compress_png(&self, work: &Path, input: PathBuf) -> Result<Vec<u8>, MinifyError> {
        let has_pngquant = self.tools.is_available("pngquant").await;
        let has_zopfli = self.tools.is_available("zopflipng").await;

        if !has_pngquant && !has_zopfli {
            return Err(MinifyError::MissingDependency(
                "PNG compression needs pngquant or zopflipng".to_string(),
            ));
        }

        let mut current = input;
        let mut produced = false;

        if has_pngquant {
            let quantized = work.join("quantized.png");
            let args = vec![
                "--strip".to_string(),
                "--force".to_string(),
                format!(
                    "--quality={}-{}",
                    self.config.png_quality_min, self.config.png_quality_max
                ),
                "--output".to_string(),
                quantized.to_string_lossy().into_owned(),
                current.to_string_lossy().into_owned(),
            ];
            // pngquant exits non-zero when the quality floor cannot be met;
            // fall through to zopflipng over the original in that case
            if self.run_tool("pngquant", &args).await? && quantized.exists() {
                current = quantized;
                produced = true;
            }
        }

        if has_zopfli {
            let deflated = work.join("deflated.png");
            let args = vec![
                "-m".to_string(),
                "-y".to_string(),
                current.to_string_lossy().into_owned(),
                deflated.to_string_lossy().into_owned(),
            ];
            if self.run_tool("zopflipng", &args).await? && deflated.exists() {
                let before = fs::metadata(&current).await?.len();
                let after = fs::metadata(&deflated).await?.len();
                if after < before || !produced {
                    current = deflated;
                }
                produced = true;
            }
        }

        if !produced {
            return Err(MinifyError::Compression(
                "all PNG tools failed".to_string(),
            ));
        }
        self.read_output("pngquant/zopflipng", &current).await
    }

    async fn compress_jpeg(&self, work: &Path, input: PathBuf) -> Result<Vec<u8>, MinifyError> {
        let has_cjpeg = self.tools.is_available("cjpeg").await;
        let has_jpegtran = self.tools.is_available("jpegtran").await;

        if !has_cjpeg && !has_jpegtran {
            return Err(MinifyError::MissingDependency(
                "JPEG compression needs cjpeg (mozjpeg) or jpegtran".to_string(),
            ));
        }

        let mut current = input;
        let mut produced = false;

        if has_cjpeg {
            let encoded = work.join("encoded.jpg");
            let args = vec![
                "-quality".to_string(),
                self.config.jpeg_quality.to_string(),
                "-optimize".to_string(),
                "-progressive".to_string(),
                "-outfile".to_string(),
                encoded.to_string_lossy().into_owned(),
                current.to_string_lossy().into_owned(),
            ];
            if self.run_tool("cjpeg", &args).await? && encoded.exists() {
                current = encoded;
                produced = true;
            }
        }

        // Lossless pass: mandatory fallback when cjpeg is unusable, optional
        // second stage otherwise
        let want_jpegtran = !produced || self.config.jpeg_second_pass;
        if has_jpegtran && want_jpegtran {
            let transposed = work.join("lossless.jpg");
            let args = vec![
                "-optimize".to_string(),
                "-progressive".to_string(),
                "-outfile".to_string(),
                transposed.to_string_lossy().into_owned(),
                current.to_string_lossy().into_owned(),
            ];
            if self.run_tool("jpegtran", &args).await? && transposed.exists() {
                let before = fs::metadata(&current).await?.len();
                let after = fs::metadata(&transposed).await?.len();
                if after < before || !produced {
                    current = transposed;
                }
                produced = true;
            }
        }

        if !produced {
            return Err(MinifyError::Compression(
                "all JPEG tools failed".to_string(),
            ));
        }
        self.read_output("cjpeg/jpegtran", &current).await
    }

    async fn compress_gif(&self, work: &Path, input: PathBuf) -> Result<Vec<u8>, MinifyError> {
        if !self.tools.is_available("gifsicle").await {
            return Err(MinifyError::MissingDependency(
                "GIF compression needs gifsicle".to_string(),
            ));
        }

        let output = work.join("optimized.gif");
        let args = vec![
            "-O3".to_string(),
            "--output".to_string(),
            output.to_string_lossy().into_owned(),
            input.to_string_lossy().into_owned(),
        ];
        if !self.run_tool("gifsicle", &args).await? {
            return Err(MinifyError::Compression("gifsicle failed".to_string()));
        }
        self.read_output("gifsicle", &output).await
    }

    async fn compress_svg(&self, work: &Path, input: PathBuf) -> Result<Vec<u8>, MinifyError> {
        if !self.tools.is_available("svgo").await {
            return Err(MinifyError::MissingDependency(
                "SVG compression needs svgo".to_string(),
            ));
        }

        let output = work.join("optimized.svg");
        let args = vec![
            "--input".to_string(),
            input.to_string_lossy().into_owned(),
            "--output".to_string(),
            output.to_string_lossy().into_owned(),
        ];
        if !self.run_tool("svgo", &args).await? {
            return Err(MinifyError::Compression("svgo failed".to_string()));
        }
        self.read_output("svgo", &output).await
    }
}

#[async_trait]
impl ImageCodec for ExternalCodec {
    async fn compress(&self, format: ImageFormat, bytes: &[u8]) -> Result<Vec<u8>, MinifyError> {
        let work = TempDir::new()?;
        let input = work
            .path()
            .join(format!("input.{}", Self::extension(format)));
        fs::write(&input, bytes).await?;

        match format {
            ImageFormat::Png => self.compress_png(work.path(), input).await,
            ImageFormat::Jpeg => self.compress_jpeg(work.path(), input).await,
            ImageFormat::Gif => self.compress_gif(work.path(), input).await,
            ImageFormat::Svg => self.compress_svg(work.path(), input).await,
        }
    }
}
