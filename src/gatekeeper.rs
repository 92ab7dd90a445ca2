//! # Compression Gatekeeper Module
//!
//! The only stateful decision in the program: for a single candidate file,
//! either skip it (content hash already processed), accept the recompression
//! (savings beat the margin, overwrite in place), or reject it (record the
//! hash so the next run skips it, write nothing).
//!
//! ## Decision flow for `process()`:
//! 1. Read file bytes, compute the content digest
//! 2. Write mode + digest cached → `Skipped`
//! 3. Invoke the codec; a failure propagates to the caller, which logs it
//!    and moves on to the next file
//! 4. Accept iff `compressed_len * margin < original_len` (strict `<`):
//!    - accepted + write: overwrite the file, cache the digest of the
//!      *compressed* bytes (that is what the next run will read back)
//!    - rejected + write: cache the original digest so the unchanged file
//!      is skipped next run
//!    - dry-run: no writes, no cache mutation; the same comparison drives
//!      the savings estimate so it matches a later write run exactly

use anyhow::Result;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::cache::{digest, HashCache};
use crate::codec::ImageCodec;
use crate::config::Config;
use crate::files::{format_size, ImageFormat};

/// Result of gating one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Content hash already in the cache; nothing was done
    Skipped { original: u64 },
    /// Savings beat the margin; in write mode the file was overwritten
    Accepted { original: u64, compressed: u64 },
    /// Savings below the margin; in write mode the original hash was cached
    Rejected { original: u64 },
}

impl Outcome {
    /// Original file size in bytes, whatever the decision was
    pub fn original(&self) -> u64 {
        match *self {
            Outcome::Skipped { original }
            | Outcome::Accepted { original, .. }
            | Outcome::Rejected { original } => original,
        }
    }

    /// Bytes saved by this decision (zero unless accepted)
    pub fn saved(&self) -> u64 {
        match *self {
            Outcome::Accepted {
                original,
                compressed,
            } => original.saturating_sub(compressed),
            _ => 0,
        }
    }
}

/// Strict acceptance test: the compressed size inflated by the margin must
/// still be below the original. Equality is a rejection.
pub fn should_accept(original_len: u64, compressed_len: u64, margin: f64) -> bool {
    (compressed_len as f64) * margin < original_len as f64
}

/// Applies the skip/accept/reject policy to single files
pub struct Gatekeeper<C: ImageCodec> {
    codec: C,
    config: Config,
}

impl<C: ImageCodec> Gatekeeper<C> {
    pub fn new(codec: C, config: Config) -> Self {
        Self { codec, config }
    }

    /// Process one file. Errors (read, compress, write) are returned to the
    /// caller, which logs them and continues with the batch.
    pub async fn process(
        &self,
        path: &Path,
        format: ImageFormat,
        cache: &mut HashCache,
    ) -> Result<Outcome> {
        let bytes = fs::read(path).await?;
        let original_len = bytes.len() as u64;
        let original_hash = digest(&bytes);

        if self.config.write && cache.contains(&original_hash) {
            info!(
                "{} already compressed, hash: {}",
                path.display(),
                original_hash
            );
            return Ok(Outcome::Skipped {
                original: original_len,
            });
        }

        let compressed = self.codec.compress(format, &bytes).await?;
        let compressed_len = compressed.len() as u64;

        info!(
            "{} original size: {}, compressed size: {}",
            path.display(),
            format_size(original_len),
            format_size(compressed_len)
        );

        if should_accept(original_len, compressed_len, self.config.savings_margin) {
            if self.config.write {
                fs::write(path, &compressed).await?;
                let compressed_hash = digest(&compressed);
                debug!("{} compressed, {} hash", path.display(), compressed_hash);
                cache.insert(compressed_hash);
            }
            Ok(Outcome::Accepted {
                original: original_len,
                compressed: compressed_len,
            })
        } else {
            if self.config.write {
                // Remember the unchanged file so the next run skips it
                cache.insert(original_hash);
            }
            Ok(Outcome::Rejected {
                original: original_len,
            })
        }
    }
}
