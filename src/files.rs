//! # File Discovery Module
//!
//! Image discovery and format detection.
//!
//! ## Responsibilities:
//! - Recursive discovery of image files per format with `walkdir`
//! - Format detection from file extension (case-insensitive)
//! - Human-readable size formatting for the final report
//!
//! ## Supported formats:
//! - **Raster**: PNG, JPEG (`.jpg`/`.jpeg`), GIF
//! - **Vector**: SVG
//!
//! `node_modules/` and `vendor/` directories are never descended into.

use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories excluded from discovery
const IGNORED_DIRS: &[&str] = &["node_modules", "vendor"];

/// Image formats handled by the minifier, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Svg,
}

impl ImageFormat {
    /// All formats in the order they are processed
    pub const ALL: [ImageFormat; 4] = [Self::Png, Self::Jpeg, Self::Gif, Self::Svg];

    /// Detect the format of a file from its extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Format name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Svg => "SVG",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Find all images of one format under a directory, sorted for a stable
/// processing order
pub fn find_images(root: &Path, format: ImageFormat) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e.path()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if ImageFormat::from_path(path) == Some(format) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_ignored_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| IGNORED_DIRS.contains(&n))
        .unwrap_or(false)
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            ImageFormat::from_path(Path::new("a/photo.JPG")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("icon.jpeg")),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("logo.Png")),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("anim.gif")),
            Some(ImageFormat::Gif)
        );
        assert_eq!(
            ImageFormat::from_path(Path::new("art.svg")),
            Some(ImageFormat::Svg)
        );
        assert_eq!(ImageFormat::from_path(Path::new("doc.pdf")), None);
        assert_eq!(ImageFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_find_images_skips_ignored_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(root.join("vendor")).unwrap();
        std::fs::write(root.join("assets/a.png"), b"x").unwrap();
        std::fs::write(root.join("b.png"), b"x").unwrap();
        std::fs::write(root.join("node_modules/pkg/c.png"), b"x").unwrap();
        std::fs::write(root.join("vendor/d.png"), b"x").unwrap();
        std::fs::write(root.join("e.jpg"), b"x").unwrap();

        let pngs = find_images(root, ImageFormat::Png).unwrap();
        assert_eq!(pngs.len(), 2);
        assert!(pngs.iter().all(|p| !p.to_string_lossy().contains("node_modules")));
        assert!(pngs.iter().all(|p| !p.to_string_lossy().contains("vendor")));

        let jpegs = find_images(root, ImageFormat::Jpeg).unwrap();
        assert_eq!(jpegs.len(), 1);
    }

    #[test]
    fn test_find_images_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("z.gif"), b"x").unwrap();
        std::fs::write(root.join("a.gif"), b"x").unwrap();

        let gifs = find_images(root, ImageFormat::Gif).unwrap();
        assert!(gifs[0].ends_with("a.gif"));
        assert!(gifs[1].ends_with("z.gif"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
    }
}
