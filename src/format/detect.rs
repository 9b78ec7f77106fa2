//! Input kind detection.

use serde::Serialize;
use std::fmt;
use std::io::Read;
use std::path::Path;

use super::xtc::XTC_MAGIC;
use crate::error::{ConvertError, ValidationError};

/// File extensions decoded as page images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// What an input path holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A directory of page images (an extracted comic archive)
    ImageFolder,
    /// An XTC container
    Container,
    /// A single page image
    Image,
    /// Pre-rendered document pages with an optional outline
    Document,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputKind::ImageFolder => "image folder",
            InputKind::Container => "container",
            InputKind::Image => "image",
            InputKind::Document => "document",
        })
    }
}

/// True if `path` has a known image extension (case-insensitive)
pub fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// True if `bytes` starts with the container magic
pub fn has_xtc_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4] == XTC_MAGIC
}

/// Classify an input path.
///
/// Directories are image folders; files are sniffed for the container
/// magic before falling back to their extension.
pub fn detect_input(path: &Path) -> Result<InputKind, ConvertError> {
    let meta = std::fs::metadata(path)?;
    if meta.is_dir() {
        return Ok(InputKind::ImageFolder);
    }

    let mut magic = [0u8; 4];
    let mut file = std::fs::File::open(path)?;
    let read = file.read(&mut magic)?;
    if has_xtc_magic(&magic[..read]) {
        return Ok(InputKind::Container);
    }
    if is_image_path(&path.to_string_lossy()) {
        return Ok(InputKind::Image);
    }
    Err(ValidationError::UnsupportedInput(path.display().to_string()).into())
}
