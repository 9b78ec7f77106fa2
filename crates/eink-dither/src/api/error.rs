//! Unified error type for the eink-dither public API.
//!
//! [`DitherError`] covers every way a caller can hand the crate malformed
//! input, for convenient `?` propagation in application code.

use std::fmt;

/// Unified error type for the eink-dither public API.
///
/// # Example
///
/// ```
/// use eink_dither::{DitherError, GrayImage};
///
/// fn make() -> Result<GrayImage, DitherError> {
///     GrayImage::new(2, 2, vec![0; 4])
/// }
/// assert!(make().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DitherError {
    /// Pixel buffer length does not match the declared dimensions.
    BufferSize { expected: usize, actual: usize },
    /// An option was outside its accepted range.
    InvalidOption { name: &'static str, value: String },
    /// A dithering algorithm name was not recognised.
    UnknownAlgorithm(String),
}

impl fmt::Display for DitherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherError::BufferSize { expected, actual } => write!(
                f,
                "pixel buffer has {} bytes, expected {}",
                actual, expected
            ),
            DitherError::InvalidOption { name, value } => {
                write!(f, "invalid value for {}: {}", name, value)
            }
            DitherError::UnknownAlgorithm(name) => {
                write!(f, "unknown dithering algorithm: {}", name)
            }
        }
    }
}

impl std::error::Error for DitherError {}
