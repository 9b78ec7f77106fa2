//! Preprocessing options and configuration.
//!
//! This module provides the [`PreprocessOptions`] struct for configuring
//! the crop, grayscale and contrast stages applied before segmentation
//! and dithering.

use crate::api::DitherError;

/// Largest accepted margin, in percent of the cropped dimension.
pub const MAX_MARGIN_PERCENT: f32 = 20.0;

/// Largest accepted contrast level.
pub const MAX_CONTRAST_LEVEL: u8 = 8;

/// Configuration options for image preprocessing.
///
/// # Defaults
///
/// - Horizontal margin: 0% (no crop)
/// - Vertical margin: 0% (no crop)
/// - Contrast level: 0 (stretch disabled, output equals input)
///
/// # Example
///
/// ```
/// use eink_dither::PreprocessOptions;
///
/// let options = PreprocessOptions::new()
///     .margins(5.0, 2.5)
///     .contrast(4);
/// assert_eq!(options.contrast, 4);
///
/// // Margins are clamped to a sane range
/// let options = PreprocessOptions::new().margins(50.0, -3.0);
/// assert_eq!(options.margin_x, 20.0);
/// assert_eq!(options.margin_y, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessOptions {
    /// Percent of the width removed from both the left and right edge.
    pub margin_x: f32,

    /// Percent of the height removed from both the top and bottom edge.
    pub margin_y: f32,

    /// Histogram stretch level, `0..=8`.
    ///
    /// Level `n` clips the darkest `3n` percent of pixels to black and the
    /// brightest `3 + 9n` percent to white before stretching the rest.
    pub contrast: u8,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            margin_x: 0.0,
            margin_y: 0.0,
            contrast: 0,
        }
    }
}

impl PreprocessOptions {
    /// Create new preprocessing options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set crop margins in percent, clamped to `[0, 20]`.
    #[inline]
    pub fn margins(mut self, horizontal: f32, vertical: f32) -> Self {
        self.margin_x = clamp_margin(horizontal);
        self.margin_y = clamp_margin(vertical);
        self
    }

    /// Set the contrast level, clamped to `0..=8`.
    #[inline]
    pub fn contrast(mut self, level: u8) -> Self {
        self.contrast = level.min(MAX_CONTRAST_LEVEL);
        self
    }

    /// Set the contrast level, rejecting values above 8.
    pub fn try_contrast(self, level: u8) -> Result<Self, DitherError> {
        if level > MAX_CONTRAST_LEVEL {
            return Err(DitherError::InvalidOption {
                name: "contrast",
                value: level.to_string(),
            });
        }
        Ok(self.contrast(level))
    }

    /// Whether any stage would change the input.
    pub fn is_identity(&self) -> bool {
        self.margin_x == 0.0 && self.margin_y == 0.0 && self.contrast == 0
    }
}

fn clamp_margin(percent: f32) -> f32 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, MAX_MARGIN_PERCENT)
}
