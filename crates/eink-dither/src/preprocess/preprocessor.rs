//! Core preprocessing logic.
//!
//! The [`Preprocessor`] turns a decoded page raster into the grayscale
//! working image that segmentation and dithering consume.
//!
//! # Processing Pipeline
//!
//! 1. **Crop** - remove `margin% * dimension` from each edge
//! 2. **Grayscale** - `0.299R + 0.587G + 0.114B`, transparency over white
//! 3. **Contrast stretch** - histogram cut-offs mapped to black and white
//!
//! # Example
//!
//! ```
//! use eink_dither::{PreprocessOptions, Preprocessor, RasterImage};
//!
//! let page = RasterImage::filled_rgba(100, 50, [200, 100, 50, 255]);
//! let preprocessor = Preprocessor::new(PreprocessOptions::new().margins(10.0, 0.0));
//! let gray = preprocessor.process(&page);
//!
//! assert_eq!(gray.width(), 80);
//! assert_eq!(gray.height(), 50);
//! ```

use crate::color::luma_over_white;
use crate::preprocess::PreprocessOptions;
use crate::raster::{GrayImage, PixelFormat, RasterImage};

use super::contrast::stretch_contrast;

/// Page preprocessor: crop, grayscale, contrast.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    #[inline]
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    /// Run crop, grayscale and contrast stretch in order.
    pub fn process(&self, input: &RasterImage) -> GrayImage {
        let cropped = crop(input, self.options.margin_x, self.options.margin_y);
        let mut gray = to_grayscale(&cropped);
        stretch_contrast(&mut gray, self.options.contrast);
        gray
    }
}

/// Crop `margin_x` percent of the width from the left and right edges and
/// `margin_y` percent of the height from the top and bottom.
///
/// At least one row and column always survive.
pub fn crop(input: &RasterImage, margin_x: f32, margin_y: f32) -> RasterImage {
    let (w, h) = (input.width(), input.height());
    let cut_x = (w as f32 * margin_x / 100.0).floor() as usize;
    let cut_y = (h as f32 * margin_y / 100.0).floor() as usize;
    if cut_x == 0 && cut_y == 0 {
        return input.clone();
    }

    let cut_x = cut_x.min(w.saturating_sub(1) / 2);
    let cut_y = cut_y.min(h.saturating_sub(1) / 2);
    let new_w = w - 2 * cut_x;
    let new_h = h - 2 * cut_y;
    let c = input.format().channels();

    let mut data = Vec::with_capacity(new_w * new_h * c);
    for y in cut_y..cut_y + new_h {
        let start = (y * w + cut_x) * c;
        data.extend_from_slice(&input.data()[start..start + new_w * c]);
    }
    RasterImage::from_parts(new_w, new_h, input.format(), data)
}

/// Collapse a raster to luminance.
pub fn to_grayscale(input: &RasterImage) -> GrayImage {
    let pixels = match input.format() {
        PixelFormat::Gray => input.data().to_vec(),
        PixelFormat::Rgba => input
            .data()
            .chunks_exact(4)
            .map(|p| luma_over_white(p[0], p[1], p[2], p[3]))
            .collect(),
    };
    GrayImage::from_parts(input.width(), input.height(), pixels)
}
