//! EinkDitherer builder -- the primary ergonomic entry point for the crate.
//!
//! [`EinkDitherer`] wraps preprocessing and dithering behind a fluent
//! builder. Geometry (rotation, splitting, fitting to the device) is left to
//! the caller between [`EinkDitherer::preprocess`] and
//! [`EinkDitherer::dither`], or done in one step by
//! [`EinkDitherer::render_fit`].

use crate::dither::DitherAlgorithm;
use crate::output::MonoBitmap;
use crate::preprocess::{resize_with_padding, PreprocessOptions, Preprocessor};
use crate::raster::{GrayImage, RasterImage};

/// High-level dithering builder for e-ink pages.
///
/// # Design
///
/// - Configuration methods consume and return `self` (standard builder pattern)
/// - [`dither()`](Self::dither) takes `&self` so the builder is **reusable**
///   across pages
///
/// # Example
///
/// ```
/// use eink_dither::{DitherAlgorithm, EinkDitherer, RasterImage};
///
/// let ditherer = EinkDitherer::new()
///     .margins(2.0, 2.0)
///     .contrast(3)
///     .algorithm(DitherAlgorithm::Atkinson);
///
/// let page = RasterImage::filled_rgba(60, 100, [90, 90, 90, 255]);
/// let bitmap = ditherer.render_fit(&page, 48, 80);
///
/// assert_eq!(bitmap.width(), 48);
/// assert_eq!(bitmap.height(), 80);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EinkDitherer {
    preprocess: PreprocessOptions,
    algorithm: DitherAlgorithm,
}

impl EinkDitherer {
    /// Create a ditherer with no crop, no contrast stretch and
    /// Floyd-Steinberg diffusion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all preprocessing options at once.
    #[inline]
    pub fn preprocess_options(mut self, options: PreprocessOptions) -> Self {
        self.preprocess = options;
        self
    }

    /// Set crop margins in percent (clamped to `[0, 20]`).
    #[inline]
    pub fn margins(mut self, horizontal: f32, vertical: f32) -> Self {
        self.preprocess = self.preprocess.margins(horizontal, vertical);
        self
    }

    /// Set contrast stretch level (clamped to `0..=8`).
    #[inline]
    pub fn contrast(mut self, level: u8) -> Self {
        self.preprocess = self.preprocess.contrast(level);
        self
    }

    /// Select the dithering algorithm.
    #[inline]
    pub fn algorithm(mut self, algorithm: DitherAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[inline]
    pub fn selected_algorithm(&self) -> DitherAlgorithm {
        self.algorithm
    }

    #[inline]
    pub fn options(&self) -> &PreprocessOptions {
        &self.preprocess
    }

    /// Crop, grayscale and contrast-stretch a source page.
    pub fn preprocess(&self, page: &RasterImage) -> GrayImage {
        Preprocessor::new(self.preprocess.clone()).process(page)
    }

    /// Dither a device-shaped grayscale page and pack it to 1 bit.
    pub fn dither(&self, mut image: GrayImage) -> MonoBitmap {
        let (w, h) = (image.width(), image.height());
        self.algorithm.apply(image.pixels_mut(), w, h);
        MonoBitmap::from_gray(&image)
    }

    /// Preprocess, fit onto a `width x height` canvas and dither.
    pub fn render_fit(&self, page: &RasterImage, width: usize, height: usize) -> MonoBitmap {
        let gray = self.preprocess(page);
        self.dither(resize_with_padding(&gray, width, height))
    }
}
