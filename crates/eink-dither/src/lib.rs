// Pixel loops index several buffers by the same coordinates.
#![allow(clippy::needless_range_loop, clippy::manual_range_contains)]

//! eink-dither: 1-bit page rendering for monochrome e-ink readers
//!
//! This library turns decoded page rasters into packed 1-bit bitmaps sized
//! for a monochrome e-ink panel: margin crop, luminance conversion,
//! histogram contrast stretch, geometry helpers and dithering.
//!
//! # Quick Start
//!
//! The [`EinkDitherer`] builder is the primary entry point:
//!
//! ```
//! use eink_dither::{DitherAlgorithm, EinkDitherer, RasterImage};
//!
//! let page = RasterImage::filled_rgba(600, 900, [128, 128, 128, 255]);
//! let ditherer = EinkDitherer::new()
//!     .contrast(2)
//!     .algorithm(DitherAlgorithm::FloydSteinberg);
//!
//! let bitmap = ditherer.render_fit(&page, 480, 800);
//! assert_eq!(bitmap.width(), 480);
//! assert_eq!(bitmap.row_bytes(), 60);
//! ```
//!
//! # Step by Step
//!
//! Callers that split or rotate pages run the stages themselves:
//!
//! ```
//! use eink_dither::{rotate_cw, resize_with_padding, DitherAlgorithm, EinkDitherer, RasterImage};
//!
//! let spread = RasterImage::filled_rgba(800, 500, [40, 40, 40, 255]);
//! let ditherer = EinkDitherer::new().algorithm(DitherAlgorithm::Atkinson);
//!
//! let gray = ditherer.preprocess(&spread);
//! let turned = rotate_cw(&gray);
//! let bitmap = ditherer.dither(resize_with_padding(&turned, 480, 800));
//! assert_eq!((bitmap.width(), bitmap.height()), (480, 800));
//! ```
//!
//! # Dithering Algorithms
//!
//! Five algorithms are available via [`DitherAlgorithm`]:
//!
//! - Threshold (plain cut at 128)
//! - Ordered (4x4 Bayer)
//! - Floyd-Steinberg (default)
//! - Atkinson (75% error propagation)
//! - Sierra Lite
//!
//! # Bit Layout
//!
//! [`MonoBitmap`] packs rows MSB first, one bit per pixel, `ceil(width / 8)`
//! bytes per row. A set bit is white. Padding bits at the end of a row are
//! always zero.

pub mod api;
pub mod color;
pub mod dither;
pub mod output;
pub mod preprocess;
pub mod raster;


pub use api::{DitherError, EinkDitherer};
pub use dither::{Dither, DitherAlgorithm, DitherFn};
pub use output::{row_bytes, MonoBitmap};
pub use preprocess::{
    resize_with_padding, rotate_cw, stretch_contrast, PreprocessOptions, Preprocessor,
};
pub use raster::{GrayImage, PixelFormat, RasterImage};
