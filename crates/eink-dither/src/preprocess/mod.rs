//! Image preprocessing for e-ink dithering.
//!
//! This module turns decoded page rasters into device-shaped grayscale
//! images. The per-page pipeline is:
//!
//! 1. **Crop** - strip scanner margins ([`crop`])
//! 2. **Grayscale** - luminosity transform ([`to_grayscale`])
//! 3. **Contrast stretch** - histogram cut-offs ([`stretch_contrast`])
//!
//! followed, per output page, by geometry helpers used by page
//! segmentation:
//!
//! - [`rotate_cw`] - quarter turn for landscape reading
//! - [`resize_with_padding`] - uniform fit onto the device canvas
//!
//! # Example
//!
//! ```
//! use eink_dither::{resize_with_padding, PreprocessOptions, Preprocessor, RasterImage};
//!
//! let page = RasterImage::filled_rgba(300, 400, [30, 30, 30, 255]);
//! let gray = Preprocessor::new(PreprocessOptions::new().contrast(2)).process(&page);
//! let device = resize_with_padding(&gray, 480, 800);
//!
//! assert_eq!(device.width(), 480);
//! assert_eq!(device.height(), 800);
//! ```

mod contrast;
mod options;
mod preprocessor;
mod resize;
mod rotate;

pub use contrast::{find_levels, histogram, stretch_contrast, Levels};
pub use options::{PreprocessOptions, MAX_CONTRAST_LEVEL, MAX_MARGIN_PERCENT};
pub use preprocessor::{crop, to_grayscale, Preprocessor};
pub use resize::{resize_bilinear, resize_with_padding, PAD_VALUE};
pub use rotate::rotate_cw;
