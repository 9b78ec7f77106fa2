//! Luminance conversion.
//!
//! E-ink panels driven by this crate are monochrome, so color only matters
//! long enough to be collapsed into a single luminance value.
//!
//! # Example
//!
//! ```
//! use eink_dither::color::luma;
//!
//! assert_eq!(luma(255, 255, 255), 255);
//! assert_eq!(luma(255, 0, 0), 76);
//! ```

mod luma;

pub use luma::{luma, luma_over_white};
