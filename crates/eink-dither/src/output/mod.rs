//! Output types for the dithering pipeline.
//!
//! [`MonoBitmap`] is the canonical output of dithering: one bit per pixel,
//! rows padded to whole bytes, most significant bit first, `1` = white.
//! It is the exact payload layout stored in an XTG page.

mod bitmap;

pub use bitmap::{row_bytes, MonoBitmap};
