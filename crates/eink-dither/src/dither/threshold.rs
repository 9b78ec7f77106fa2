//! Plain threshold quantization.

use super::Dither;

/// Cut-off between black and white: values at or above it become white.
pub const THRESHOLD: u8 = 128;

/// Per-pixel threshold at [`THRESHOLD`], no error diffusion.
///
/// Idempotent: already-binary input passes through unchanged.
///
/// # Example
///
/// ```
/// use eink_dither::dither::{Dither, Threshold};
///
/// let mut pixels = vec![0, 127, 128, 255];
/// Threshold.dither(&mut pixels, 4, 1);
/// assert_eq!(pixels, vec![0, 0, 255, 255]);
/// ```
pub struct Threshold;

impl Dither for Threshold {
    fn dither(&self, pixels: &mut [u8], _width: usize, _height: usize) {
        for px in pixels.iter_mut() {
            *px = if *px >= THRESHOLD { 255 } else { 0 };
        }
    }
}
