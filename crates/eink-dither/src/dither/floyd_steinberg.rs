//! Floyd-Steinberg error diffusion dithering algorithm.
//!
//! Floyd-Steinberg distributes 100% of the quantization error to 4
//! neighbors, giving smooth gradients at the cost of occasional "worm"
//! artifacts.

use super::{dither_with_kernel, Dither, FLOYD_STEINBERG};

/// Floyd-Steinberg error diffusion dithering.
///
/// # Algorithm
///
/// ```text
///        X   7
///    3   5   1
/// ```
///
/// Weights: 7/16 right, 3/16 bottom-left, 5/16 bottom, 1/16 bottom-right.
pub struct FloydSteinberg;

impl Dither for FloydSteinberg {
    fn dither(&self, pixels: &mut [u8], width: usize, height: usize) {
        dither_with_kernel(pixels, width, height, &FLOYD_STEINBERG)
    }
}
