//! Sierra Lite error diffusion dithering algorithm.

use super::{dither_with_kernel, Dither, SIERRA_LITE};

/// Sierra Lite error diffusion dithering.
///
/// The smallest member of the Sierra family: 100% of the error goes to
/// three neighbors.
///
/// ```text
///    X   2
///    1   1
/// ```
///
/// Weights: 2/4 right, 1/4 bottom-left, 1/4 bottom.
pub struct SierraLite;

impl Dither for SierraLite {
    fn dither(&self, pixels: &mut [u8], width: usize, height: usize) {
        dither_with_kernel(pixels, width, height, &SIERRA_LITE)
    }
}
