//! Atkinson error diffusion dithering algorithm.
//!
//! Atkinson dithering distributes only 75% of the quantization error (6/8).
//! The discarded quarter pushes midtones toward white and keeps line art
//! crisp, which suits small e-ink screens. Originally developed by Bill
//! Atkinson for the Apple Macintosh.

use super::{dither_with_kernel, Dither, ATKINSON};

/// Atkinson error diffusion dithering.
///
/// # Algorithm
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
///
/// Each neighbor receives 1/8 of the error, for a total of 6/8 = 75%.
pub struct Atkinson;

impl Dither for Atkinson {
    fn dither(&self, pixels: &mut [u8], width: usize, height: usize) {
        dither_with_kernel(pixels, width, height, &ATKINSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dither::FloydSteinberg;

    #[test]
    fn test_two_right_receives_error() {
        // 110 -> black, err 110; x=1 gets 13.75 -> 123.75 black;
        // x=2 gets 13.75 + 15.47 -> 139.22 white
        let mut pixels = vec![110, 110, 110];
        Atkinson.dither(&mut pixels, 3, 1);
        assert_eq!(pixels, vec![0, 0, 255]);
    }

    #[test]
    fn test_lighter_than_floyd_steinberg() {
        // Light gray: the discarded error makes Atkinson whiter.
        let mut atkinson = vec![200u8; 64 * 64];
        let mut floyd = atkinson.clone();
        Atkinson.dither(&mut atkinson, 64, 64);
        FloydSteinberg.dither(&mut floyd, 64, 64);

        let white = |p: &[u8]| p.iter().filter(|&&v| v == 255).count();
        assert!(
            white(&atkinson) >= white(&floyd),
            "atkinson {} white vs floyd {}",
            white(&atkinson),
            white(&floyd)
        );
    }
}
