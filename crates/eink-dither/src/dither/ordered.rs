//! Ordered (Bayer) dithering.

use super::Dither;

/// 4x4 Bayer index matrix.
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// Ordered dithering with the 4x4 Bayer matrix.
///
/// The threshold at `(x, y)` is `BAYER_4X4[y % 4][x % 4] / 16 * 255`; a
/// pixel becomes white only if it exceeds its threshold. No error is
/// carried between pixels, so the result is deterministic per position and
/// already-binary input is a fixed point.
pub struct Ordered;

impl Ordered {
    /// Threshold for matrix cell `(x % 4, y % 4)`.
    #[inline]
    pub fn threshold(x: usize, y: usize) -> f32 {
        BAYER_4X4[y % 4][x % 4] as f32 / 16.0 * 255.0
    }
}

impl Dither for Ordered {
    fn dither(&self, pixels: &mut [u8], width: usize, height: usize) {
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                pixels[idx] = if pixels[idx] as f32 > Self::threshold(x, y) {
                    255
                } else {
                    0
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_is_permutation() {
        let mut seen = [false; 16];
        for row in BAYER_4X4 {
            for v in row {
                seen[v as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_mid_gray_is_half_white() {
        let mut pixels = vec![128u8; 16];
        Ordered.dither(&mut pixels, 4, 4);
        let white = pixels.iter().filter(|&&p| p == 255).count();
        // cells 0..=8 have thresholds up to 127.5, below 128
        assert_eq!(white, 9);
    }

    #[test]
    fn test_idempotent_on_binary_input() {
        let mut pixels: Vec<u8> = (0..64).map(|i| if i % 3 == 0 { 255 } else { 0 }).collect();
        let before = pixels.clone();
        Ordered.dither(&mut pixels, 8, 8);
        assert_eq!(pixels, before);
    }

    #[test]
    fn test_zero_threshold_cell() {
        // Cell (0, 0) has threshold 0: any non-zero value is white.
        let mut pixels = vec![1u8];
        Ordered.dither(&mut pixels, 1, 1);
        assert_eq!(pixels, vec![255]);
    }
}
