//! Histogram-based contrast stretch.

use crate::raster::GrayImage;

/// Black and white cut-off points found in a luminance histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Levels {
    pub black: u8,
    pub white: u8,
}

/// Build a 256-bin histogram of the image.
pub fn histogram(pixels: &[u8]) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &v in pixels {
        bins[v as usize] += 1;
    }
    bins
}

/// Locate the black and white points for a contrast level.
///
/// The black point is the first gray value (scanning up from 0) at which
/// the cumulative pixel count reaches `3 * level` percent of the image; the
/// white point is the first value (scanning down from 255) at which it
/// reaches `3 + 9 * level` percent.
pub fn find_levels(bins: &[u64; 256], level: u8) -> Levels {
    let total: u64 = bins.iter().sum();
    let black_cut = total as f64 * (3.0 * level as f64) / 100.0;
    let white_cut = total as f64 * (3.0 + 9.0 * level as f64) / 100.0;

    let mut black = 0u8;
    let mut acc = 0u64;
    for (v, &count) in bins.iter().enumerate() {
        acc += count;
        if acc as f64 >= black_cut {
            black = v as u8;
            break;
        }
    }

    let mut white = 255u8;
    acc = 0;
    for (v, &count) in bins.iter().enumerate().rev() {
        acc += count;
        if acc as f64 >= white_cut {
            white = v as u8;
            break;
        }
    }

    Levels { black, white }
}

/// Stretch the gray range so that `black` maps to 0 and `white` to 255.
///
/// Level 0 leaves the image untouched. A degenerate range
/// (`white <= black`) also leaves it untouched.
pub fn stretch_contrast(image: &mut GrayImage, level: u8) -> Option<Levels> {
    if level == 0 {
        return None;
    }
    let levels = find_levels(&histogram(image.pixels()), level);
    let range = levels.white as i32 - levels.black as i32;
    if range <= 0 {
        return None;
    }

    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let scaled = (v as f32 - levels.black as f32) / range as f32 * 255.0;
        *out = scaled.round().clamp(0.0, 255.0) as u8;
    }
    for px in image.pixels_mut() {
        *px = lut[*px as usize];
    }
    Some(levels)
}
