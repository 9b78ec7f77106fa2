//! 1-bit dithering algorithms.
//!
//! Every algorithm takes an 8-bit grayscale buffer and rewrites it in place
//! so that each pixel is exactly 0 (black) or 255 (white).
//!
//! # Algorithms
//!
//! - **Threshold**: per-pixel cut at 128, no diffusion
//! - **Ordered**: 4x4 Bayer matrix
//! - **Floyd-Steinberg**: classic 4-neighbor error diffusion (default)
//! - **Atkinson**: 6 neighbors, 75% propagation, lighter output
//! - **Sierra Lite**: 3-neighbor diffusion
//!
//! # Architecture
//!
//! [`DitherAlgorithm`] is a closed enum. [`DitherAlgorithm::strategy`] maps
//! each variant to a [`DitherFn`] with one shared signature, so adding a
//! variant without a strategy is a compile error.
//!
//! Error diffusion scans in strict raster order (top to bottom, left to
//! right) and accumulates error in an [`ErrorBuffer`] that only ever holds
//! rows at or below the current one.
//!
//! # Example
//!
//! ```
//! use eink_dither::DitherAlgorithm;
//!
//! let mut pixels = vec![128u8; 16];
//! DitherAlgorithm::Atkinson.apply(&mut pixels, 4, 4);
//! assert!(pixels.iter().all(|&p| p == 0 || p == 255));
//! ```

mod atkinson;
mod floyd_steinberg;
mod kernel;
mod ordered;
mod sierra;
mod threshold;

pub use atkinson::Atkinson;
pub use floyd_steinberg::FloydSteinberg;
pub use kernel::*;
pub use ordered::{Ordered, BAYER_4X4};
pub use sierra::SierraLite;
pub use threshold::{Threshold, THRESHOLD};

use std::fmt;
use std::str::FromStr;

use crate::api::DitherError;

/// Signature shared by every dithering strategy.
pub type DitherFn = fn(&mut [u8], usize, usize);

/// Dither algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DitherAlgorithm {
    /// Plain threshold at 128.
    #[cfg_attr(feature = "serde", serde(alias = "threshold"))]
    None,

    /// 4x4 Bayer ordered dithering.
    #[cfg_attr(feature = "serde", serde(alias = "bayer"))]
    Ordered,

    /// Floyd-Steinberg error diffusion (100% propagation).
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "floyd"))]
    FloydSteinberg,

    /// Atkinson error diffusion (75% propagation).
    Atkinson,

    /// Sierra Lite error diffusion (100% propagation, 3 neighbors).
    SierraLite,
}

impl DitherAlgorithm {
    /// Every variant, in declaration order.
    pub const ALL: [DitherAlgorithm; 5] = [
        DitherAlgorithm::None,
        DitherAlgorithm::Ordered,
        DitherAlgorithm::FloydSteinberg,
        DitherAlgorithm::Atkinson,
        DitherAlgorithm::SierraLite,
    ];

    /// The strategy function implementing this algorithm.
    pub fn strategy(self) -> DitherFn {
        match self {
            DitherAlgorithm::None => threshold_strategy,
            DitherAlgorithm::Ordered => ordered_strategy,
            DitherAlgorithm::FloydSteinberg => floyd_steinberg_strategy,
            DitherAlgorithm::Atkinson => atkinson_strategy,
            DitherAlgorithm::SierraLite => sierra_lite_strategy,
        }
    }

    /// Dither `pixels` in place.
    #[inline]
    pub fn apply(self, pixels: &mut [u8], width: usize, height: usize) {
        debug_assert_eq!(pixels.len(), width * height);
        (self.strategy())(pixels, width, height)
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            DitherAlgorithm::None => "none",
            DitherAlgorithm::Ordered => "ordered",
            DitherAlgorithm::FloydSteinberg => "floyd-steinberg",
            DitherAlgorithm::Atkinson => "atkinson",
            DitherAlgorithm::SierraLite => "sierra-lite",
        }
    }
}

fn threshold_strategy(pixels: &mut [u8], width: usize, height: usize) {
    Threshold.dither(pixels, width, height)
}

fn ordered_strategy(pixels: &mut [u8], width: usize, height: usize) {
    Ordered.dither(pixels, width, height)
}

fn floyd_steinberg_strategy(pixels: &mut [u8], width: usize, height: usize) {
    FloydSteinberg.dither(pixels, width, height)
}

fn atkinson_strategy(pixels: &mut [u8], width: usize, height: usize) {
    Atkinson.dither(pixels, width, height)
}

fn sierra_lite_strategy(pixels: &mut [u8], width: usize, height: usize) {
    SierraLite.dither(pixels, width, height)
}

impl fmt::Display for DitherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DitherAlgorithm {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let algorithm = match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "threshold" => DitherAlgorithm::None,
            "ordered" | "bayer" => DitherAlgorithm::Ordered,
            "floyd-steinberg" | "floyd" | "floydsteinberg" => DitherAlgorithm::FloydSteinberg,
            "atkinson" => DitherAlgorithm::Atkinson,
            "sierra-lite" | "sierralite" => DitherAlgorithm::SierraLite,
            _ => return Err(DitherError::UnknownAlgorithm(s.to_string())),
        };
        Ok(algorithm)
    }
}

/// A 1-bit dithering algorithm.
///
/// Implementors rewrite `pixels` (row-major, `width * height` bytes) so
/// that every value is 0 or 255.
pub trait Dither {
    fn dither(&self, pixels: &mut [u8], width: usize, height: usize);
}

/// Error buffer for error diffusion.
///
/// Holds a sliding window of error rows: `rows[0]` is the current row,
/// `rows[1]` the next, and so on up to the kernel's reach. Only the window
/// is allocated, not a full-image buffer.
///
/// # Usage Pattern
///
/// 1. Create buffer with `new(width, row_depth)`
/// 2. For each row:
///    a. Read accumulated error with `get_accumulated(x)`
///    b. After processing pixel, distribute error with `add_error(x, dy, error)`
///    c. After row complete, call `advance_row()`
#[derive(Debug)]
pub struct ErrorBuffer {
    rows: Vec<Vec<f32>>,
    width: usize,
}

impl ErrorBuffer {
    /// * `row_depth` - Number of rows to track (kernel's `max_dy + 1`)
    pub fn new(width: usize, row_depth: usize) -> Self {
        Self {
            rows: (0..row_depth).map(|_| vec![0.0; width]).collect(),
            width,
        }
    }

    /// Accumulated error for a pixel in the current row.
    #[inline]
    pub fn get_accumulated(&self, x: usize) -> f32 {
        self.rows[0][x]
    }

    /// Add error to a future pixel. Out-of-bounds targets are ignored.
    #[inline]
    pub fn add_error(&mut self, x: usize, row_offset: usize, error: f32) {
        if x < self.width && row_offset < self.rows.len() {
            self.rows[row_offset][x] += error;
        }
    }

    /// Advance to the next row.
    pub fn advance_row(&mut self) {
        // Rotate left: [0,1,2] -> [1,2,0]
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.fill(0.0);
        }
    }
}

/// Quantize one accumulated value to black or white.
#[inline]
pub(crate) fn quantize(value: f32) -> u8 {
    if value.clamp(0.0, 255.0) >= THRESHOLD as f32 {
        255
    } else {
        0
    }
}

/// Core error diffusion loop parameterized by kernel.
///
/// The quantization error `old - new` is computed from the accumulated
/// value and spread over the kernel's neighbors.
pub(crate) fn dither_with_kernel(pixels: &mut [u8], width: usize, height: usize, kernel: &Kernel) {
    let mut error_buf = ErrorBuffer::new(width, kernel.max_dy + 1);
    let divisor = kernel.divisor as f32;

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = pixels[idx] as f32 + error_buf.get_accumulated(x);
            let new = quantize(old);
            pixels[idx] = new;

            let error = old - new as f32;
            for &(dx, dy, weight) in kernel.entries {
                let nx = x as i32 + dx;
                if nx < 0 || nx as usize >= width || y + dy as usize >= height {
                    continue;
                }
                error_buf.add_error(nx as usize, dy as usize, error * weight as f32 / divisor);
            }
        }
        error_buf.advance_row();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| ((i % width) * 255 / (width - 1)) as u8)
            .collect()
    }

    #[test]
    fn test_every_algorithm_is_binary() {
        for algorithm in DitherAlgorithm::ALL {
            let mut pixels = gradient(33, 17);
            algorithm.apply(&mut pixels, 33, 17);
            assert!(
                pixels.iter().all(|&p| p == 0 || p == 255),
                "{} produced a non-binary pixel",
                algorithm
            );
        }
    }

    #[test]
    fn test_extremes_are_preserved() {
        for algorithm in DitherAlgorithm::ALL {
            let mut black = vec![0u8; 64];
            algorithm.apply(&mut black, 8, 8);
            assert!(black.iter().all(|&p| p == 0), "{} on black", algorithm);

            let mut white = vec![255u8; 64];
            algorithm.apply(&mut white, 8, 8);
            assert!(white.iter().all(|&p| p == 255), "{} on white", algorithm);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("none".parse::<DitherAlgorithm>().unwrap(), DitherAlgorithm::None);
        assert_eq!(
            "Threshold".parse::<DitherAlgorithm>().unwrap(),
            DitherAlgorithm::None
        );
        assert_eq!(
            "floyd_steinberg".parse::<DitherAlgorithm>().unwrap(),
            DitherAlgorithm::FloydSteinberg
        );
        assert_eq!(
            "sierra-lite".parse::<DitherAlgorithm>().unwrap(),
            DitherAlgorithm::SierraLite
        );
        assert!("blue-noise".parse::<DitherAlgorithm>().is_err());
    }

    #[test]
    fn test_name_round_trips_through_parse() {
        for algorithm in DitherAlgorithm::ALL {
            assert_eq!(algorithm.name().parse::<DitherAlgorithm>().unwrap(), algorithm);
        }
    }

    #[test]
    fn test_error_buffer_advance() {
        let mut buf = ErrorBuffer::new(3, 2);
        buf.add_error(1, 1, 4.0);
        buf.add_error(5, 0, 1.0); // ignored
        assert_eq!(buf.get_accumulated(1), 0.0);
        buf.advance_row();
        assert_eq!(buf.get_accumulated(1), 4.0);
        buf.advance_row();
        assert_eq!(buf.get_accumulated(1), 0.0);
    }

    #[test]
    fn test_default_is_floyd_steinberg() {
        assert_eq!(DitherAlgorithm::default(), DitherAlgorithm::FloydSteinberg);
    }
}
