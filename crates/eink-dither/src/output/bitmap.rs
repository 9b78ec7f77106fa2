//! Packed 1-bit page bitmap.

use crate::api::DitherError;
use crate::raster::{GrayImage, PixelFormat, RasterImage};

/// Bytes per packed row: `ceil(width / 8)`.
#[inline]
pub fn row_bytes(width: usize) -> usize {
    width.div_ceil(8)
}

/// A packed monochrome bitmap.
///
/// # Invariants
///
/// - `data.len() == row_bytes(width) * height`
/// - bits past `width` in the last byte of each row are zero
///
/// # Example
///
/// ```
/// use eink_dither::{GrayImage, MonoBitmap};
///
/// let gray = GrayImage::new(10, 1, vec![255, 0, 255, 0, 255, 0, 255, 0, 255, 255]).unwrap();
/// let bitmap = MonoBitmap::from_gray(&gray);
///
/// assert_eq!(bitmap.row_bytes(), 2);
/// assert_eq!(bitmap.data(), &[0b1010_1010, 0b1100_0000]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoBitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl MonoBitmap {
    /// Pack a grayscale image: values `>= 128` become white bits.
    ///
    /// Dithered input is already 0/255, so this is lossless for it.
    pub fn from_gray(image: &GrayImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let stride = row_bytes(width);
        let mut data = vec![0u8; stride * height];
        for y in 0..height {
            let row = &image.pixels()[y * width..(y + 1) * width];
            let out = &mut data[y * stride..(y + 1) * stride];
            for (x, &v) in row.iter().enumerate() {
                if v >= 128 {
                    out[x / 8] |= 0x80 >> (x % 8);
                }
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap packed bytes, validating length and clearing pad bits.
    pub fn from_packed(width: usize, height: usize, mut data: Vec<u8>) -> Result<Self, DitherError> {
        let stride = row_bytes(width);
        if data.len() != stride * height {
            return Err(DitherError::BufferSize {
                expected: stride * height,
                actual: data.len(),
            });
        }
        let used = width % 8;
        if used != 0 {
            let mask = 0xFFu8 << (8 - used);
            for y in 0..height {
                data[y * stride + stride - 1] &= mask;
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        row_bytes(self.width)
    }

    /// Packed bytes, row-major.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// `true` if the pixel at `(x, y)` is white.
    #[inline]
    pub fn is_white(&self, x: usize, y: usize) -> bool {
        self.data[y * self.row_bytes() + x / 8] & (0x80 >> (x % 8)) != 0
    }

    /// Expand to 0/255 grayscale.
    pub fn to_gray(&self) -> GrayImage {
        let mut pixels = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                pixels.push(if self.is_white(x, y) { 255 } else { 0 });
            }
        }
        GrayImage::from_parts(self.width, self.height, pixels)
    }

    /// Expand to RGBA with alpha fixed at 255.
    pub fn to_rgba(&self) -> RasterImage {
        let mut data = Vec::with_capacity(self.width * self.height * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = if self.is_white(x, y) { 255 } else { 0 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        RasterImage::from_parts(self.width, self.height, PixelFormat::Rgba, data)
    }
}
