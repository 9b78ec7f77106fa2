//! Raster buffers passed between pipeline stages.
//!
//! Two shapes exist:
//!
//! - [`RasterImage`]: a decoded source page, either single-channel gray or
//!   4-channel RGBA, exactly as a decoder produced it.
//! - [`GrayImage`]: one 8-bit luminance value per pixel, the working format
//!   for every stage after grayscale conversion (contrast stretch, rotate,
//!   resize, dithering).
//!
//! Both are row-major with no row padding.

use crate::api::DitherError;

/// Channel layout of a [`RasterImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One byte per pixel.
    Gray,
    /// Four bytes per pixel: R, G, B, A.
    Rgba,
}

impl PixelFormat {
    /// Bytes used by one pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray => 1,
            PixelFormat::Rgba => 4,
        }
    }
}

/// A decoded page raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap a pixel buffer.
    ///
    /// Fails with [`DitherError::BufferSize`] when `data` does not hold
    /// exactly `width * height * channels` bytes.
    pub fn new(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, DitherError> {
        let expected = width * height * format.channels();
        if data.len() != expected {
            return Err(DitherError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Construct without validation; callers guarantee the length.
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(data.len(), width * height * format.channels());
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// RGBA raster filled with a single color.
    pub fn filled_rgba(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width * height * 4)
            .collect();
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            data,
        }
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
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the raster and return its pixel buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of the pixel at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.format.channels();
        let start = (y * self.width + x) * c;
        &self.data[start..start + c]
    }
}

/// Single-channel 8-bit working image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayImage {
    /// Wrap a luminance buffer, validating its length.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, DitherError> {
        if pixels.len() != width * height {
            return Err(DitherError::BufferSize {
                expected: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Image of the given size with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; width * height],
        }
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
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[y * self.width + x] = value;
    }

    /// Copy out the rows `y..y + height` as a new image.
    ///
    /// The band is clipped to the image bounds.
    pub fn rows(&self, y: usize, height: usize) -> GrayImage {
        let start = y.min(self.height);
        let end = (y + height).min(self.height);
        GrayImage {
            width: self.width,
            height: end - start,
            pixels: self.pixels[start * self.width..end * self.width].to_vec(),
        }
    }

    /// Expand into an RGBA raster with opaque alpha.
    pub fn to_raster(&self) -> RasterImage {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for &v in &self.pixels {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        RasterImage {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba,
            data,
        }
    }
}

impl From<GrayImage> for RasterImage {
    fn from(image: GrayImage) -> Self {
        RasterImage {
            width: image.width,
            height: image.height,
            format: PixelFormat::Gray,
            data: image.pixels,
        }
    }
}
