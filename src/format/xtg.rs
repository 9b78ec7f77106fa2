//! XTG: a single 1-bit page bitmap.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "XTG\0"
//!      4     2  width (LE)
//!      6     2  height (LE)
//!      8     2  reserved (0)
//!     10     4  bitmap byte length (LE)
//!     14     8  digest: first bitmap bytes, zero padded
//!     22     n  bitmap, rows of ceil(width / 8) bytes, MSB first, 1 = white
//! ```

use eink_dither::{row_bytes, MonoBitmap, RasterImage};
use serde::Serialize;

use super::bytes::{read_u16_le, read_u32_le, take};
use crate::error::{FormatError, ValidationError};

pub const XTG_MAGIC: [u8; 4] = *b"XTG\0";
pub const XTG_HEADER_LEN: usize = 22;
pub const XTG_DIGEST_LEN: usize = 8;

/// Parsed XTG header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct XtgHeader {
    pub width: u16,
    pub height: u16,
    pub data_len: u32,
    /// Copy of the first bitmap bytes. Not a checksum.
    pub digest: [u8; XTG_DIGEST_LEN],
}

impl XtgHeader {
    /// Parse and validate the fixed header.
    pub fn read(blob: &[u8]) -> Result<Self, FormatError> {
        let header = take(blob, 0, XTG_HEADER_LEN, "XTG header")?;
        if header[0..4] != XTG_MAGIC {
            return Err(FormatError::BadMagic {
                expected: "XTG\\0",
                found: header[0..4].to_vec(),
            });
        }
        let mut digest = [0u8; XTG_DIGEST_LEN];
        digest.copy_from_slice(&header[14..22]);
        Ok(Self {
            width: read_u16_le(header, 4)?,
            height: read_u16_le(header, 6)?,
            data_len: read_u32_le(header, 10)?,
            digest,
        })
    }
}

/// Encode a packed bitmap as an XTG blob.
pub fn encode_xtg(bitmap: &MonoBitmap) -> Result<Vec<u8>, ValidationError> {
    let (width, height) = checked_dimensions(bitmap.width(), bitmap.height())?;
    let data = bitmap.data();
    let data_len = u32::try_from(data.len()).map_err(|_| ValidationError::DimensionsTooLarge {
        width: bitmap.width(),
        height: bitmap.height(),
    })?;

    let mut out = Vec::with_capacity(XTG_HEADER_LEN + data.len());
    out.extend_from_slice(&XTG_MAGIC);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(&digest_of(data));
    out.extend_from_slice(data);
    Ok(out)
}

/// Decode an XTG blob back into a packed bitmap.
pub fn decode_xtg(blob: &[u8]) -> Result<MonoBitmap, FormatError> {
    let header = XtgHeader::read(blob)?;
    let expected = row_bytes(header.width as usize) * header.height as usize;
    if header.data_len as usize != expected {
        return Err(FormatError::DataLength {
            declared: header.data_len as usize,
            expected,
            width: header.width,
            height: header.height,
        });
    }
    let data = take(blob, XTG_HEADER_LEN, expected, "XTG bitmap")?;
    MonoBitmap::from_packed(header.width as usize, header.height as usize, data.to_vec()).map_err(
        |_| FormatError::DataLength {
            declared: data.len(),
            expected,
            width: header.width,
            height: header.height,
        },
    )
}

/// Decode an XTG blob into an RGBA raster (black/white, alpha 255).
pub fn decode_xtg_raster(blob: &[u8]) -> Result<RasterImage, FormatError> {
    Ok(decode_xtg(blob)?.to_rgba())
}

fn digest_of(data: &[u8]) -> [u8; XTG_DIGEST_LEN] {
    let mut digest = [0u8; XTG_DIGEST_LEN];
    let n = data.len().min(XTG_DIGEST_LEN);
    digest[..n].copy_from_slice(&data[..n]);
    digest
}

pub(crate) fn checked_dimensions(width: usize, height: usize) -> Result<(u16, u16), ValidationError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(ValidationError::DimensionsTooLarge { width, height }),
    }
}
