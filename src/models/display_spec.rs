use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Target device width in pixels (portrait).
pub const TARGET_W: usize = 480;
/// Target device height in pixels (portrait).
pub const TARGET_H: usize = 800;

/// Panel geometry of the target reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySpec {
    pub width: usize,
    pub height: usize,
}

impl DisplaySpec {
    /// Xteink X4 class readers: 480x800 portrait
    pub const X4: Self = Self {
        width: TARGET_W,
        height: TARGET_H,
    };

    /// Validate custom dimensions.
    ///
    /// Both sides must be non-zero and fit the container's 16-bit fields.
    pub fn from_dimensions(width: usize, height: usize) -> Result<Self, ValidationError> {
        if width == 0 || height == 0 {
            return Err(ValidationError::InvalidDisplay { width, height });
        }
        if width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(ValidationError::DimensionsTooLarge { width, height });
        }
        Ok(Self { width, height })
    }

    /// Packed bytes per bitmap row
    pub fn row_bytes(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// Packed bytes per full page bitmap
    pub fn page_bytes(&self) -> usize {
        self.row_bytes() * self.height
    }
}

impl Default for DisplaySpec {
    fn default() -> Self {
        Self::X4
    }
}
