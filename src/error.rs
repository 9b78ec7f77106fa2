use thiserror::Error;

/// Malformed or truncated container data.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Bad magic: expected {expected:?}, found {found:?}")]
    BadMagic {
        expected: &'static str,
        found: Vec<u8>,
    },

    #[error("Truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Page {page} blob out of bounds: offset {offset}, length {length}, container is {size} bytes")]
    BlobOutOfBounds {
        page: usize,
        offset: u64,
        length: u32,
        size: usize,
    },

    #[error("Page data length {declared} does not match {width}x{height} ({expected} bytes)")]
    DataLength {
        declared: usize,
        expected: usize,
        width: u16,
        height: u16,
    },

    #[error("Page {page} blob at offset {offset} starts before the end of page {previous} ({previous_end})")]
    IndexOrder {
        page: usize,
        previous: usize,
        offset: u64,
        previous_end: u64,
    },

    #[error("Field {field} overflows: {value}")]
    FieldOverflow { field: &'static str, value: u64 },
}

/// Bad caller input, detected before heavy processing starts.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplay { width: usize, height: usize },

    #[error("Page range {start}-{end} outside 1-{total}")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        total: usize,
    },

    #[error("Mixed input types: {first} and {other}")]
    MixedInputTypes { first: String, other: String },

    #[error("No inputs given")]
    NoInputs,

    #[error("No pages found in {0}")]
    NoPages(String),

    #[error("Too many pages: {0} (max 65535)")]
    TooManyPages(usize),

    #[error("Too many chapters: {0} (max 65535)")]
    TooManyChapters(usize),

    #[error("Page dimensions too large: {width}x{height} (max 65535)")]
    DimensionsTooLarge { width: usize, height: usize },

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

/// Any failure of a conversion, merge or split call.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("PNG encode error: {0}")]
    PngEncode(#[from] png::EncodingError),

    #[error("Dither error: {0}")]
    Dither(#[from] eink_dither::DitherError),

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("Conversion context is closed")]
    ContextClosed,
}
