//! Little-endian field readers and fixed-width string fields.

use crate::error::FormatError;

/// Borrow `len` bytes at `offset`, or report what was truncated.
pub fn take<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> Result<&'a [u8], FormatError> {
    let end = offset.checked_add(len).ok_or(FormatError::FieldOverflow {
        field: what,
        value: offset as u64,
    })?;
    data.get(offset..end).ok_or(FormatError::Truncated {
        what,
        needed: end,
        available: data.len(),
    })
}

pub fn read_u16_le(data: &[u8], offset: usize) -> Result<u16, FormatError> {
    let b = take(data, offset, 2, "u16 field")?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32, FormatError> {
    let b = take(data, offset, 4, "u32 field")?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn read_u64_le(data: &[u8], offset: usize) -> Result<u64, FormatError> {
    let b = take(data, offset, 8, "u64 field")?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(b);
    Ok(u64::from_le_bytes(buf))
}

/// Convert a stored 64-bit offset to `usize`.
pub fn to_usize(value: u64, field: &'static str) -> Result<usize, FormatError> {
    usize::try_from(value).map_err(|_| FormatError::FieldOverflow { field, value })
}

/// Write `s` into a null-padded field of `width` bytes.
///
/// At most `width - 1` bytes are written so the field stays
/// null-terminated, and truncation never splits a UTF-8 sequence.
pub fn write_fixed_str(out: &mut Vec<u8>, s: &str, width: usize) {
    let max = width.saturating_sub(1);
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    out.extend_from_slice(&s.as_bytes()[..end]);
    out.resize(out.len() + (width - end), 0);
}

/// Read a null-padded string field.
pub fn read_fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
