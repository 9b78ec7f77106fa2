//! Rec. 601 luminosity transform.

/// Red weight of the luminosity transform.
pub const LUMA_R: f32 = 0.299;
/// Green weight of the luminosity transform.
pub const LUMA_G: f32 = 0.587;
/// Blue weight of the luminosity transform.
pub const LUMA_B: f32 = 0.114;

/// Luminance of an sRGB triple: `0.299R + 0.587G + 0.114B`, rounded.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Luminance of an RGBA pixel composited over a white page.
///
/// Fully opaque pixels give exactly [`luma`]; transparent regions read as
/// paper white.
#[inline]
pub fn luma_over_white(r: u8, g: u8, b: u8, a: u8) -> u8 {
    if a == 255 {
        return luma(r, g, b);
    }
    let alpha = a as f32 / 255.0;
    let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
    let composited = y * alpha + 255.0 * (1.0 - alpha);
    composited.round().clamp(0.0, 255.0) as u8
}
