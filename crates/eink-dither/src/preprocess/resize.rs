//! Aspect-preserving resize onto a fixed canvas.

use crate::raster::GrayImage;

/// Canvas color used for letterbox padding (paper white).
pub const PAD_VALUE: u8 = 255;

/// Bilinear resample of `image` to exactly `new_width x new_height`.
pub fn resize_bilinear(image: &GrayImage, new_width: usize, new_height: usize) -> GrayImage {
    let (w, h) = (image.width(), image.height());
    if w == new_width && h == new_height {
        return image.clone();
    }
    if w == 0 || h == 0 || new_width == 0 || new_height == 0 {
        return GrayImage::filled(new_width, new_height, PAD_VALUE);
    }

    let sx = w as f32 / new_width as f32;
    let sy = h as f32 / new_height as f32;
    let mut out = GrayImage::filled(new_width, new_height, 0);

    for y in 0..new_height {
        // Sample at pixel centers.
        let fy = ((y as f32 + 0.5) * sy - 0.5).clamp(0.0, (h - 1) as f32);
        let y0 = fy.floor() as usize;
        let y1 = (y0 + 1).min(h - 1);
        let ty = fy - y0 as f32;
        for x in 0..new_width {
            let fx = ((x as f32 + 0.5) * sx - 0.5).clamp(0.0, (w - 1) as f32);
            let x0 = fx.floor() as usize;
            let x1 = (x0 + 1).min(w - 1);
            let tx = fx - x0 as f32;

            let top = image.get(x0, y0) as f32 * (1.0 - tx) + image.get(x1, y0) as f32 * tx;
            let bottom = image.get(x0, y1) as f32 * (1.0 - tx) + image.get(x1, y1) as f32 * tx;
            let v = top * (1.0 - ty) + bottom * ty;
            out.set(x, y, v.round().clamp(0.0, 255.0) as u8);
        }
    }
    out
}

/// Scale `image` uniformly to fit inside `target_width x target_height`,
/// centered on a [`PAD_VALUE`] canvas of exactly that size.
pub fn resize_with_padding(
    image: &GrayImage,
    target_width: usize,
    target_height: usize,
) -> GrayImage {
    let (w, h) = (image.width(), image.height());
    let mut canvas = GrayImage::filled(target_width, target_height, PAD_VALUE);
    if w == 0 || h == 0 {
        return canvas;
    }

    let scale = (target_width as f32 / w as f32).min(target_height as f32 / h as f32);
    let fit_w = ((w as f32 * scale).round() as usize).clamp(1, target_width);
    let fit_h = ((h as f32 * scale).round() as usize).clamp(1, target_height);
    let scaled = resize_bilinear(image, fit_w, fit_h);

    let off_x = (target_width - fit_w) / 2;
    let off_y = (target_height - fit_h) / 2;
    for y in 0..fit_h {
        let src = &scaled.pixels()[y * fit_w..(y + 1) * fit_w];
        let start = (off_y + y) * target_width + off_x;
        canvas.pixels_mut()[start..start + fit_w].copy_from_slice(src);
    }
    canvas
}
