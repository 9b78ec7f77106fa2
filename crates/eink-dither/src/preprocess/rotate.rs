//! Quarter-turn rotation.

use crate::raster::GrayImage;

/// Rotate 90 degrees clockwise. Width and height swap.
pub fn rotate_cw(image: &GrayImage) -> GrayImage {
    let (w, h) = (image.width(), image.height());
    let mut out = GrayImage::filled(h, w, 0);
    for y in 0..h {
        for x in 0..w {
            // Source column x becomes destination row x; source row y lands
            // at column h - 1 - y.
            out.set(h - 1 - y, x, image.get(x, y));
        }
    }
    out
}
