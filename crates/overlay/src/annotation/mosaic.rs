//! Pixelated fill for mosaic strokes

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Edge of one mosaic cell in physical pixels
pub const MOSAIC_BLOCK: u32 = 12;

/// Mosaic brush width as a multiple of the stroke width
pub const MOSAIC_WIDTH_FACTOR: f64 = 6.0;

/// Down-scale then nearest-neighbour up-scale back to the source size
pub fn pixelate(source: &RgbaImage, block: u32) -> RgbaImage {
    let (width, height) = source.dimensions();
    let block = block.max(1);
    let small_w = (width / block).max(1);
    let small_h = (height / block).max(1);

    let small = imageops::resize(source, small_w, small_h, FilterType::Triangle);
    imageops::resize(&small, width, height, FilterType::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn keeps_dimensions() {
        let src = RgbaImage::from_pixel(50, 30, Rgba([10, 20, 30, 255]));
        assert_eq!(pixelate(&src, MOSAIC_BLOCK).dimensions(), (50, 30));
    }

    #[test]
    fn cells_are_flat() {
        let src = RgbaImage::from_fn(48, 48, |x, y| Rgba([(x * 5) as u8, (y * 5) as u8, 0, 255]));
        let out = pixelate(&src, 12);
        let first = *out.get_pixel(0, 0);
        for y in 0..12 {
            for x in 0..12 {
                assert_eq!(*out.get_pixel(x, y), first);
            }
        }
        assert_ne!(*out.get_pixel(0, 0), *out.get_pixel(47, 47));
    }

    #[test]
    fn tiny_source_survives() {
        let src = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        assert_eq!(pixelate(&src, MOSAIC_BLOCK).dimensions(), (3, 2));
    }
}
