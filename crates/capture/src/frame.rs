//! Raw frame conversion

use crate::{CaptureError, CaptureResult};
use image::{ImageBuffer, RgbaImage};

/// Raw 32bpp frame as delivered by the OS (BGRA, top-down rows)
#[derive(Debug, Clone)]
pub struct FrameData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self { data, width, height }
    }

    /// Convert BGRA data to RGBA image
    pub fn to_rgba_image(&self) -> CaptureResult<RgbaImage> {
        let mut rgba_data = self.data.clone();

        for chunk in rgba_data.chunks_exact_mut(4) {
            chunk.swap(0, 2);
            // GDI leaves the alpha byte undefined
            chunk[3] = 255;
        }

        ImageBuffer::from_raw(self.width, self.height, rgba_data).ok_or_else(|| {
            CaptureError::InvalidFrame(format!(
                "{} bytes do not cover {}x{}",
                self.data.len(),
                self.width,
                self.height
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> FrameData {
        let mut data = Vec::new();
        for y in 0..height {
            for x in 0..width {
                // B, G, R, A(garbage)
                data.extend_from_slice(&[x as u8, y as u8, 200, 0]);
            }
        }
        FrameData::new(data, width, height)
    }

    #[test]
    fn converts_bgra_to_opaque_rgba() {
        let img = gradient(4, 3).to_rgba_image().unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(2, 1).0, [200, 1, 2, 255]);
    }

    #[test]
    fn short_buffer_is_an_error() {
        let frame = FrameData::new(vec![0; 8], 4, 4);
        assert!(matches!(frame.to_rgba_image(), Err(CaptureError::InvalidFrame(_))));
    }
}
