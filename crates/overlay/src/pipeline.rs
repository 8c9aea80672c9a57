//! Selection export: direct crop or composite-then-crop

use crate::annotation::AnnotationLayer;
use crate::chrome::{ChromeGuard, OverlayChrome};
use crate::dpi::DpiContext;
use crate::geometry::Rectangle;
use crate::render::{Scene, WindowRenderer};
use crate::{OverlayError, OverlayResult};
use capture::Rect;
use image::{imageops, RgbaImage};
use std::time::Instant;

/// Exported bitmap, handed to exactly one sink
#[derive(Debug, Clone, PartialEq)]
pub struct ExportImage {
    image: RgbaImage,
}

impl ExportImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl From<RgbaImage> for ExportImage {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

/// Produces the exported bitmap for a selection
pub struct CapturePipeline<'a> {
    source: &'a RgbaImage,
    dpi: DpiContext,
    window_size: (f64, f64),
}

impl<'a> CapturePipeline<'a> {
    pub fn new(source: &'a RgbaImage, dpi: DpiContext) -> Self {
        Self {
            source,
            dpi,
            window_size: dpi.logical_size(source.width(), source.height()),
        }
    }

    /// Export `rect`; `Ok(None)` when the selection has no area.
    ///
    /// Without visible annotations the source screenshot is cropped directly. With
    /// annotations the window is rendered with all chrome hidden and the
    /// render is cropped; chrome comes back even if rendering fails.
    pub fn export(
        &self,
        rect: &Rectangle,
        layer: &AnnotationLayer,
        chrome: &mut OverlayChrome,
        renderer: &dyn WindowRenderer,
    ) -> OverlayResult<Option<ExportImage>> {
        if rect.is_empty() {
            return Ok(None);
        }

        let started = Instant::now();

        if layer.is_blank() {
            let physical = self.dpi.to_physical(rect, self.source.dimensions());
            let image = crop(self.source, &physical)?;
            log::info!(
                "Exported {}x{} by direct crop in {:?}",
                image.width(),
                image.height(),
                started.elapsed()
            );
            return Ok(Some(ExportImage { image }));
        }

        let full = {
            let guard = ChromeGuard::hide(chrome);
            let scene = Scene {
                background: self.source,
                selection: *rect,
                layer,
                chrome: guard.chrome(),
                dpi: self.dpi,
                window_size: self.window_size,
            };
            renderer.render(&scene)?
        };

        let physical = self.dpi.to_physical(rect, full.dimensions());
        let image = crop(&full, &physical)?;
        log::info!(
            "Exported {}x{} from composite of {} items in {:?}",
            image.width(),
            image.height(),
            layer.len(),
            started.elapsed()
        );
        Ok(Some(ExportImage { image }))
    }
}

fn crop(image: &RgbaImage, rect: &Rect) -> OverlayResult<RgbaImage> {
    let (w, h) = image.dimensions();
    if rect.x < 0 || rect.y < 0 || rect.is_empty() || rect.right() as u32 > w || rect.bottom() as u32 > h {
        return Err(OverlayError::Crop(format!(
            "{:?} outside {}x{} image",
            rect, w, h
        )));
    }
    Ok(imageops::crop_imm(image, rect.x as u32, rect.y as u32, rect.width, rect.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn crop_rejects_out_of_bounds() {
        let img = RgbaImage::new(10, 10);
        assert!(crop(&img, &Rect::new(5, 5, 6, 1)).is_err());
        assert!(crop(&img, &Rect::new(-1, 0, 2, 2)).is_err());
        assert_eq!(crop(&img, &Rect::new(5, 5, 5, 5)).unwrap().dimensions(), (5, 5));
    }

    #[test]
    fn crop_copies_the_right_pixels() {
        let img = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let out = crop(&img, &Rect::new(3, 4, 2, 2)).unwrap();
        assert_eq!(out.get_pixel(1, 1).0, [4, 5, 0, 255]);
    }
}
