//! System clipboard

use crate::{ExportError, ExportResult};
use arboard::{Clipboard, ImageData};
use image::RgbaImage;
use std::borrow::Cow;

pub fn copy_image(image: RgbaImage) -> ExportResult<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ExportError::Empty);
    }

    let mut clipboard = Clipboard::new()?;
    clipboard.set_image(ImageData {
        width: width as usize,
        height: height as usize,
        bytes: Cow::Owned(image.into_raw()),
    })?;
    log::info!("Copied {}x{} image to clipboard", width, height);
    Ok(())
}

pub fn copy_text(text: &str) -> ExportResult<()> {
    if text.is_empty() {
        return Err(ExportError::Empty);
    }
    Clipboard::new()?.set_text(text.to_owned())?;
    log::info!("Copied {} characters to clipboard", text.chars().count());
    Ok(())
}
