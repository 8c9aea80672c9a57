//! Saving to image files

use crate::{ExportError, ExportResult};
use chrono::{DateTime, Local};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// File formats offered by the save dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Bmp,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Bmp];

    /// Format implied by the file extension; unknown extensions save as PNG
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => ExportFormat::Jpeg,
            Some("bmp") => ExportFormat::Bmp,
            _ => ExportFormat::Png,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Bmp => "BMP",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ExportFormat::Png => &["png"],
            ExportFormat::Jpeg => &["jpg", "jpeg"],
            ExportFormat::Bmp => &["bmp"],
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::Png => ImageFormat::Png,
            ExportFormat::Jpeg => ImageFormat::Jpeg,
            ExportFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

/// `Screenshot_YYYYMMDD_HHMMSS.png`
pub fn default_file_name(now: DateTime<Local>) -> String {
    format!("Screenshot_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// The user's picture folder, falling back to the working directory
pub fn default_save_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Save `image` to `path` in the format its extension names.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn save_image(image: RgbaImage, path: &Path) -> ExportResult<PathBuf> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ExportError::Empty);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let format = ExportFormat::from_path(path);
    let (w, h) = image.dimensions();
    match format {
        ExportFormat::Jpeg => DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save_with_format(path, format.image_format())?,
        _ => image.save_with_format(path, format.image_format())?,
    }

    log::info!("Saved {}x{} {} to {}", w, h, format.label(), path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(8, 6, |x, y| Rgba([(x * 30) as u8, (y * 40) as u8, 90, 255]))
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.PNG")), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(Path::new("a.jpg")), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("a.JPEG")), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("a.bmp")), ExportFormat::Bmp);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), ExportFormat::Png);
    }

    #[test]
    fn file_name_uses_local_timestamp() {
        let dt = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().unwrap();
        assert_eq!(default_file_name(dt), "Screenshot_20260304_050607.png");
    }

    #[test]
    fn png_round_trips_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shot.png");
        save_image(sample(), &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn jpeg_and_bmp_are_written() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["shot.jpg", "shot.bmp"] {
            let path = dir.path().join(name);
            save_image(sample(), &path).unwrap();
            let loaded = image::open(&path).unwrap();
            assert_eq!((loaded.width(), loaded.height()), (8, 6));
        }
    }

    #[test]
    fn empty_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(RgbaImage::new(0, 0), &dir.path().join("x.png")).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
    }
}
