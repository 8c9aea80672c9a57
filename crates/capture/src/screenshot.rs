//! Monitor screenshot using GDI

use crate::{CaptureResult, Rect};
use image::RgbaImage;

/// Frozen capture of one monitor
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub image: RgbaImage,
    /// Monitor bounds in virtual-desktop pixels
    pub bounds: Rect,
    /// Physical pixels per logical unit, `None` if the DPI query failed
    pub scale: Option<(f64, f64)>,
}

impl Screenshot {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Capture the monitor the cursor is currently on
#[cfg(windows)]
pub fn capture_monitor_under_cursor() -> CaptureResult<Screenshot> {
    use crate::monitor;

    let (cx, cy) = monitor::cursor_position()?;
    let info = monitor::monitor_at(cx, cy)?;
    let frame = gdi::capture_rect(&info.bounds)?;
    let image = frame.to_rgba_image()?;
    let scale = monitor::dpi_scale(info.handle);

    log::info!(
        "Captured monitor at ({}, {}) {}x{} scale {:?}",
        info.bounds.x,
        info.bounds.y,
        image.width(),
        image.height(),
        scale
    );

    Ok(Screenshot {
        image,
        bounds: info.bounds,
        scale,
    })
}

#[cfg(not(windows))]
pub fn capture_monitor_under_cursor() -> CaptureResult<Screenshot> {
    Err(crate::CaptureError::NotSupported)
}

#[cfg(windows)]
mod gdi {
    use crate::{CaptureError, CaptureResult, FrameData, Rect};
    use windows::Win32::Graphics::Gdi::{
        BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
        GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
        DIB_RGB_COLORS, SRCCOPY,
    };

    /// Copy a region of the virtual desktop into a BGRA frame
    pub fn capture_rect(rect: &Rect) -> CaptureResult<FrameData> {
        if rect.is_empty() {
            return Err(CaptureError::Gdi("Monitor has no area".into()));
        }

        let width = rect.width as i32;
        let height = rect.height as i32;

        unsafe {
            let screen_dc = GetDC(None);
            if screen_dc.is_invalid() {
                return Err(CaptureError::Gdi("Failed to get screen DC".into()));
            }

            let mem_dc = CreateCompatibleDC(screen_dc);
            let bitmap = CreateCompatibleBitmap(screen_dc, width, height);
            let old_bitmap = SelectObject(mem_dc, bitmap);

            let blit = BitBlt(mem_dc, 0, 0, width, height, screen_dc, rect.x, rect.y, SRCCOPY);

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down DIB
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB.0,
                    ..Default::default()
                },
                bmiColors: [Default::default()],
            };

            let mut data = vec![0u8; rect.width as usize * rect.height as usize * 4];
            let rows = if blit.is_ok() {
                GetDIBits(
                    mem_dc,
                    bitmap,
                    0,
                    rect.height,
                    Some(data.as_mut_ptr() as *mut _),
                    &mut bmi,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            SelectObject(mem_dc, old_bitmap);
            let _ = DeleteObject(bitmap);
            let _ = DeleteDC(mem_dc);
            ReleaseDC(None, screen_dc);

            blit?;
            if rows == 0 {
                return Err(CaptureError::Gdi("GetDIBits copied no rows".into()));
            }

            Ok(FrameData::new(data, rect.width, rect.height))
        }
    }
}
