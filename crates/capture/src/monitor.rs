//! Monitor lookup and per-monitor DPI

use crate::{CaptureResult, Rect};
use windows::Win32::Foundation::POINT;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromPoint, HMONITOR, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::HiDpi::{GetDpiForMonitor, MDT_EFFECTIVE_DPI};
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

/// DPI that maps to a scale factor of 1.0
const BASE_DPI: f64 = 96.0;

/// Monitor handle plus its bounds in virtual-desktop pixels
#[derive(Debug, Clone, Copy)]
pub struct MonitorInfo {
    pub handle: HMONITOR,
    pub bounds: Rect,
}

/// Current cursor position in virtual-desktop pixels
pub fn cursor_position() -> CaptureResult<(i32, i32)> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point)? };
    Ok((point.x, point.y))
}

/// Monitor nearest to the given point
pub fn monitor_at(x: i32, y: i32) -> CaptureResult<MonitorInfo> {
    unsafe {
        let handle = MonitorFromPoint(POINT { x, y }, MONITOR_DEFAULTTONEAREST);

        let mut mi = MONITORINFO {
            cbSize: std::mem::size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !GetMonitorInfoW(handle, &mut mi).as_bool() {
            return Err(crate::CaptureError::Gdi("GetMonitorInfoW failed".into()));
        }

        let rc = mi.rcMonitor;
        Ok(MonitorInfo {
            handle,
            bounds: Rect::new(
                rc.left,
                rc.top,
                (rc.right - rc.left).max(0) as u32,
                (rc.bottom - rc.top).max(0) as u32,
            ),
        })
    }
}

/// Effective DPI scale of a monitor, `None` when the query fails
pub fn dpi_scale(monitor: HMONITOR) -> Option<(f64, f64)> {
    let mut dpi_x = 0u32;
    let mut dpi_y = 0u32;
    match unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) } {
        Ok(()) if dpi_x > 0 && dpi_y > 0 => {
            Some((dpi_x as f64 / BASE_DPI, dpi_y as f64 / BASE_DPI))
        }
        Ok(()) => None,
        Err(e) => {
            log::warn!("GetDpiForMonitor failed: {}", e);
            None
        }
    }
}
