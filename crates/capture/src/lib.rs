//! Screen capture module for RefScrn
//!
//! Grabs the monitor under the cursor as a frozen RGBA bitmap.

pub mod frame;
#[cfg(windows)]
pub mod monitor;
pub mod screenshot;

pub use frame::FrameData;
pub use screenshot::{capture_monitor_under_cursor, Screenshot};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Windows(#[from] windows::core::Error),

    #[error("GDI error: {0}")]
    Gdi(String),

    #[error("Capture not supported on this platform")]
    NotSupported,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clip into a `width` x `height` surface anchored at the origin.
    ///
    /// Parts outside `[0, width) x [0, height)` are cut away, so a negative
    /// origin shrinks the size as well as moving the edge. The size is
    /// floored to one pixel, so the result is always croppable from a
    /// non-empty surface.
    pub fn clamp_to(&self, width: u32, height: u32) -> Rect {
        let (x, w) = clip_span(self.x, self.width, width);
        let (y, h) = clip_span(self.y, self.height, height);
        Rect { x, y, width: w, height: h }
    }
}

fn clip_span(start: i32, len: u32, limit: u32) -> (i32, u32) {
    let max_start = i64::from(limit.saturating_sub(1));
    let lo = i64::from(start).clamp(0, max_start);
    let hi = (i64::from(start) + i64::from(len)).min(i64::from(limit));
    (lo as i32, (hi - lo).max(1) as u32)
}
