//! Logical <-> physical coordinate transform under per-monitor DPI

use crate::geometry::Rectangle;
use capture::Rect;

/// Scale used when the platform cannot report one
pub const FALLBACK_SCALE: f64 = 1.0;

/// Physical pixels per logical unit on each axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpiContext {
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for DpiContext {
    fn default() -> Self {
        Self { scale_x: FALLBACK_SCALE, scale_y: FALLBACK_SCALE }
    }
}

fn sanitize(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        FALLBACK_SCALE
    }
}

impl DpiContext {
    pub fn new(scale_x: f64, scale_y: f64) -> Self {
        Self { scale_x: sanitize(scale_x), scale_y: sanitize(scale_y) }
    }

    /// Resolve from a platform query result, falling back to 1.0
    pub fn resolve(queried: Option<(f64, f64)>) -> Self {
        match queried {
            Some((sx, sy)) => Self::new(sx, sy),
            None => {
                log::debug!("No DPI reported, using scale {}", FALLBACK_SCALE);
                Self::default()
            }
        }
    }

    /// Map a logical rectangle onto a `source` sized bitmap.
    ///
    /// Each axis is scaled and rounded to the nearest pixel, then the result is
    /// clipped to `[0, width) x [0, height)` with a minimum size of one pixel.
    pub fn to_physical(&self, rect: &Rectangle, source: (u32, u32)) -> Rect {
        let x = (rect.x * self.scale_x).round();
        let y = (rect.y * self.scale_y).round();
        let w = (rect.width * self.scale_x).round().max(0.0);
        let h = (rect.height * self.scale_y).round().max(0.0);

        Rect::new(x as i32, y as i32, w as u32, h as u32).clamp_to(source.0, source.1)
    }

    pub fn to_logical(&self, rect: &Rect) -> Rectangle {
        Rectangle {
            x: rect.x as f64 / self.scale_x,
            y: rect.y as f64 / self.scale_y,
            width: rect.width as f64 / self.scale_x,
            height: rect.height as f64 / self.scale_y,
        }
    }

    /// Logical size of a bitmap of `width` x `height` pixels
    pub fn logical_size(&self, width: u32, height: u32) -> (f64, f64) {
        (width as f64 / self.scale_x, height as f64 / self.scale_y)
    }

    /// Physical size of the full-window render for a logical window size
    pub fn physical_size(&self, logical: (f64, f64)) -> (u32, u32) {
        (
            (logical.0 * self.scale_x).round().max(1.0) as u32,
            (logical.1 * self.scale_y).round().max(1.0) as u32,
        )
    }

    /// Logical placement of an overlay window covering `bounds`
    pub fn window_placement(&self, bounds: &Rect) -> Rectangle {
        self.to_logical(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[test]
    fn resolve_falls_back_to_identity() {
        assert_eq!(DpiContext::resolve(None), DpiContext::default());
        assert_eq!(DpiContext::resolve(Some((0.0, f64::NAN))), DpiContext::default());
        assert_eq!(DpiContext::resolve(Some((1.5, 1.25))), DpiContext::new(1.5, 1.25));
    }

    #[test]
    fn scales_and_rounds() {
        let dpi = DpiContext::new(1.25, 1.25);
        let r = Rectangle::from_corners(Point::new(10.0, 10.0), Point::new(110.0, 70.0));
        let px = dpi.to_physical(&r, (2000, 2000));
        assert_eq!(px, Rect::new(13, 13, 125, 75));
    }

    #[test]
    fn clamps_into_source() {
        let dpi = DpiContext::new(2.0, 2.0);
        let r = Rectangle::new(90.0, -10.0, 50.0, 30.0);
        assert_eq!(dpi.to_physical(&r, (200, 100)), Rect::new(180, 0, 20, 40));
    }

    #[test]
    fn degenerate_rect_gets_one_pixel() {
        let dpi = DpiContext::default();
        let r = Rectangle::new(5.0, 5.0, 0.2, 0.0);
        let px = dpi.to_physical(&r, (10, 10));
        assert_eq!((px.width, px.height), (1, 1));
    }

    #[test]
    fn window_placement_divides_by_scale() {
        let dpi = DpiContext::new(1.5, 1.5);
        let placement = dpi.window_placement(&Rect::new(2880, 0, 2880, 1620));
        assert_eq!(placement, Rectangle::new(1920.0, 0.0, 1920.0, 1080.0));
        assert_eq!(dpi.physical_size((placement.width, placement.height)), (2880, 1620));
    }
}
