//! Annotation primitives

use crate::geometry::{Point, Rectangle};
use image::RgbaImage;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Distance from the arrow tip back to each wing point
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

/// Angle between the shaft and each wing
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;

pub const TEXT_FONT_SIZE: f64 = 24.0;

/// Committed labels sit slightly below the point the draft was opened at
pub const TEXT_BASELINE_NUDGE: f64 = 2.0;

pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Stroke widths offered in the options panel
pub const STROKE_WIDTHS: [f64; 3] = [2.0, 3.0, 6.0];

/// 8-bit RGBA colour, not premultiplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Relative luminance in `[0, 1]`
    pub fn luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }
}

pub const DEFAULT_COLOR: Color = Color::rgb(0xFF, 0x3B, 0x30);

/// Colours offered in the options panel
pub const PALETTE: [Color; 6] = [
    DEFAULT_COLOR,
    Color::rgb(0xFF, 0xCC, 0x00),
    Color::rgb(0x07, 0xC1, 0x60),
    Color::rgb(0x00, 0x7A, 0xFF),
    Color::WHITE,
    Color::BLACK,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self { color: DEFAULT_COLOR, width: DEFAULT_STROKE_WIDTH }
    }
}

/// Rectangle or ellipse outline grown from a fixed anchor
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub anchor: Point,
    pub bounds: Rectangle,
    pub stroke: Stroke,
}

impl Shape {
    pub fn new(anchor: Point, stroke: Stroke) -> Self {
        Self { anchor, bounds: Rectangle::new(anchor.x, anchor.y, 1.0, 1.0), stroke }
    }

    pub fn stretch_to(&mut self, p: Point) {
        let r = Rectangle::from_corners(self.anchor, p);
        self.bounds = Rectangle { width: r.width.max(1.0), height: r.height.max(1.0), ..r };
    }
}

/// Closed arrowhead triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub tip: Point,
    pub left: Point,
    pub right: Point,
}

/// Head for a shaft from `start` to `end`
pub fn arrow_head(start: Point, end: Point) -> ArrowHead {
    let theta = (end.y - start.y).atan2(end.x - start.x);
    let wing = |angle: f64| {
        Point::new(
            end.x - ARROW_HEAD_LENGTH * angle.cos(),
            end.y - ARROW_HEAD_LENGTH * angle.sin(),
        )
    };
    ArrowHead {
        tip: end,
        left: wing(theta - ARROW_HEAD_ANGLE),
        right: wing(theta + ARROW_HEAD_ANGLE),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub start: Point,
    pub end: Point,
    pub stroke: Stroke,
}

impl Arrow {
    pub fn head(&self) -> ArrowHead {
        arrow_head(self.start, self.end)
    }
}

/// Freehand polyline
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePath {
    pub points: Vec<Point>,
    pub stroke: Stroke,
}

/// Brush stroke filled with a pixelated copy of the screenshot
#[derive(Clone)]
pub struct MosaicStroke {
    pub points: Vec<Point>,
    pub width: f64,
    /// Pixelated source at physical resolution
    pub pattern: Arc<RgbaImage>,
}

impl fmt::Debug for MosaicStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MosaicStroke")
            .field("points", &self.points)
            .field("width", &self.width)
            .field("pattern", &self.pattern.dimensions())
            .finish()
    }
}

/// Committed text label
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub position: Point,
    pub text: String,
    pub color: Color,
    pub font_size: f64,
    /// Measured width and height
    pub extent: (f64, f64),
}

impl TextLabel {
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.position.x, self.position.y, self.extent.0, self.extent.1)
    }
}

#[derive(Debug, Clone)]
pub enum Primitive {
    Rectangle(Shape),
    Ellipse(Shape),
    Arrow(Arrow),
    Freehand(StrokePath),
    Text(TextLabel),
    Mosaic(MosaicStroke),
}

impl Primitive {
    pub fn as_text(&self) -> Option<&TextLabel> {
        match self {
            Primitive::Text(label) => Some(label),
            _ => None,
        }
    }

    /// Area covered on screen, including stroke width
    pub fn bounds(&self) -> Rectangle {
        match self {
            Primitive::Rectangle(s) | Primitive::Ellipse(s) => s.bounds.inflate(s.stroke.width / 2.0),
            Primitive::Arrow(a) => {
                let head = a.head();
                let pts = [a.start, head.tip, head.left, head.right];
                Rectangle::bounding(&pts)
                    .unwrap_or_default()
                    .inflate(a.stroke.width / 2.0)
            }
            Primitive::Freehand(p) => Rectangle::bounding(&p.points)
                .unwrap_or_default()
                .inflate(p.stroke.width / 2.0),
            Primitive::Mosaic(m) => Rectangle::bounding(&m.points)
                .unwrap_or_default()
                .inflate(m.width / 2.0),
            Primitive::Text(t) => t.bounds(),
        }
    }

    /// Shift the whole primitive by a logical offset
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Primitive::Rectangle(s) | Primitive::Ellipse(s) => {
                s.anchor = s.anchor.offset(dx, dy);
                s.bounds = s.bounds.translate(dx, dy);
            }
            Primitive::Arrow(a) => {
                a.start = a.start.offset(dx, dy);
                a.end = a.end.offset(dx, dy);
            }
            Primitive::Freehand(StrokePath { points, .. })
            | Primitive::Mosaic(MosaicStroke { points, .. }) => {
                for p in points.iter_mut() {
                    *p = p.offset(dx, dy);
                }
            }
            Primitive::Text(t) => t.position = t.position.offset(dx, dy),
        }
    }
}
