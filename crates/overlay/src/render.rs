//! Off-screen raster rendering of the overlay window

use crate::annotation::{AnnotationLayer, Color, LabelFont, Primitive, TextLabel};
use crate::annotation::primitive::TEXT_BASELINE_NUDGE;
use crate::chrome::OverlayChrome;
use crate::dpi::DpiContext;
use crate::geometry::{Point, Rectangle};
use crate::{OverlayError, OverlayResult};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Dimming applied outside the selection
pub const MASK_COLOR: Color = Color::rgba(0, 0, 0, 0x80);

pub const OUTLINE_COLOR: Color = Color::rgb(0x1E, 0x90, 0xFF);

/// Largest render we attempt, in pixels
const MAX_RENDER_PIXELS: u64 = 16384 * 16384;

/// Everything visible in the overlay window
pub struct Scene<'a> {
    pub background: &'a RgbaImage,
    pub selection: Rectangle,
    pub layer: &'a AnnotationLayer,
    pub chrome: &'a OverlayChrome,
    pub dpi: DpiContext,
    /// Window size in logical units
    pub window_size: (f64, f64),
}

/// Rasterizes the whole window at physical resolution
pub trait WindowRenderer {
    fn render(&self, scene: &Scene<'_>) -> OverlayResult<RgbaImage>;
}

/// CPU renderer; text labels are skipped when no font is available
#[derive(Debug, Clone, Default)]
pub struct RasterRenderer {
    font: Option<LabelFont>,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: Option<LabelFont>) -> Self {
        Self { font }
    }
}

impl WindowRenderer for RasterRenderer {
    fn render(&self, scene: &Scene<'_>) -> OverlayResult<RgbaImage> {
        let (width, height) = scene.dpi.physical_size(scene.window_size);
        if width as u64 * height as u64 > MAX_RENDER_PIXELS {
            return Err(OverlayError::Render(format!("{}x{} exceeds render limit", width, height)));
        }

        let mut canvas = if scene.background.dimensions() == (width, height) {
            scene.background.clone()
        } else {
            imageops::resize(scene.background, width, height, FilterType::Triangle)
        };

        let mut painter = Painter {
            img: &mut canvas,
            sx: scene.dpi.scale_x,
            sy: scene.dpi.scale_y,
        };

        if scene.chrome.mask {
            painter.dim_outside(&scene.selection, MASK_COLOR);
        }

        for primitive in scene.layer.primitives() {
            painter.primitive(primitive, self.font.as_ref());
        }

        if let (Some(draft), Some(font)) = (scene.layer.draft(), self.font.as_ref()) {
            let label = TextLabel {
                position: draft.position.offset(0.0, TEXT_BASELINE_NUDGE),
                text: draft.text.clone(),
                color: draft.color,
                font_size: draft.font_size,
                extent: (0.0, 0.0),
            };
            painter.text(&label, font);
        }

        if scene.chrome.selection_outline && !scene.selection.is_empty() {
            painter.outline(&scene.selection, OUTLINE_COLOR, 1.0);
        }

        Ok(canvas)
    }
}

struct Painter<'a> {
    img: &'a mut RgbaImage,
    sx: f64,
    sy: f64,
}

impl Painter<'_> {
    fn map(&self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }

    fn thickness(&self, width: f64) -> f64 {
        width * (self.sx + self.sy) / 2.0
    }

    fn primitive(&mut self, primitive: &Primitive, font: Option<&LabelFont>) {
        match primitive {
            Primitive::Rectangle(shape) => {
                self.outline(&shape.bounds, shape.stroke.color, shape.stroke.width)
            }
            Primitive::Ellipse(shape) => {
                let r = &shape.bounds;
                let c = self.map(r.center());
                let rx = r.width / 2.0 * self.sx;
                let ry = r.height / 2.0 * self.sy;
                let segments = ((rx + ry) * 2.0).clamp(32.0, 720.0) as usize;
                let points: Vec<Point> = (0..=segments)
                    .map(|i| {
                        let t = i as f64 / segments as f64 * std::f64::consts::TAU;
                        Point::new(c.x + rx * t.cos(), c.y + ry * t.sin())
                    })
                    .collect();
                let t = self.thickness(shape.stroke.width);
                draw_polyline(self.img, &points, shape.stroke.color, t);
            }
            Primitive::Arrow(arrow) => {
                let head = arrow.head();
                let (start, tip) = (self.map(arrow.start), self.map(head.tip));
                let (left, right) = (self.map(head.left), self.map(head.right));
                let t = self.thickness(arrow.stroke.width);
                draw_line(self.img, start, tip, arrow.stroke.color, t);
                fill_triangle(self.img, tip, left, right, arrow.stroke.color);
                draw_polyline(self.img, &[left, tip, right, left], arrow.stroke.color, t);
            }
            Primitive::Freehand(path) => {
                let points: Vec<Point> = path.points.iter().map(|&p| self.map(p)).collect();
                let t = self.thickness(path.stroke.width);
                draw_polyline(self.img, &points, path.stroke.color, t);
            }
            Primitive::Mosaic(stroke) => {
                let points: Vec<Point> = stroke.points.iter().map(|&p| self.map(p)).collect();
                let radius = self.thickness(stroke.width) / 2.0;
                stamp_pattern_polyline(self.img, &stroke.pattern, &points, radius);
            }
            Primitive::Text(label) => match font {
                Some(font) => self.text(label, font),
                None => log::warn!("No label font, skipping text {:?}", label.text),
            },
        }
    }

    fn outline(&mut self, rect: &Rectangle, color: Color, width: f64) {
        let tl = self.map(rect.top_left());
        let br = self.map(Point::new(rect.right(), rect.bottom()));
        let tr = Point::new(br.x, tl.y);
        let bl = Point::new(tl.x, br.y);
        let t = self.thickness(width);
        draw_polyline(self.img, &[tl, tr, br, bl, tl], color, t);
    }

    fn dim_outside(&mut self, selection: &Rectangle, color: Color) {
        let left = selection.left() * self.sx;
        let right = selection.right() * self.sx;
        let top = selection.top() * self.sy;
        let bottom = selection.bottom() * self.sy;
        let (w, h) = self.img.dimensions();
        for y in 0..h {
            for x in 0..w {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                if px < left || px >= right || py < top || py >= bottom {
                    blend_pixel(self.img, x, y, color);
                }
            }
        }
    }

    fn text(&mut self, label: &TextLabel, font: &LabelFont) {
        use ab_glyph::{point, Font, ScaleFont};

        let px_size = (label.font_size * self.sy) as f32;
        let scaled = font.font().as_scaled(px_size);
        let line_height = font.line_height(px_size as f64) as f32;
        let origin = self.map(label.position);
        let (w, h) = (self.img.width() as i32, self.img.height() as i32);

        for (row, line) in label.text.split('\n').enumerate() {
            let baseline = origin.y as f32 + scaled.ascent() + row as f32 * line_height;
            let mut caret = point(origin.x as f32, baseline);
            for ch in line.chars() {
                let mut glyph = scaled.scaled_glyph(ch);
                glyph.position = caret;
                caret.x += scaled.h_advance(glyph.id);
                let Some(outlined) = scaled.outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|x, y, coverage| {
                    let px = x as i32 + bounds.min.x as i32;
                    let py = y as i32 + bounds.min.y as i32;
                    if px >= 0 && py >= 0 && px < w && py < h {
                        let alpha = (label.color.a as f32 * coverage).round().clamp(0.0, 255.0);
                        blend_pixel(self.img, px as u32, py as u32, label.color.with_alpha(alpha as u8));
                    }
                });
            }
        }
    }
}

/// Source-over blend of a straight-alpha colour onto one pixel
fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: Color) {
    if color.a == 0 {
        return;
    }
    let dst = img.get_pixel(x, y).0;
    let src_a = color.a as f64 / 255.0;
    let dst_a = dst[3] as f64 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return;
    }
    let blend = |src: u8, dst: u8| {
        let src_f = src as f64 / 255.0;
        let dst_f = dst as f64 / 255.0;
        ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    img.put_pixel(
        x,
        y,
        Rgba([
            blend(color.r, dst[0]),
            blend(color.g, dst[1]),
            blend(color.b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]),
    );
}

/// Pixels whose centres fall inside a disc, clipped to the image
fn disc_pixels(img: &RgbaImage, center: Point, radius: f64) -> impl Iterator<Item = (u32, u32)> {
    let radius = radius.max(0.5);
    let radius_sq = radius * radius;
    let (w, h) = (img.width() as i64, img.height() as i64);
    let min_x = ((center.x - radius).floor() as i64).max(0);
    let max_x = ((center.x + radius).ceil() as i64).min(w - 1);
    let min_y = ((center.y - radius).floor() as i64).max(0);
    let max_y = ((center.y + radius).ceil() as i64).min(h - 1);

    (min_y..=max_y).flat_map(move |y| {
        (min_x..=max_x).filter_map(move |x| {
            let dx = x as f64 + 0.5 - center.x;
            let dy = y as f64 + 0.5 - center.y;
            (dx * dx + dy * dy <= radius_sq).then_some((x as u32, y as u32))
        })
    })
}

/// Centres of the discs stamped along a segment
fn line_steps(start: Point, end: Point) -> impl Iterator<Item = Point> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    (0..=steps).map(move |i| {
        let t = i as f64 / steps as f64;
        Point::new(start.x + dx * t, start.y + dy * t)
    })
}

fn draw_line(img: &mut RgbaImage, start: Point, end: Point, color: Color, thickness: f64) {
    let radius = thickness / 2.0;
    // Opaque strokes tolerate re-stamping; translucent ones would darken
    let mut seen = std::collections::HashSet::new();
    for center in line_steps(start, end) {
        let pixels: Vec<_> = disc_pixels(img, center, radius).collect();
        for (x, y) in pixels {
            if color.a == 255 || seen.insert((x, y)) {
                blend_pixel(img, x, y, color);
            }
        }
    }
}

fn draw_polyline(img: &mut RgbaImage, points: &[Point], color: Color, thickness: f64) {
    match points {
        [] => {}
        [single] => draw_line(img, *single, *single, color, thickness),
        _ => {
            for pair in points.windows(2) {
                draw_line(img, pair[0], pair[1], color, thickness);
            }
        }
    }
}

fn fill_triangle(img: &mut RgbaImage, a: Point, b: Point, c: Point, color: Color) {
    let edge = |p: Point, q: Point, r: Point| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    let area = edge(a, b, c);
    if area.abs() < f64::EPSILON {
        return;
    }
    let Some(bounds) = Rectangle::bounding(&[a, b, c]) else {
        return;
    };
    let (w, h) = (img.width() as i64, img.height() as i64);
    let min_x = (bounds.left().floor() as i64).max(0);
    let max_x = (bounds.right().ceil() as i64).min(w - 1);
    let min_y = (bounds.top().floor() as i64).max(0);
    let max_y = (bounds.bottom().ceil() as i64).min(h - 1);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                blend_pixel(img, x as u32, y as u32, color);
            }
        }
    }
}

/// Copy pattern pixels under a thick polyline
fn stamp_pattern_polyline(img: &mut RgbaImage, pattern: &RgbaImage, points: &[Point], radius: f64) {
    let (pw, ph) = pattern.dimensions();
    let stamp = |img: &mut RgbaImage, center: Point| {
        let pixels: Vec<_> = disc_pixels(img, center, radius).collect();
        for (x, y) in pixels {
            if x < pw && y < ph {
                img.put_pixel(x, y, *pattern.get_pixel(x, y));
            }
        }
    };

    match points {
        [] => {}
        [single] => stamp(img, *single),
        _ => {
            for pair in points.windows(2) {
                for center in line_steps(pair[0], pair[1]) {
                    stamp(img, center);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::primitive::{Shape, Stroke};
    use crate::annotation::{AnnotationEngine, Tool};
    use std::sync::Arc;

    fn scene_parts(w: u32, h: u32) -> (RgbaImage, AnnotationLayer, OverlayChrome) {
        (
            RgbaImage::from_pixel(w, h, Rgba([200, 200, 200, 255])),
            AnnotationLayer::new(),
            OverlayChrome::hidden(),
        )
    }

    #[test]
    fn blend_is_exact_for_opaque_and_clear() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        blend_pixel(&mut img, 0, 0, Color::rgba(255, 0, 0, 0));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
        blend_pixel(&mut img, 0, 0, Color::rgb(1, 2, 3));
        assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn renders_at_physical_resolution() {
        let (bg, layer, chrome) = scene_parts(150, 90);
        let scene = Scene {
            background: &bg,
            selection: Rectangle::new(10.0, 10.0, 50.0, 30.0),
            layer: &layer,
            chrome: &chrome,
            dpi: DpiContext::new(1.5, 1.5),
            window_size: (100.0, 60.0),
        };
        let out = RasterRenderer::new().render(&scene).unwrap();
        assert_eq!(out.dimensions(), (150, 90));
        assert_eq!(out, bg);
    }

    #[test]
    fn mask_dims_only_outside_selection() {
        let (bg, layer, _) = scene_parts(100, 100);
        let chrome = OverlayChrome { selection_outline: false, ..Default::default() };
        let scene = Scene {
            background: &bg,
            selection: Rectangle::new(20.0, 20.0, 40.0, 40.0),
            layer: &layer,
            chrome: &chrome,
            dpi: DpiContext::default(),
            window_size: (100.0, 100.0),
        };
        let out = RasterRenderer::new().render(&scene).unwrap();
        assert_eq!(out.get_pixel(30, 30).0, [200, 200, 200, 255]);
        assert!(out.get_pixel(5, 5).0[0] < 200);
    }

    #[test]
    fn rectangle_stroke_is_scaled() {
        let (bg, mut layer, chrome) = scene_parts(200, 200);
        let mut shape = Shape::new(Point::new(10.0, 10.0), Stroke { color: Color::rgb(255, 0, 0), width: 2.0 });
        shape.stretch_to(Point::new(50.0, 50.0));
        layer.push(Primitive::Rectangle(shape));
        let scene = Scene {
            background: &bg,
            selection: Rectangle::new(0.0, 0.0, 100.0, 100.0),
            layer: &layer,
            chrome: &chrome,
            dpi: DpiContext::new(2.0, 2.0),
            window_size: (100.0, 100.0),
        };
        let out = RasterRenderer::new().render(&scene).unwrap();
        // Top edge sits at y = 20 physical, interior untouched
        assert_eq!(out.get_pixel(60, 20).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(60, 60).0, [200, 200, 200, 255]);
    }

    #[test]
    fn mosaic_copies_pattern_pixels() {
        let bg = RgbaImage::from_fn(96, 96, |x, y| Rgba([(x * 2) as u8, (y * 2) as u8, 50, 255]));
        let mut engine = AnnotationEngine::new().with_source(Arc::new(bg.clone()));
        engine.select_tool(Tool::Mosaic);
        let sel = Rectangle::new(0.0, 0.0, 96.0, 96.0);
        engine.pointer_down(Point::new(20.0, 48.0), &sel);
        engine.pointer_move(Point::new(70.0, 48.0), None);
        engine.pointer_up();

        let chrome = OverlayChrome::hidden();
        let scene = Scene {
            background: &bg,
            selection: sel,
            layer: engine.layer(),
            chrome: &chrome,
            dpi: DpiContext::default(),
            window_size: (96.0, 96.0),
        };
        let out = RasterRenderer::new().render(&scene).unwrap();
        let pattern = match &engine.layer().primitives()[0] {
            Primitive::Mosaic(m) => m.pattern.clone(),
            _ => unreachable!(),
        };
        assert_eq!(out.get_pixel(45, 48), pattern.get_pixel(45, 48));
        assert_eq!(out.get_pixel(45, 5), bg.get_pixel(45, 5));
    }

    #[test]
    fn oversized_render_is_rejected() {
        let (bg, layer, chrome) = scene_parts(4, 4);
        let scene = Scene {
            background: &bg,
            selection: Rectangle::new(0.0, 0.0, 1.0, 1.0),
            layer: &layer,
            chrome: &chrome,
            dpi: DpiContext::default(),
            window_size: (20000.0, 20000.0),
        };
        assert!(matches!(RasterRenderer::new().render(&scene), Err(OverlayError::Render(_))));
    }
}
