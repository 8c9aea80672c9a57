//! Painting the overlay scene with egui

use eframe::egui::{self, Color32, Pos2, Shape, Stroke};
use overlay::annotation::{Color, MosaicStroke, Primitive};
use overlay::assist::{AssistPanel, ResultBox};
use overlay::render::{MASK_COLOR, OUTLINE_COLOR};
use overlay::{OverlayController, Point, Rectangle};
use std::f32::consts::TAU;

const HANDLE_FILL: Color32 = Color32::WHITE;
const LABEL_BG: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 180);
const RESULT_HIGHLIGHT: Color32 = Color32::from_rgba_premultiplied(30, 144, 255, 60);

pub fn pos(p: Point) -> Pos2 {
    Pos2::new(p.x as f32, p.y as f32)
}

pub fn rect(r: &Rectangle) -> egui::Rect {
    egui::Rect::from_min_size(
        Pos2::new(r.x as f32, r.y as f32),
        egui::vec2(r.width as f32, r.height as f32),
    )
}

pub fn logical(r: egui::Rect) -> Rectangle {
    Rectangle::new(r.min.x as f64, r.min.y as f64, r.width() as f64, r.height() as f64)
}

pub fn color(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Textures the scene needs besides the fonts
pub struct SceneTextures<'a> {
    pub screenshot: &'a egui::TextureHandle,
    pub mosaic: Option<&'a egui::TextureHandle>,
}

/// Everything under the egui widgets: screenshot, mask, annotations and chrome
pub fn scene(painter: &egui::Painter, ctrl: &OverlayController, textures: &SceneTextures<'_>) {
    let (w, h) = ctrl.window_size();
    let window = egui::Rect::from_min_size(Pos2::ZERO, egui::vec2(w as f32, h as f32));
    let uv = egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    painter.image(textures.screenshot.id(), window, uv, Color32::WHITE);

    let chrome = ctrl.chrome();
    let selection = ctrl.selection();
    let sel = selection.rect();

    if chrome.mask {
        mask_outside(painter, window, &sel);
    }

    let layer = ctrl.layer();
    let pending = ctrl.engine().tools().pending();
    for primitive in layer.primitives().iter().chain(pending) {
        self::primitive(painter, primitive, textures.mosaic, window.size());
    }

    if !sel.is_empty() {
        if chrome.selection_outline {
            painter.rect_stroke(rect(&sel), 0.0, Stroke::new(1.0, color(OUTLINE_COLOR)));
            for (_, square) in selection.handle_squares() {
                let r = rect(&square);
                painter.rect_filled(r, 0.0, HANDLE_FILL);
                painter.rect_stroke(r, 0.0, Stroke::new(1.0, color(OUTLINE_COLOR)));
            }
        }
        if chrome.size_label {
            if let Some(label) = selection.size_label() {
                tag(painter, pos(label.position), &label.text, Color32::WHITE, LABEL_BG);
            }
        }
    }

    if chrome.result_overlay {
        if let AssistPanel::Ready { boxes, .. } = ctrl.assist_panel() {
            for result in boxes {
                result_box(painter, result);
            }
        }
    }

    if let Some(status) = ctrl.status() {
        let at = Pos2::new(sel.x as f32, (sel.bottom() as f32 + 4.0).min(h as f32 - 24.0));
        tag(painter, at, status, Color32::from_rgb(255, 120, 120), LABEL_BG);
    }
}

fn mask_outside(painter: &egui::Painter, window: egui::Rect, sel: &Rectangle) {
    let dim = color(MASK_COLOR);
    if sel.is_empty() {
        painter.rect_filled(window, 0.0, dim);
        return;
    }
    let s = rect(sel).intersect(window);
    let bands = [
        egui::Rect::from_min_max(window.min, Pos2::new(window.max.x, s.min.y)),
        egui::Rect::from_min_max(Pos2::new(window.min.x, s.max.y), window.max),
        egui::Rect::from_min_max(Pos2::new(window.min.x, s.min.y), Pos2::new(s.min.x, s.max.y)),
        egui::Rect::from_min_max(Pos2::new(s.max.x, s.min.y), Pos2::new(window.max.x, s.max.y)),
    ];
    for band in bands {
        if band.is_positive() {
            painter.rect_filled(band, 0.0, dim);
        }
    }
}

fn primitive(
    painter: &egui::Painter,
    primitive: &Primitive,
    mosaic: Option<&egui::TextureHandle>,
    window: egui::Vec2,
) {
    match primitive {
        Primitive::Rectangle(shape) => {
            let stroke = Stroke::new(shape.stroke.width as f32, color(shape.stroke.color));
            painter.rect_stroke(rect(&shape.bounds), 0.0, stroke);
        }
        Primitive::Ellipse(shape) => {
            let r = rect(&shape.bounds);
            let (c, rx, ry) = (r.center(), r.width() / 2.0, r.height() / 2.0);
            let segments = ((rx + ry) * 2.0).clamp(32.0, 360.0) as usize;
            let points = (0..segments)
                .map(|i| {
                    let t = i as f32 / segments as f32 * TAU;
                    Pos2::new(c.x + rx * t.cos(), c.y + ry * t.sin())
                })
                .collect();
            let stroke = Stroke::new(shape.stroke.width as f32, color(shape.stroke.color));
            painter.add(Shape::closed_line(points, stroke));
        }
        Primitive::Arrow(arrow) => {
            let head = arrow.head();
            let fill = color(arrow.stroke.color);
            let stroke = Stroke::new(arrow.stroke.width as f32, fill);
            painter.line_segment([pos(arrow.start), pos(head.tip)], stroke);
            painter.add(Shape::convex_polygon(
                vec![pos(head.tip), pos(head.left), pos(head.right)],
                fill,
                stroke,
            ));
        }
        Primitive::Freehand(path) => {
            let stroke = Stroke::new(path.stroke.width as f32, color(path.stroke.color));
            let points: Vec<Pos2> = path.points.iter().map(|&p| pos(p)).collect();
            if let [single] = points.as_slice() {
                painter.circle_filled(*single, stroke.width / 2.0, stroke.color);
            } else {
                painter.add(Shape::line(points, stroke));
            }
        }
        Primitive::Mosaic(stroke) => {
            if let Some(texture) = mosaic {
                painter.add(Shape::mesh(mosaic_mesh(stroke, texture.id(), window)));
            }
        }
        Primitive::Text(label) => {
            painter.text(
                pos(label.position),
                egui::Align2::LEFT_TOP,
                &label.text,
                egui::FontId::proportional(label.font_size as f32),
                color(label.color),
            );
        }
    }
}

/// Thick textured polyline whose texture coordinates follow the window, so
/// the pixelated copy of the screenshot shows through exactly where painted
pub fn mosaic_mesh(stroke: &MosaicStroke, texture: egui::TextureId, window: egui::Vec2) -> egui::Mesh {
    let mut mesh = egui::Mesh::with_texture(texture);
    let radius = stroke.width as f32 / 2.0;
    let points: Vec<Pos2> = stroke.points.iter().map(|&p| pos(p)).collect();
    let uv = |p: Pos2| Pos2::new(p.x / window.x.max(1.0), p.y / window.y.max(1.0));
    let vertex = |mesh: &mut egui::Mesh, p: Pos2| {
        let index = mesh.vertices.len() as u32;
        mesh.vertices.push(egui::epaint::Vertex { pos: p, uv: uv(p), color: Color32::WHITE });
        index
    };

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let dir = b - a;
        if dir.length_sq() <= f32::EPSILON {
            continue;
        }
        let n = dir.normalized().rot90() * radius;
        let i0 = vertex(&mut mesh, a + n);
        let i1 = vertex(&mut mesh, b + n);
        let i2 = vertex(&mut mesh, b - n);
        let i3 = vertex(&mut mesh, a - n);
        mesh.add_triangle(i0, i1, i2);
        mesh.add_triangle(i0, i2, i3);
    }

    // Round joins and caps
    const CAP_SEGMENTS: usize = 16;
    for &p in &points {
        let center = vertex(&mut mesh, p);
        let first = mesh.vertices.len() as u32;
        for i in 0..CAP_SEGMENTS {
            let t = i as f32 / CAP_SEGMENTS as f32 * TAU;
            vertex(&mut mesh, p + egui::vec2(t.cos(), t.sin()) * radius);
        }
        for i in 0..CAP_SEGMENTS as u32 {
            let next = (i + 1) % CAP_SEGMENTS as u32;
            mesh.add_triangle(center, first + i, first + next);
        }
    }
    mesh
}

fn result_box(painter: &egui::Painter, result: &ResultBox) {
    let r = rect(&result.bounds);
    match (result.background, result.text_color) {
        (Some(bg), Some(fg)) => {
            painter.rect_filled(r, 2.0, color(bg));
            let size = (r.height() * 0.8).max(10.0);
            painter.text(
                r.left_center(),
                egui::Align2::LEFT_CENTER,
                &result.text,
                egui::FontId::proportional(size),
                color(fg),
            );
        }
        _ => {
            painter.rect_filled(r, 2.0, RESULT_HIGHLIGHT);
            painter.rect_stroke(r, 2.0, Stroke::new(1.0, color(OUTLINE_COLOR)));
        }
    }
}

/// Small text tag with a dark background
fn tag(painter: &egui::Painter, at: Pos2, text: &str, fg: Color32, bg: Color32) {
    let galley = painter.layout_no_wrap(text.to_owned(), egui::FontId::proportional(13.0), fg);
    let r = egui::Rect::from_min_size(at, galley.size()).expand(3.0);
    painter.rect_filled(r, 3.0, bg);
    painter.galley(at, galley, fg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    #[test]
    fn rect_conversion_round_trips() {
        let r = Rectangle::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(logical(rect(&r)), r);
        assert_eq!(color(Color::rgb(1, 2, 3)), Color32::from_rgb(1, 2, 3));
    }

    #[test]
    fn mosaic_mesh_maps_window_to_uv() {
        let stroke = MosaicStroke {
            points: vec![Point::new(50.0, 25.0), Point::new(150.0, 25.0)],
            width: 10.0,
            pattern: Arc::new(RgbaImage::new(4, 4)),
        };
        let mesh = mosaic_mesh(&stroke, egui::TextureId::Managed(1), egui::vec2(200.0, 100.0));
        assert!(mesh.is_valid());
        let first = mesh.vertices[0];
        assert!((first.uv.x - first.pos.x / 200.0).abs() < 1e-6);
        assert!((first.uv.y - first.pos.y / 100.0).abs() < 1e-6);
        // Segment quad plus two round caps
        assert_eq!(mesh.indices.len(), 6 + 2 * 16 * 3);
    }
}
