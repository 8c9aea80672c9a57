//! Selection rectangle with resize handles and drag gestures

use crate::geometry::{Point, Rectangle};

/// Half-size of each handle hit zone, in logical units
pub const HANDLE_TOLERANCE: f64 = 10.0;

/// Side of the painted handle squares
pub const HANDLE_SIZE: f64 = 8.0;

/// Vertical distance of the size label above the selection
pub const SIZE_LABEL_OFFSET: f64 = 25.0;

/// Resize handle, numbered clockwise from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft = 0,
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::Top,
        Handle::TopRight,
        Handle::Right,
        Handle::BottomRight,
        Handle::Bottom,
        Handle::BottomLeft,
        Handle::Left,
    ];

    pub const CORNERS: [Handle; 4] =
        [Handle::TopLeft, Handle::TopRight, Handle::BottomRight, Handle::BottomLeft];

    pub const EDGES: [Handle; 4] = [Handle::Top, Handle::Right, Handle::Bottom, Handle::Left];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_corner(self) -> bool {
        self.index() % 2 == 0
    }

    /// Handle on the other side of the rectangle
    pub fn opposite(self) -> Handle {
        Handle::ALL[(self.index() + 4) % 8]
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::BottomLeft | Handle::Left)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::TopRight | Handle::BottomRight | Handle::Right)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopRight | Handle::Top)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomRight | Handle::Bottom)
    }

    /// Where the handle sits on `rect`
    pub fn anchor(self, rect: &Rectangle) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Handle::TopLeft => Point::new(rect.left(), rect.top()),
            Handle::Top => Point::new(cx, rect.top()),
            Handle::TopRight => Point::new(rect.right(), rect.top()),
            Handle::Right => Point::new(rect.right(), cy),
            Handle::BottomRight => Point::new(rect.right(), rect.bottom()),
            Handle::Bottom => Point::new(cx, rect.bottom()),
            Handle::BottomLeft => Point::new(rect.left(), rect.bottom()),
            Handle::Left => Point::new(rect.left(), cy),
        }
    }

    /// Replace the edges this handle controls with the pointer coordinate
    pub fn resize(self, anchor: &Rectangle, pointer: Point) -> Rectangle {
        let left = if self.moves_left() { pointer.x } else { anchor.left() };
        let right = if self.moves_right() { pointer.x } else { anchor.right() };
        let top = if self.moves_top() { pointer.y } else { anchor.top() };
        let bottom = if self.moves_bottom() { pointer.y } else { anchor.bottom() };
        Rectangle::from_edges(left, top, right, bottom)
    }
}

/// What a pointer-down on the selection layer grabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(Handle),
    Move,
    NewSelection,
}

/// Pointer gesture, alive only while the pointer is captured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub target: HitTarget,
    pub anchor_rect: Rectangle,
    pub anchor_point: Point,
}

/// Text and position of the "{w} x {h}" badge
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLabel {
    pub text: String,
    pub position: Point,
}

/// Selection state machine
#[derive(Debug, Clone)]
pub struct SelectionModel {
    rect: Rectangle,
    gesture: Option<Gesture>,
    tolerance: f64,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::with_tolerance(HANDLE_TOLERANCE)
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            rect: Rectangle::default(),
            gesture: None,
            tolerance,
        }
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    /// Replace the selection outright, dropping any gesture
    pub fn set_rect(&mut self, rect: Rectangle) {
        self.rect = rect;
        self.gesture = None;
    }

    pub fn reset(&mut self) {
        self.set_rect(Rectangle::default());
    }

    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Hit zone of a handle on the current selection, `None` when hidden
    pub fn handle_zone(&self, handle: Handle) -> Option<Rectangle> {
        handle_zone(&self.rect, handle, self.tolerance)
    }

    pub fn hit_test(&self, p: Point) -> HitTarget {
        if self.rect.is_empty() {
            return HitTarget::NewSelection;
        }

        // Corners first so they win over the edge bands
        for handle in Handle::CORNERS.into_iter().chain(Handle::EDGES) {
            if self.handle_zone(handle).is_some_and(|zone| zone.contains(p)) {
                return HitTarget::Handle(handle);
            }
        }

        if self.rect.contains_strict(p) {
            HitTarget::Move
        } else {
            HitTarget::NewSelection
        }
    }

    /// Capture the pointer and start a gesture
    pub fn begin_drag(&mut self, p: Point) -> HitTarget {
        let target = self.hit_test(p);
        let anchor_rect = match target {
            HitTarget::NewSelection => Rectangle::empty_at(p),
            _ => self.rect,
        };

        self.rect = anchor_rect;
        self.gesture = Some(Gesture { target, anchor_rect, anchor_point: p });
        target
    }

    /// Update the selection for the captured gesture; false when idle
    pub fn drag_to(&mut self, p: Point) -> bool {
        let Some(gesture) = self.gesture else {
            return false;
        };

        self.rect = match gesture.target {
            HitTarget::Handle(handle) => handle.resize(&gesture.anchor_rect, p),
            HitTarget::Move => {
                let (dx, dy) = p.delta_from(gesture.anchor_point);
                gesture.anchor_rect.translate(dx, dy)
            }
            HitTarget::NewSelection => Rectangle::from_corners(gesture.anchor_point, p),
        };
        true
    }

    /// Release the pointer, returning the settled rectangle
    pub fn end_drag(&mut self) -> Option<Rectangle> {
        self.gesture.take().map(|_| self.rect)
    }

    pub fn handles_visible(&self) -> bool {
        !self.rect.is_empty()
    }

    /// Painted handle squares
    pub fn handle_squares(&self) -> Vec<(Handle, Rectangle)> {
        if !self.handles_visible() {
            return Vec::new();
        }
        let half = HANDLE_SIZE / 2.0;
        Handle::ALL
            .iter()
            .map(|&h| {
                let c = h.anchor(&self.rect);
                (h, Rectangle::new(c.x - half, c.y - half, HANDLE_SIZE, HANDLE_SIZE))
            })
            .collect()
    }

    pub fn size_label(&self) -> Option<SizeLabel> {
        if !self.handles_visible() {
            return None;
        }
        Some(SizeLabel {
            text: format!("{} x {}", self.rect.width as i64, self.rect.height as i64),
            position: Point::new(self.rect.x, self.rect.y - SIZE_LABEL_OFFSET),
        })
    }
}

/// Hit zone of `handle` on `rect` with half-size `t`.
///
/// Corner zones are `2t` squares centred on the corner. Edge zones are `2t`
/// thick bands along the edge with the corner zones cut away, so they vanish
/// when the edge is shorter than `2t`.
pub fn handle_zone(rect: &Rectangle, handle: Handle, t: f64) -> Option<Rectangle> {
    if rect.is_empty() {
        return None;
    }

    if handle.is_corner() {
        let c = handle.anchor(rect);
        return Some(Rectangle::new(c.x - t, c.y - t, 2.0 * t, 2.0 * t));
    }

    let zone = match handle {
        Handle::Top | Handle::Bottom => {
            let y = if handle == Handle::Top { rect.top() } else { rect.bottom() };
            let (start, end) = (rect.left() + t, rect.right() - t);
            if end <= start {
                return None;
            }
            Rectangle::from_edges(start, y - t, end, y + t)
        }
        _ => {
            let x = if handle == Handle::Left { rect.left() } else { rect.right() };
            let (start, end) = (rect.top() + t, rect.bottom() - t);
            if end <= start {
                return None;
            }
            Rectangle::from_edges(x - t, start, x + t, end)
        }
    };
    Some(zone)
}

/// Cursor shape to show for a hit target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Crosshair,
    Move,
    ResizeNwSe,
    ResizeNeSw,
    ResizeNs,
    ResizeEw,
    Draw,
    Text,
}

impl From<HitTarget> for CursorHint {
    fn from(target: HitTarget) -> Self {
        match target {
            HitTarget::Handle(Handle::TopLeft | Handle::BottomRight) => CursorHint::ResizeNwSe,
            HitTarget::Handle(Handle::TopRight | Handle::BottomLeft) => CursorHint::ResizeNeSw,
            HitTarget::Handle(Handle::Top | Handle::Bottom) => CursorHint::ResizeNs,
            HitTarget::Handle(Handle::Left | Handle::Right) => CursorHint::ResizeEw,
            HitTarget::Move => CursorHint::Move,
            HitTarget::NewSelection => CursorHint::Crosshair,
        }
    }
}
