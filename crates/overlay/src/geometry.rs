//! Logical-space geometry shared by selection and annotations

/// Point in logical window units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Vector from `origin` to `self`
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        let (dx, dy) = self.delta_from(other);
        dx.hypot(dy)
    }
}

/// Axis-aligned rectangle in logical units, always stored normalized
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Build from origin and size; negative sizes are folded back.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_edges(x, y, x + width, y + height)
    }

    /// Rectangle spanning two arbitrary corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_edges(a.x, a.y, b.x, b.y)
    }

    /// Min/max normalize a pair of horizontal and vertical edges
    pub fn from_edges(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let left = x1.min(x2);
        let top = y1.min(y2);
        Self {
            x: left,
            y: top,
            width: x1.max(x2) - left,
            height: y1.max(y2) - top,
        }
    }

    /// Zero-area rectangle at `p`
    pub fn empty_at(p: Point) -> Self {
        Self { x: p.x, y: p.y, width: 0.0, height: 0.0 }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive containment
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Containment excluding the border
    pub fn contains_strict(&self, p: Point) -> bool {
        p.x > self.left() && p.x < self.right() && p.y > self.top() && p.y < self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rectangle {
        Rectangle { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Grow by `amount` on every side
    pub fn inflate(&self, amount: f64) -> Rectangle {
        Rectangle::from_edges(
            self.left() - amount,
            self.top() - amount,
            self.right() + amount,
            self.bottom() + amount,
        )
    }

    /// Smallest rectangle containing every point, `None` for an empty slice
    pub fn bounding(points: &[Point]) -> Option<Rectangle> {
        let first = points.first()?;
        let (mut l, mut t, mut r, mut b) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            l = l.min(p.x);
            t = t.min(p.y);
            r = r.max(p.x);
            b = b.max(p.y);
        }
        Some(Rectangle::from_edges(l, t, r, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_order_independent() {
        let a = Point::new(110.0, 15.0);
        let b = Point::new(10.0, 60.0);
        let r = Rectangle::from_corners(a, b);
        assert_eq!(r, Rectangle::from_corners(b, a));
        assert_eq!(r, Rectangle { x: 10.0, y: 15.0, width: 100.0, height: 45.0 });
    }

    #[test]
    fn negative_size_is_folded() {
        let r = Rectangle::new(50.0, 50.0, -20.0, -10.0);
        assert_eq!(r, Rectangle { x: 30.0, y: 40.0, width: 20.0, height: 10.0 });
    }

    #[test]
    fn strict_containment_excludes_border() {
        let r = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains_strict(Point::new(10.0, 5.0)));
        assert!(r.contains_strict(Point::new(5.0, 5.0)));
    }

    #[test]
    fn empty_rect_detection() {
        assert!(Rectangle::empty_at(Point::new(3.0, 4.0)).is_empty());
        assert!(Rectangle::new(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!Rectangle::new(0.0, 0.0, 5.0, 1.0).is_empty());
    }

    #[test]
    fn bounding_box_of_points() {
        let pts = [Point::new(5.0, 9.0), Point::new(-1.0, 3.0), Point::new(2.0, 12.0)];
        assert_eq!(
            Rectangle::bounding(&pts),
            Some(Rectangle::from_edges(-1.0, 3.0, 5.0, 12.0))
        );
        assert_eq!(Rectangle::bounding(&[]), None);
    }
}
