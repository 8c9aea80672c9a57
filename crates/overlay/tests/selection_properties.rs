use overlay::selection::{handle_zone, HANDLE_TOLERANCE};
use overlay::{Handle, HitTarget, Point, Rectangle, SelectionModel};

fn grid(step: f64, from: f64, to: f64) -> Vec<f64> {
    let mut v = Vec::new();
    let mut x = from;
    while x <= to {
        v.push(x);
        x += step;
    }
    v
}

fn model_with(rect: Rectangle) -> SelectionModel {
    let mut model = SelectionModel::new();
    model.set_rect(rect);
    model
}

#[test]
fn normalization_is_order_independent() {
    let coords = grid(37.5, -50.0, 200.0);
    for &x1 in &coords {
        for &y1 in &coords {
            let p1 = Point::new(x1, y1);
            let p2 = Point::new(y1 * 0.7 + 3.0, x1 - 11.0);
            let a = Rectangle::from_corners(p1, p2);
            let b = Rectangle::from_corners(p2, p1);
            assert_eq!(a, b);
            assert!(a.left() <= a.right());
            assert!(a.top() <= a.bottom());
        }
    }
}

#[test]
fn hit_test_is_exhaustive_and_exclusive() {
    let rect = Rectangle::new(100.0, 80.0, 240.0, 120.0);
    let model = model_with(rect);

    for &x in &grid(3.0, 70.0, 370.0) {
        for &y in &grid(3.0, 50.0, 230.0) {
            let p = Point::new(x, y);
            let hits: Vec<Handle> = Handle::ALL
                .iter()
                .copied()
                .filter(|&h| {
                    handle_zone(&rect, h, HANDLE_TOLERANCE).is_some_and(|z| z.contains(p))
                })
                .collect();

            let result = model.hit_test(p);
            match hits.as_slice() {
                [] if rect.contains_strict(p) => assert_eq!(result, HitTarget::Move, "{:?}", p),
                [] => assert_eq!(result, HitTarget::NewSelection, "{:?}", p),
                [only] => assert_eq!(result, HitTarget::Handle(*only), "{:?}", p),
                // Shared boundary between a corner square and an edge band
                many => {
                    let HitTarget::Handle(h) = result else {
                        panic!("{:?} hit {:?} but returned {:?}", p, many, result);
                    };
                    assert!(h.is_corner() && many.contains(&h));
                }
            }
        }
    }
}

fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Drag `handle` of `original` to `target`, then drag `expected` from where it
/// now sits back to the first pointer position.
fn round_trip(original: Rectangle, handle: Handle, target: Point, expected: Handle) {
    let mut model = model_with(original);
    let start = handle.anchor(&original);
    assert_eq!(model.begin_drag(start), HitTarget::Handle(handle));
    model.drag_to(target);
    let resized = model.end_drag().unwrap();

    let grab = expected.anchor(&resized);
    assert_eq!(
        model.hit_test(grab),
        HitTarget::Handle(expected),
        "{:?} dragged to {:?} gave {:?}",
        handle,
        target,
        resized
    );
    model.begin_drag(grab);
    model.drag_to(start);
    model.end_drag();
    assert_eq!(model.rect(), original, "{:?} via {:?}", handle, expected);
}

#[test]
fn resize_round_trips_through_every_handle() {
    let original = Rectangle::new(100.0, 100.0, 200.0, 120.0);
    let c = original.center();

    for handle in Handle::ALL {
        // Pull the handle inward: the same handle brings it back
        let a = handle.anchor(&original);
        let inward = Point::new(a.x + sign(c.x - a.x) * 30.0, a.y + sign(c.y - a.y) * 20.0);
        round_trip(original, handle, inward, handle);

        // Drag through the opposite side: the flipped rectangle now has the
        // diagonally opposite handle under the pointer
        let o = handle.opposite().anchor(&original);
        let beyond = Point::new(o.x + sign(o.x - c.x) * 50.0, o.y + sign(o.y - c.y) * 40.0);
        round_trip(original, handle, beyond, handle.opposite());
    }
}

#[test]
fn zero_area_selection_hides_affordances() {
    let mut model = SelectionModel::new();
    model.begin_drag(Point::new(50.0, 50.0));
    model.drag_to(Point::new(50.0, 90.0));
    model.end_drag();
    assert!(model.is_empty());
    assert!(!model.handles_visible());
    assert!(model.size_label().is_none());
    assert!(model.handle_squares().is_empty());
}
