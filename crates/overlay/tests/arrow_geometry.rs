use overlay::annotation::{arrow_head, AnnotationEngine, Primitive, Tool};
use overlay::{Point, Rectangle};

const EPS: f64 = 1e-9;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

#[test]
fn horizontal_shaft_has_symmetric_wings() {
    let head = arrow_head(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
    let back = 100.0 - 15.0 * (30f64).to_radians().cos();

    assert_eq!(head.tip, Point::new(100.0, 0.0));
    assert!(close(head.left, Point::new(back, 7.5)), "{:?}", head.left);
    assert!(close(head.right, Point::new(back, -7.5)), "{:?}", head.right);
}

#[test]
fn wings_are_fifteen_long_at_thirty_degrees() {
    let shafts = [
        (Point::new(10.0, 10.0), Point::new(10.0, 90.0)),
        (Point::new(50.0, 50.0), Point::new(-20.0, 13.0)),
        (Point::new(0.0, 0.0), Point::new(3.0, 4.0)),
    ];
    for (start, end) in shafts {
        let head = arrow_head(start, end);
        let shaft_angle = (start.y - end.y).atan2(start.x - end.x);
        for wing in [head.left, head.right] {
            assert!((wing.distance_to(end) - 15.0).abs() < EPS);
            let wing_angle = (wing.y - end.y).atan2(wing.x - end.x);
            let mut diff = (wing_angle - shaft_angle).abs();
            if diff > std::f64::consts::PI {
                diff = std::f64::consts::TAU - diff;
            }
            assert!((diff - std::f64::consts::FRAC_PI_6).abs() < 1e-9, "{:?} -> {:?}", start, end);
        }
    }
}

#[test]
fn arrow_tool_records_the_drag() {
    let mut engine = AnnotationEngine::new();
    engine.select_tool(Tool::Arrow);
    let sel = Rectangle::new(0.0, 0.0, 200.0, 200.0);
    engine.pointer_down(Point::new(20.0, 40.0), &sel);
    engine.pointer_move(Point::new(60.0, 40.0), None);
    engine.pointer_move(Point::new(120.0, 40.0), None);
    assert_eq!(engine.pointer_up(), Some(0));

    match &engine.layer().primitives()[0] {
        Primitive::Arrow(arrow) => {
            assert_eq!(arrow.start, Point::new(20.0, 40.0));
            assert_eq!(arrow.head().tip, Point::new(120.0, 40.0));
        }
        other => panic!("unexpected primitive {:?}", other),
    }
}
