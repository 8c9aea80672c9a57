use capture::Rect;
use image::{Rgba, RgbaImage};
use overlay::annotation::{Primitive, Tool};
use overlay::assist::{AssistError, AssistKind, AssistOutput, AssistPanel, RecognizedLine};
use overlay::{
    Command, DpiContext, OverlayController, OverlayKey, Point, PointerButton, RasterRenderer,
    Rectangle, ToolbarAction,
};

fn controller(width: u32, height: u32) -> OverlayController {
    let shot = RgbaImage::from_pixel(width, height, Rgba([90, 120, 150, 255]));
    OverlayController::new(shot, DpiContext::default())
}

fn drag(ctrl: &mut OverlayController, from: Point, to: Point) {
    ctrl.pointer_down(from, PointerButton::Primary);
    ctrl.pointer_move(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
    ctrl.pointer_move(to);
    ctrl.pointer_up(to);
}

fn selected(width: u32, height: u32, from: Point, to: Point) -> OverlayController {
    let mut ctrl = controller(width, height);
    drag(&mut ctrl, from, to);
    ctrl
}

#[test]
fn drawing_then_undo_leaves_selection_alone() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(300.0, 200.0));
    let before = ctrl.selection().rect();
    assert_eq!(before, Rectangle::new(10.0, 10.0, 290.0, 190.0));

    ctrl.toolbar(ToolbarAction::Tool(Tool::Rectangle));
    drag(&mut ctrl, Point::new(20.0, 20.0), Point::new(80.0, 50.0));
    assert_eq!(ctrl.layer().len(), 1);
    match &ctrl.layer().primitives()[0] {
        Primitive::Rectangle(shape) => {
            assert_eq!(shape.bounds, Rectangle::new(20.0, 20.0, 60.0, 30.0))
        }
        other => panic!("unexpected primitive {:?}", other),
    }

    assert_eq!(ctrl.key(OverlayKey::Undo), Command::Redraw);
    assert!(ctrl.layer().is_empty());
    assert_eq!(ctrl.selection().rect(), before);
    assert_eq!(ctrl.key(OverlayKey::Undo), Command::None);
}

#[test]
fn drawing_outside_the_selection_starts_a_new_one() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(100.0, 100.0));
    ctrl.toolbar(ToolbarAction::Tool(Tool::Arrow));
    drag(&mut ctrl, Point::new(200.0, 150.0), Point::new(260.0, 210.0));
    assert!(ctrl.layer().is_empty());
    assert_eq!(ctrl.selection().rect(), Rectangle::new(200.0, 150.0, 60.0, 60.0));
}

#[test]
fn no_tool_drag_inside_moves_the_selection() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
    drag(&mut ctrl, Point::new(50.0, 30.0), Point::new(80.0, 50.0));
    assert_eq!(ctrl.selection().rect(), Rectangle::new(40.0, 30.0, 100.0, 50.0));
}

#[test]
fn right_click_closes_or_commits_the_draft() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(300.0, 200.0));
    ctrl.toolbar(ToolbarAction::Tool(Tool::Text));
    assert_eq!(ctrl.pointer_down(Point::new(40.0, 40.0), PointerButton::Primary), Command::Redraw);
    ctrl.pointer_up(Point::new(40.0, 40.0));
    ctrl.draft_text_mut().unwrap().push_str("note");

    assert_eq!(ctrl.pointer_down(Point::new(5.0, 5.0), PointerButton::Secondary), Command::Redraw);
    assert!(ctrl.draft().is_none());
    assert_eq!(ctrl.layer().len(), 1);

    assert_eq!(ctrl.pointer_down(Point::new(5.0, 5.0), PointerButton::Secondary), Command::Close);
}

#[test]
fn keys_follow_overlay_state() {
    let mut ctrl = controller(400, 300);
    assert_eq!(ctrl.key(OverlayKey::Enter), Command::None);
    assert_eq!(ctrl.key(OverlayKey::Escape), Command::Close);

    drag(&mut ctrl, Point::new(10.0, 10.0), Point::new(200.0, 100.0));
    assert_eq!(ctrl.key(OverlayKey::Enter), Command::Copy);

    ctrl.toolbar(ToolbarAction::Tool(Tool::Text));
    ctrl.pointer_down(Point::new(50.0, 50.0), PointerButton::Primary);
    ctrl.pointer_up(Point::new(50.0, 50.0));
    ctrl.draft_text_mut().unwrap().push_str("draft");
    assert_eq!(ctrl.key(OverlayKey::Escape), Command::Redraw);
    assert!(ctrl.draft().is_none());
    assert!(ctrl.layer().is_empty());
}

#[test]
fn toolbar_actions_need_a_selection() {
    let mut ctrl = controller(400, 300);
    assert_eq!(ctrl.toolbar(ToolbarAction::Save), Command::None);
    assert_eq!(ctrl.toolbar(ToolbarAction::Cancel), Command::Close);

    drag(&mut ctrl, Point::new(10.0, 10.0), Point::new(200.0, 100.0));
    assert_eq!(ctrl.toolbar(ToolbarAction::Save), Command::Save);
    assert_eq!(ctrl.toolbar(ToolbarAction::Copy), Command::Copy);
    assert_eq!(
        ctrl.toolbar(ToolbarAction::Translate),
        Command::Assist(AssistKind::Translate)
    );
}

#[test]
fn toolbar_sits_below_and_flips_above() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(300.0, 200.0));
    assert_eq!(ctrl.toolbar_rect(), Some(Rectangle::new(0.0, 205.0, 400.0, 36.0)));

    ctrl.set_toolbar_size(120.0, 30.0);
    assert_eq!(ctrl.toolbar_rect(), Some(Rectangle::new(180.0, 205.0, 120.0, 30.0)));

    let mut low = selected(400, 300, Point::new(100.0, 200.0), Point::new(300.0, 280.0));
    low.set_toolbar_size(120.0, 30.0);
    assert_eq!(low.toolbar_rect(), Some(Rectangle::new(180.0, 165.0, 120.0, 30.0)));

    assert_eq!(controller(400, 300).toolbar_rect(), None);
}

#[test]
fn clicks_on_ui_regions_are_ignored() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(300.0, 200.0));
    ctrl.set_ui_regions(vec![Rectangle::new(180.0, 205.0, 120.0, 30.0)]);
    assert_eq!(ctrl.pointer_down(Point::new(200.0, 220.0), PointerButton::Primary), Command::None);
    assert_eq!(ctrl.selection().rect(), Rectangle::new(10.0, 10.0, 290.0, 190.0));
}

#[test]
fn committed_label_drags_before_drawing() {
    let mut ctrl = selected(400, 300, Point::new(10.0, 10.0), Point::new(300.0, 200.0));
    ctrl.toolbar(ToolbarAction::Tool(Tool::Text));
    ctrl.pointer_down(Point::new(40.0, 40.0), PointerButton::Primary);
    ctrl.pointer_up(Point::new(40.0, 40.0));
    ctrl.draft_text_mut().unwrap().push_str("hi");
    assert_eq!(ctrl.key(OverlayKey::Enter), Command::Redraw);

    ctrl.toolbar(ToolbarAction::Tool(Tool::Rectangle));
    drag(&mut ctrl, Point::new(45.0, 50.0), Point::new(65.0, 60.0));

    assert_eq!(ctrl.layer().len(), 1);
    let label = ctrl.layer().primitives()[0].as_text().unwrap();
    assert_eq!(label.position, Point::new(60.0, 52.0));
}

#[test]
fn stale_assist_results_are_dropped() {
    let mut ctrl = selected(400, 300, Point::new(20.0, 30.0), Point::new(220.0, 130.0));
    let renderer = RasterRenderer::new();

    let first = ctrl.begin_assist(AssistKind::Recognize, &renderer).unwrap();
    let second = ctrl.begin_assist(AssistKind::Recognize, &renderer).unwrap();
    assert!(second.generation > first.generation);
    assert_eq!((second.image.width(), second.image.height()), (200, 100));

    let line = RecognizedLine { text: "hello".into(), bounds: Rect::new(4, 6, 50, 20) };
    assert!(!ctrl.finish_assist(first.generation, Ok(AssistOutput::Recognized(vec![line.clone()]))));
    assert!(matches!(ctrl.assist_panel(), AssistPanel::Pending { .. }));

    assert!(ctrl.finish_assist(second.generation, Ok(AssistOutput::Recognized(vec![line]))));
    match ctrl.assist_panel() {
        AssistPanel::Ready { boxes, .. } => {
            assert_eq!(boxes.len(), 1);
            assert_eq!(boxes[0].bounds, Rectangle::new(24.0, 36.0, 50.0, 20.0));
        }
        other => panic!("unexpected panel {:?}", other),
    }
    assert_eq!(ctrl.assist_panel().joined_text().as_deref(), Some("hello"));

    // A new selection drag dismisses the results
    drag(&mut ctrl, Point::new(300.0, 200.0), Point::new(350.0, 250.0));
    assert_eq!(ctrl.assist_panel(), &AssistPanel::Hidden);
}

#[test]
fn empty_or_failed_assist_reports_a_message() {
    let mut ctrl = selected(400, 300, Point::new(20.0, 30.0), Point::new(220.0, 130.0));
    let renderer = RasterRenderer::new();

    let req = ctrl.begin_assist(AssistKind::Recognize, &renderer).unwrap();
    ctrl.finish_assist(req.generation, Ok(AssistOutput::Recognized(Vec::new())));
    assert_eq!(
        ctrl.assist_panel(),
        &AssistPanel::Failed { kind: AssistKind::Recognize, message: "No text detected".into() }
    );

    let req = ctrl.begin_assist(AssistKind::Translate, &renderer).unwrap();
    ctrl.finish_assist(req.generation, Err(AssistError::Network("timeout".into())));
    assert!(matches!(
        ctrl.assist_panel(),
        AssistPanel::Failed { kind: AssistKind::Translate, .. }
    ));
}

#[test]
fn assist_without_selection_does_nothing() {
    let mut ctrl = controller(100, 100);
    assert!(ctrl.begin_assist(AssistKind::Recognize, &RasterRenderer::new()).is_none());
    assert_eq!(ctrl.assist_panel(), &AssistPanel::Hidden);
}
