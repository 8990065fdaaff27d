use tern_ui::color::Color;
use tern_ui::event_queue::EventQueue;
use tern_ui::input::{InputDevices, PointerSample};
use tern_ui::node::{ButtonProps, NodeKind, RectProps, TextProps};
use tern_ui::render::{draw_snapshot, DrawCall, RecordingSurface};
use tern_ui::tree::SceneTree;

fn draw(tree: &SceneTree, devices: &InputDevices) -> Vec<DrawCall> {
    let view = tree.view();
    let mut surface = RecordingSurface::new();
    let guard = view.render_lock();
    draw_snapshot(guard.snapshot(), devices, &mut surface);
    surface.calls
}

#[test]
fn filled_rect_issues_exactly_one_fill_and_no_outline() {
    let mut tree = SceneTree::new();
    tree.create_node("r1", NodeKind::Rect(RectProps::at(0, 0, 100, 50)));
    tree.set_rect_fill("r1", Some(Color::RED));
    tree.append_child("", "r1");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    assert_eq!(calls, [DrawCall::FillRect { x: 0, y: 0, w: 100, h: 50, color: Color::RED }]);
}

#[test]
fn unfilled_rect_with_outline_draws_outline_only() {
    let mut tree = SceneTree::new();
    tree.create_node("r1", NodeKind::Rect(RectProps::at(5, 5, 40, 40)));
    tree.set_rect_outline("r1", Some(Color::SKY_BLUE));
    tree.append_child("", "r1");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    assert_eq!(
        calls,
        [DrawCall::OutlineRect { x: 5, y: 5, w: 40, h: 40, thickness: 1, color: Color::SKY_BLUE }]
    );
}

#[test]
fn children_draw_after_and_relative_to_their_parent() {
    let mut tree = SceneTree::new();
    tree.create_node("outer", NodeKind::Rect(RectProps::at(10, 20, 200, 200)));
    tree.set_rect_fill("outer", Some(Color::DARK_GRAY));
    tree.create_node("inner", NodeKind::Rect(RectProps::at(5, 5, 50, 50)));
    tree.set_rect_fill("inner", Some(Color::GOLD));
    tree.append_child("", "outer");
    tree.append_child("outer", "inner");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    assert_eq!(
        calls,
        [
            DrawCall::FillRect { x: 10, y: 20, w: 200, h: 200, color: Color::DARK_GRAY },
            DrawCall::FillRect { x: 15, y: 25, w: 50, h: 50, color: Color::GOLD },
        ]
    );
}

#[test]
fn text_concatenates_raw_children_into_one_draw() {
    let mut tree = SceneTree::new();
    tree.create_node("panel", NodeKind::Rect(RectProps::at(100, 100, 300, 100)));
    tree.create_node("caption", NodeKind::Text(TextProps { font_size: 20, ..TextProps::default() }));
    tree.create_node("part1", NodeKind::RawText("Hello, ".into()));
    tree.create_node("part2", NodeKind::RawText("deck".into()));
    tree.append_child("", "panel");
    tree.append_child("panel", "caption");
    tree.append_child("caption", "part1");
    tree.append_child("caption", "part2");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    assert_eq!(
        calls,
        [DrawCall::Text {
            content: "Hello, deck".into(),
            x: 108,
            y: 108,
            font_size: 20,
            color: Color::BLACK,
        }]
    );
}

#[test]
fn sibling_text_lines_stack_by_font_size() {
    let mut tree = SceneTree::new();
    tree.create_node("panel", NodeKind::Rect(RectProps::at(0, 0, 300, 300)));
    for (id, raw, content) in
        [("line1", "line1-str", "first"), ("line2", "line2-str", "second")]
    {
        tree.create_node(id, NodeKind::Text(TextProps { font_size: 10, ..TextProps::default() }));
        tree.create_node(raw, NodeKind::RawText(content.into()));
        tree.append_child("panel", id);
        tree.append_child(id, raw);
    }
    tree.append_child("", "panel");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    let positions: Vec<(i32, i32)> = calls
        .iter()
        .filter_map(|call| match call {
            DrawCall::Text { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
        .collect();
    assert_eq!(positions, [(8, 8), (8, 18)], "second line sits one font size lower");
}

#[test]
fn text_defaults_apply_when_unset() {
    let mut tree = SceneTree::new();
    tree.create_node("caption", NodeKind::Text(TextProps::default()));
    tree.create_node("caption-str", NodeKind::RawText("x".into()));
    tree.append_child("", "caption");
    tree.append_child("caption", "caption-str");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    assert_eq!(
        calls,
        [DrawCall::Text { content: "x".into(), x: 8, y: 8, font_size: 30, color: Color::BLACK }]
    );
}

#[test]
fn bordered_text_draws_a_measured_outline_first() {
    let mut tree = SceneTree::new();
    tree.create_node(
        "caption",
        NodeKind::Text(TextProps { font_size: 20, color: Some(Color::GOLD), border: true }),
    );
    tree.create_node("caption-str", NodeKind::RawText("hi".into()));
    tree.append_child("", "caption");
    tree.append_child("caption", "caption-str");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    // RecordingSurface measures 2 chars * 20px * 3/5 = 24px.
    assert_eq!(
        calls,
        [
            DrawCall::OutlineRect { x: 4, y: 4, w: 32, h: 28, thickness: 2, color: Color::GOLD },
            DrawCall::Text { content: "hi".into(), x: 8, y: 8, font_size: 20, color: Color::GOLD },
        ]
    );
}

#[test]
fn button_draws_fill_then_label_with_defaults() {
    let mut tree = SceneTree::new();
    let mut props = ButtonProps::at(10, 10, 120, 40, "Go");
    props.color = Color::BLUE;
    tree.create_node("btn", NodeKind::Button(props));
    tree.append_child("", "btn");
    tree.swap();

    let calls = draw(&tree, &InputDevices::new());
    assert_eq!(
        calls,
        [
            DrawCall::FillRect { x: 10, y: 10, w: 120, h: 40, color: Color::BLUE },
            DrawCall::Text { content: "Go".into(), x: 18, y: 18, font_size: 20, color: Color::SNOW },
        ]
    );
}

#[test]
fn hovered_and_pressed_buttons_mix_their_fill() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    let mut props = ButtonProps::at(0, 0, 100, 100, "Go");
    props.color = Color::rgba(100, 100, 100, 255);
    tree.create_node("btn", NodeKind::Button(props));
    tree.append_child("", "btn");
    tree.swap();

    let queue = EventQueue::default();
    let mut devices = InputDevices::new();

    devices.poll_pointer(PointerSample { x: 50, y: 50, down: false }, &view, &queue);
    let hovered_fill = draw(&tree, &devices)
        .into_iter()
        .find_map(|call| match call {
            DrawCall::FillRect { color, .. } => Some(color),
            _ => None,
        })
        .expect("button fill");
    assert_eq!(hovered_fill, Color::rgba(100, 100, 100, 255).mix(Color::WHITE, 0.4));

    devices.poll_pointer(PointerSample { x: 50, y: 50, down: true }, &view, &queue);
    let pressed_fill = draw(&tree, &devices)
        .into_iter()
        .find_map(|call| match call {
            DrawCall::FillRect { color, .. } => Some(color),
            _ => None,
        })
        .expect("button fill");
    assert_eq!(pressed_fill, Color::rgba(100, 100, 100, 255).mix(Color::BLACK, 0.5));
}
