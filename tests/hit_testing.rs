use tern_ui::node::{ButtonProps, NodeKind, RectProps, TextProps};
use tern_ui::tree::SceneTree;

fn rect(x: i32, y: i32, w: i32, h: i32) -> NodeKind {
    NodeKind::Rect(RectProps::at(x, y, w, h))
}

fn button(x: i32, y: i32, w: i32, h: i32) -> NodeKind {
    NodeKind::Button(ButtonProps::at(x, y, w, h, "btn"))
}

#[test]
fn later_root_sibling_wins_overlapping_hits() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("under", rect(0, 0, 100, 100));
    tree.create_node("over", rect(50, 50, 100, 100));
    tree.append_child("", "under");
    tree.append_child("", "over");
    tree.swap();

    assert_eq!(view.hit_test(60, 60).as_deref(), Some("over"));
    assert_eq!(view.hit_test(10, 10).as_deref(), Some("under"));
    assert_eq!(view.hit_test(200, 200), None);
}

#[test]
fn child_hit_beats_the_enclosing_parent() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("parent", rect(10, 10, 200, 200));
    tree.create_node("child", rect(20, 20, 50, 50));
    tree.append_child("", "parent");
    tree.append_child("parent", "child");
    tree.swap();

    // Child coordinates are relative to the parent: absolute (30,30)-(80,80).
    assert_eq!(view.hit_test(40, 40).as_deref(), Some("child"));
    assert_eq!(view.hit_test(15, 15).as_deref(), Some("parent"));
    assert_eq!(view.hit_test(5, 5), None);
}

#[test]
fn deeply_nested_offsets_accumulate() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("outer", rect(100, 100, 300, 300));
    tree.create_node("middle", rect(50, 50, 200, 200));
    tree.create_node("inner", button(25, 25, 50, 50));
    tree.append_child("", "outer");
    tree.append_child("outer", "middle");
    tree.append_child("middle", "inner");
    tree.swap();

    // inner spans absolute (175,175)-(225,225).
    assert_eq!(view.hit_test(180, 180).as_deref(), Some("inner"));
    assert_eq!(view.hit_test(174, 174).as_deref(), Some("middle"));
    assert_eq!(view.hit_test(120, 120).as_deref(), Some("outer"));
}

#[test]
fn bounds_are_inclusive_left_exclusive_right() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("r", rect(10, 10, 20, 20));
    tree.append_child("", "r");
    tree.swap();

    assert_eq!(view.hit_test(10, 10).as_deref(), Some("r"));
    assert_eq!(view.hit_test(29, 29).as_deref(), Some("r"));
    assert_eq!(view.hit_test(30, 10), None);
    assert_eq!(view.hit_test(10, 30), None);
}

#[test]
fn text_nodes_are_transparent_to_hits() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("panel", rect(0, 0, 100, 100));
    tree.create_node("caption", NodeKind::Text(TextProps::default()));
    tree.create_node("caption-str", NodeKind::RawText("hello".into()));
    tree.append_child("", "panel");
    tree.append_child("panel", "caption");
    tree.append_child("caption", "caption-str");
    tree.swap();

    assert_eq!(view.hit_test(20, 20).as_deref(), Some("panel"));
}

#[test]
fn buttons_hit_on_their_own_bounds_only() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("panel", rect(0, 0, 400, 400));
    tree.create_node("btn", button(100, 100, 80, 40));
    tree.append_child("", "panel");
    tree.append_child("panel", "btn");
    tree.swap();

    assert_eq!(view.hit_test(120, 120).as_deref(), Some("btn"));
    assert_eq!(view.hit_test(90, 90).as_deref(), Some("panel"));
}

#[test]
fn focusables_carry_absolute_bounds_in_draw_order() {
    let mut tree = SceneTree::new();
    let view = tree.view();
    tree.create_node("panel", rect(100, 50, 400, 400));
    tree.create_node("first", button(10, 10, 80, 40));
    tree.create_node("second", button(10, 100, 80, 40));
    tree.append_child("", "panel");
    tree.append_child("panel", "first");
    tree.append_child("panel", "second");
    tree.swap();

    let focusables = view.focusables();
    assert_eq!(focusables.len(), 2);
    assert_eq!(focusables[0].id, "first");
    assert_eq!((focusables[0].x, focusables[0].y), (110, 60));
    assert_eq!(focusables[1].id, "second");
    assert_eq!((focusables[1].x, focusables[1].y), (110, 150));
}
