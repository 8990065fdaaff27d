use tern_ui::color::Color;
use tern_ui::node::{NodeKind, RectProps, TextProps};
use tern_ui::tree::SceneTree;

fn rect(x: i32, y: i32, w: i32, h: i32) -> NodeKind {
    NodeKind::Rect(RectProps::at(x, y, w, h))
}

#[test]
fn create_with_taken_id_is_a_silent_no_op() {
    let mut tree = SceneTree::new();
    tree.create_node("a", rect(0, 0, 10, 10));
    tree.create_node("a", rect(99, 99, 1, 1));

    match &tree.node("a").expect("node a").kind {
        NodeKind::Rect(props) => assert_eq!((props.x, props.w), (0, 10), "first create wins"),
        other => panic!("unexpected kind {}", other.name()),
    }
}

#[test]
fn structural_ops_with_unknown_ids_are_no_ops() {
    let mut tree = SceneTree::new();
    tree.create_node("a", rect(0, 0, 10, 10));
    tree.append_child("", "a");

    tree.append_child("missing", "a");
    tree.append_child("", "missing");
    tree.remove_child("", "missing");
    tree.remove_child("missing", "a");
    tree.insert_before("", "missing", "a");
    tree.destroy_node("missing");

    assert_eq!(tree.root_ids(), ["a"]);
    assert!(tree.node("a").is_some());
    // Repeated removal and destruction stay harmless.
    tree.remove_child("", "a");
    tree.remove_child("", "a");
    tree.destroy_node("a");
    tree.destroy_node("a");
    assert_eq!(tree.node_count(), 0);
}

#[test]
fn insert_before_orders_siblings_and_appends_on_unknown_anchor() {
    let mut tree = SceneTree::new();
    for id in ["a", "b", "c"] {
        tree.create_node(id, rect(0, 0, 1, 1));
    }
    tree.append_child("", "a");
    tree.append_child("", "c");
    tree.insert_before("", "b", "c");
    assert_eq!(tree.root_ids(), ["a", "b", "c"]);

    tree.create_node("d", rect(0, 0, 1, 1));
    tree.insert_before("", "d", "nonexistent");
    assert_eq!(tree.root_ids(), ["a", "b", "c", "d"], "unknown anchor appends at the end");
}

#[test]
fn appending_an_attached_child_moves_it() {
    let mut tree = SceneTree::new();
    tree.create_node("p1", rect(0, 0, 100, 100));
    tree.create_node("p2", rect(100, 0, 100, 100));
    tree.create_node("child", rect(0, 0, 10, 10));
    tree.append_child("", "p1");
    tree.append_child("", "p2");
    tree.append_child("p1", "child");
    assert_eq!(tree.node("child").expect("child").parent.as_deref(), Some("p1"));

    tree.append_child("p2", "child");
    assert!(tree.node("p1").expect("p1").children.is_empty(), "child left its old parent");
    assert_eq!(tree.node("p2").expect("p2").children.as_slice(), ["child"]);
    assert_eq!(tree.node("child").expect("child").parent.as_deref(), Some("p2"));

    // Moving to the root list clears the parent link.
    tree.append_child("", "child");
    assert!(tree.node("p2").expect("p2").children.is_empty());
    assert_eq!(tree.node("child").expect("child").parent, None);
    assert_eq!(tree.root_ids(), ["p1", "p2", "child"]);
}

#[test]
fn remove_child_detaches_but_keeps_the_node() {
    let mut tree = SceneTree::new();
    tree.create_node("parent", rect(0, 0, 100, 100));
    tree.create_node("child", rect(0, 0, 10, 10));
    tree.append_child("", "parent");
    tree.append_child("parent", "child");

    tree.remove_child("parent", "child");
    assert!(tree.node("parent").expect("parent").children.is_empty());
    assert_eq!(tree.node("child").expect("child").parent, None);
    assert!(tree.node("child").is_some(), "removal does not destroy");
}

#[test]
fn prop_setters_are_kind_checked() {
    let mut tree = SceneTree::new();
    tree.create_node("r", rect(0, 0, 10, 10));
    tree.create_node("t", NodeKind::Text(TextProps::default()));

    assert!(tree.set_rect_fill("r", Some(Color::RED)));
    assert!(!tree.set_rect_fill("t", Some(Color::RED)), "text is not a rect");
    assert!(!tree.set_button_label("r", "nope"));
    assert!(!tree.set_raw_text("r", "nope"));
    assert!(tree.set_text_style("t", 18, Some(Color::BLACK), true));

    match &tree.node("t").expect("text node").kind {
        NodeKind::Text(props) => {
            assert_eq!(props.font_size, 18);
            assert!(props.border);
        }
        other => panic!("unexpected kind {}", other.name()),
    }
}

#[test]
fn clear_root_empties_the_list_but_not_the_registry() {
    let mut tree = SceneTree::new();
    tree.create_node("a", rect(0, 0, 1, 1));
    tree.create_node("b", rect(0, 0, 1, 1));
    tree.append_child("", "a");
    tree.append_child("", "b");

    tree.clear_root();
    assert!(tree.root_ids().is_empty());
    assert_eq!(tree.node_count(), 2, "nodes stay registered until destroyed");
}
