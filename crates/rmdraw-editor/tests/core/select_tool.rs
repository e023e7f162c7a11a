use rmdraw_core::{Point, Rect};
use rmdraw_editor::{Modifiers, NodeKind, PointerEvent, Property, PropertyValue, ShapeNode};

use crate::fixtures::{assert_close, click, drag, frame, no_snap, two_shapes, DocBuilder};

#[test]
fn test_press_promotes_through_immediate_container() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let switch = doc.add(page, NodeKind::Switch, Rect::new(50.0, 50.0, 100.0, 100.0));
    let inner = doc.add(switch, NodeKind::Rectangle, Rect::new(10.0, 10.0, 20.0, 20.0));
    let mut editor = doc.editor();
    let root = editor.tree().root();

    click(&mut editor, 70.0, 70.0);
    assert_eq!(editor.super_selection_path(), &[root, page, switch]);
    assert_eq!(editor.selected(), &[inner]);
}

#[test]
fn test_drag_moves_selection_as_one_undo_step() {
    let (mut editor, _, a, _) = two_shapes();
    drag(&mut editor, PointerEvent::new(20.0, 20.0), &[(30.0, 25.0), (40.0, 40.0)]);

    assert_eq!(frame(&editor, a), Rect::new(30.0, 30.0, 20.0, 20.0));
    assert_eq!(editor.selected(), &[a]);
    assert_eq!(editor.undoer().undo_count(), 1);
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Move"));

    editor.set_selection(&[]).unwrap();
    editor.undo().unwrap();
    assert_eq!(frame(&editor, a), Rect::new(10.0, 10.0, 20.0, 20.0));
    assert_eq!(editor.selected(), &[a]);
}

#[test]
fn test_drag_after_nudge_is_a_separate_undo_step() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.move_selected_by(1.0, 0.0).unwrap();
    drag(&mut editor, PointerEvent::new(20.0, 20.0), &[(40.0, 20.0)]);
    assert_eq!(frame(&editor, a).x, 31.0);
    assert_eq!(editor.undoer().undo_count(), 2);

    editor.undo().unwrap();
    assert_eq!(frame(&editor, a).x, 11.0);
    assert_eq!(editor.undoer().undo_count(), 1);
    editor.undo().unwrap();
    assert_eq!(frame(&editor, a).x, 10.0);
}

#[test]
fn test_locked_nodes_do_not_move() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.set_locked(true).unwrap();
    drag(&mut editor, PointerEvent::new(20.0, 20.0), &[(60.0, 60.0)]);
    assert_eq!(frame(&editor, a), Rect::new(10.0, 10.0, 20.0, 20.0));
}

#[test]
fn test_shift_click_toggles_membership() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let a = doc.add(page, NodeKind::Rectangle, Rect::new(10.0, 10.0, 40.0, 40.0));
    let b = doc.add(page, NodeKind::Rectangle, Rect::new(100.0, 100.0, 40.0, 40.0));
    let mut editor = doc.editor_with(no_snap());
    let shift_click = |editor: &mut rmdraw_editor::Editor, x: f64, y: f64| {
        let event = PointerEvent::new(x, y).with_modifiers(Modifiers::shift());
        editor.mouse_pressed(&event).unwrap();
        editor.mouse_released(&event).unwrap();
    };

    click(&mut editor, 30.0, 30.0);
    assert_eq!(editor.selected(), &[a]);

    shift_click(&mut editor, 120.0, 120.0);
    assert_eq!(editor.selected(), &[a, b]);

    shift_click(&mut editor, 30.0, 30.0);
    assert_eq!(editor.selected(), &[b]);

    shift_click(&mut editor, 120.0, 120.0);
    assert!(editor.selected().is_empty());
    assert_eq!(editor.super_selected(), page);
}

#[test]
fn test_alt_drag_rotates_by_vertical_delta() {
    let (mut editor, _, a, _) = two_shapes();
    drag(
        &mut editor,
        PointerEvent::new(20.0, 20.0).with_modifiers(Modifiers::alt()),
        &[(25.0, 30.0), (20.0, 50.0)],
    );
    assert_close(editor.tree().get(a).unwrap().roll, 30.0);
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Rotate"));
}

#[test]
fn test_double_click_enters_group() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let group = doc.add(page, NodeKind::Group, Rect::new(100.0, 100.0, 100.0, 100.0));
    let inner = doc.add(group, NodeKind::Rectangle, Rect::new(10.0, 10.0, 30.0, 30.0));
    let mut editor = doc.editor_with(no_snap());
    let root = editor.tree().root();

    click(&mut editor, 120.0, 120.0);
    assert_eq!(editor.selected(), &[group]);

    let double = PointerEvent::new(120.0, 120.0).with_clicks(2);
    editor.mouse_pressed(&double).unwrap();
    editor.mouse_released(&double).unwrap();
    assert_eq!(editor.super_selection_path(), &[root, page, group]);
    assert_eq!(editor.selected(), &[inner]);
}

#[test]
fn test_marquee_selects_intersecting_children() {
    let (mut editor, _, a, _) = two_shapes();
    editor.mouse_pressed(&PointerEvent::new(0.0, 0.0)).unwrap();
    editor.mouse_dragged(&PointerEvent::new(50.0, 50.0)).unwrap();
    assert_eq!(editor.pending_marquee(), Some(&[a][..]));
    assert!(editor.selected().is_empty());

    editor.mouse_released(&PointerEvent::new(50.0, 50.0)).unwrap();
    assert_eq!(editor.selected(), &[a]);
    assert_eq!(editor.pending_marquee(), None);
}

#[test]
fn test_shift_marquee_xors_with_selection() {
    let (mut editor, _, a, b) = two_shapes();
    editor.set_selection(&[b]).unwrap();
    drag(
        &mut editor,
        PointerEvent::new(0.0, 0.0).with_modifiers(Modifiers::shift()),
        &[(50.0, 50.0)],
    );
    assert_eq!(editor.selected(), &[b, a]);
}

#[test]
fn test_click_on_empty_page_clears_selection() {
    let (mut editor, page, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    click(&mut editor, 300.0, 300.0);
    assert!(editor.selected().is_empty());
    assert_eq!(editor.super_selected(), page);
}

#[test]
fn test_resize_past_opposite_handle_floors_extent() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    drag(&mut editor, PointerEvent::new(30.0, 30.0), &[(20.0, 30.0), (9.95, 30.0)]);

    let f = frame(&editor, a);
    assert_close(f.width, -0.1);
    assert_close(f.height, 20.0);
    assert_close(f.x, 10.0);
    assert_close(f.y, 10.0);
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Resize"));
}

#[test]
fn test_resize_handle_on_super_selected_owner_selects_it() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let group = doc.add(page, NodeKind::Group, Rect::new(100.0, 100.0, 100.0, 100.0));
    doc.add(group, NodeKind::Rectangle, Rect::new(10.0, 10.0, 30.0, 30.0));
    let mut editor = doc.editor_with(no_snap());
    editor.set_super_selection(Some(group)).unwrap();

    drag(&mut editor, PointerEvent::new(200.0, 200.0), &[(220.0, 210.0)]);
    assert_eq!(editor.selected(), &[group]);
    let f = frame(&editor, group);
    assert_close(f.width, 120.0);
    assert_close(f.height, 110.0);
}

#[test]
fn test_click_in_super_selected_text_places_caret() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let mut node = ShapeNode::new(NodeKind::Text).with_frame(Rect::new(10.0, 10.0, 60.0, 12.0));
    node.text = "hello".to_string();
    node.font_size = 10.0;
    let text = doc.add_node(page, node);
    let mut editor = doc.editor_with(no_snap());
    editor.set_super_selection(Some(text)).unwrap();

    click(&mut editor, 23.0, 15.0);
    assert_eq!(
        editor.tree().value(text, Property::TextCaret).unwrap(),
        PropertyValue::Index(2)
    );
    assert_eq!(editor.super_selected(), text);
    assert!(!editor.can_undo());
}

#[test]
fn test_move_converts_delta_into_rotated_container() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let mut group = ShapeNode::new(NodeKind::Group).with_frame(Rect::new(100.0, 100.0, 100.0, 100.0));
    group.roll = 90.0;
    let group = doc.add_node(page, group);
    let inner = doc.add(group, NodeKind::Rectangle, Rect::new(40.0, 40.0, 20.0, 20.0));
    let mut editor = doc.editor_with(no_snap());
    editor.set_selection(&[inner]).unwrap();

    let center = editor.tree().point_to_root(inner, Point::new(10.0, 10.0));
    drag(
        &mut editor,
        PointerEvent::new(center.x, center.y),
        &[(center.x + 10.0, center.y)],
    );
    let moved = editor.tree().point_to_root(inner, Point::new(10.0, 10.0));
    assert_close(moved.x, center.x + 10.0);
    assert_close(moved.y, center.y);
}
