use rmdraw_core::Rect;
use rmdraw_editor::{NodeKind, Outcome, ShapeNode};

use crate::fixtures::{assert_close, frame, two_shapes, DocBuilder};

#[test]
fn test_delete_with_nothing_selected_is_noop() {
    let (mut editor, _, _, _) = two_shapes();
    assert_eq!(editor.delete_selected().unwrap(), Outcome::NothingToDo);
    assert!(!editor.can_undo());
}

#[test]
fn test_group_keeps_rendered_positions() {
    let (mut editor, page, a, b) = two_shapes();
    let before_a = editor.tree().bounds_in_root(a);
    let before_b = editor.tree().bounds_in_root(b);
    editor.set_selection(&[b, a]).unwrap();

    assert_eq!(editor.group_selected().unwrap(), Outcome::Done);
    let group = editor.selected()[0];
    assert_eq!(editor.tree().kind(group), Some(NodeKind::Group));
    assert_eq!(editor.tree().children(page), &[group]);
    assert_eq!(editor.tree().children(group), &[a, b]);
    assert_eq!(frame(&editor, group), Rect::new(10.0, 10.0, 100.0, 100.0));
    assert_eq!(editor.tree().bounds_in_root(a), before_a);
    assert_eq!(editor.tree().bounds_in_root(b), before_b);

    editor.undo().unwrap();
    assert_eq!(editor.tree().children(page), &[a, b]);
    assert_eq!(frame(&editor, a), Rect::new(10.0, 10.0, 20.0, 20.0));
    assert!(!editor.tree().is_attached(group));
}

#[test]
fn test_ungroup_releases_children_in_place() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a, b]).unwrap();
    editor.group_selected().unwrap();

    assert_eq!(editor.ungroup_selected().unwrap(), Outcome::Done);
    assert_eq!(editor.tree().children(page), &[a, b]);
    assert_eq!(editor.selected(), &[a, b]);
    assert_eq!(frame(&editor, a), Rect::new(10.0, 10.0, 20.0, 20.0));
    assert_eq!(frame(&editor, b), Rect::new(100.0, 100.0, 10.0, 10.0));
}

#[test]
fn test_ungroup_of_rotated_group_carries_rotation() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let mut node = ShapeNode::new(NodeKind::Group).with_frame(Rect::new(100.0, 100.0, 100.0, 100.0));
    node.roll = 90.0;
    let group = doc.add_node(page, node);
    let inner = doc.add(group, NodeKind::Rectangle, Rect::new(0.0, 0.0, 20.0, 20.0));
    let mut editor = doc.editor();
    let before = editor.tree().bounds_in_root(inner);

    editor.set_selection(&[group]).unwrap();
    editor.ungroup_selected().unwrap();
    assert_eq!(editor.tree().parent(inner), Some(page));
    assert_close(editor.tree().get(inner).unwrap().roll, 90.0);
    let after = editor.tree().bounds_in_root(inner);
    assert_close(after.x, before.x);
    assert_close(after.y, before.y);
}

#[test]
fn test_ungroup_without_groups_is_noop() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    assert_eq!(editor.ungroup_selected().unwrap(), Outcome::NothingToDo);
}

#[test]
fn test_z_order_commands() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();

    assert_eq!(editor.bring_to_front().unwrap(), Outcome::Done);
    assert_eq!(editor.tree().children(page), &[b, a]);
    assert_eq!(editor.bring_to_front().unwrap(), Outcome::NothingToDo);

    assert_eq!(editor.send_to_back().unwrap(), Outcome::Done);
    assert_eq!(editor.tree().children(page), &[a, b]);
    assert_eq!(editor.send_to_back().unwrap(), Outcome::NothingToDo);
    assert_eq!(editor.selected(), &[a]);
}

#[test]
fn test_fill_and_lock_report_no_change() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();

    assert_eq!(editor.set_fill(Some("#ff0000".to_string())).unwrap(), Outcome::Done);
    assert_eq!(editor.tree().get(a).unwrap().fill.as_deref(), Some("#ff0000"));
    assert_eq!(
        editor.set_fill(Some("#ff0000".to_string())).unwrap(),
        Outcome::NothingToDo
    );

    assert_eq!(editor.set_locked(true).unwrap(), Outcome::Done);
    assert!(editor.tree().get(a).unwrap().locked);
    assert_eq!(editor.set_locked(true).unwrap(), Outcome::NothingToDo);
    editor.commit_undo();
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Lock"));
}

#[test]
fn test_add_page_matches_first_page_and_activates() {
    let (mut editor, first, _, _) = two_shapes();
    let page = editor.add_page().unwrap();

    assert_eq!(editor.tree().pages(), &[first, page]);
    assert_eq!(editor.tree().active_page(), page);
    assert_eq!(frame(&editor, page).width, frame(&editor, first).width);
    assert_eq!(frame(&editor, page).height, frame(&editor, first).height);
    assert_eq!(editor.super_selected(), page);

    editor.undo().unwrap();
    assert_eq!(editor.tree().pages(), &[first]);
    assert_eq!(editor.tree().active_page(), first);
}
