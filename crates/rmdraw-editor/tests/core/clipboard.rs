use rmdraw_core::Rect;
use rmdraw_editor::{NodeKind, Outcome};

use crate::fixtures::{frame, two_shapes, DocBuilder};

#[test]
fn test_repeated_paste_steps_the_offset() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    assert_eq!(editor.copy().unwrap(), Outcome::Done);
    assert!(editor.has_clipboard());
    assert!(!editor.can_undo());

    editor.paste().unwrap();
    let first = editor.selected()[0];
    assert_eq!(frame(&editor, first), Rect::new(20.0, 20.0, 20.0, 20.0));

    editor.paste().unwrap();
    let second = editor.selected()[0];
    assert_eq!(frame(&editor, second), Rect::new(30.0, 30.0, 20.0, 20.0));

    assert_eq!(editor.tree().children(page), &[a, b, first, second]);
    assert_eq!(frame(&editor, a), Rect::new(10.0, 10.0, 20.0, 20.0));
}

#[test]
fn test_copy_resets_the_offset() {
    let (mut editor, _, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.copy().unwrap();
    editor.paste().unwrap();

    editor.set_selection(&[b]).unwrap();
    editor.copy().unwrap();
    editor.paste().unwrap();
    let pasted = editor.selected()[0];
    assert_eq!(frame(&editor, pasted), Rect::new(110.0, 110.0, 10.0, 10.0));
}

#[test]
fn test_cut_removes_and_paste_restores_a_copy() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    assert_eq!(editor.cut().unwrap(), Outcome::Done);
    assert_eq!(editor.tree().children(page), &[b]);
    assert!(editor.selected().is_empty());

    editor.paste().unwrap();
    let pasted = editor.selected()[0];
    assert_ne!(pasted, a);
    assert_eq!(editor.tree().kind(pasted), Some(NodeKind::Rectangle));
    assert_eq!(editor.tree().parent(pasted), Some(page));

    editor.commit_undo();
    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(editor.tree().children(page), &[a, b]);
}

#[test]
fn test_paste_goes_into_super_selected_container() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let a = doc.add(page, NodeKind::Rectangle, Rect::new(10.0, 10.0, 20.0, 20.0));
    let group = doc.add(page, NodeKind::Group, Rect::new(100.0, 100.0, 100.0, 100.0));
    doc.add(group, NodeKind::Oval, Rect::new(0.0, 0.0, 10.0, 10.0));
    let mut editor = doc.editor();

    editor.set_selection(&[a]).unwrap();
    editor.copy().unwrap();
    editor.set_super_selection(Some(group)).unwrap();
    editor.paste().unwrap();

    let pasted = editor.selected()[0];
    assert_eq!(editor.tree().parent(pasted), Some(group));
    assert_eq!(editor.super_selected(), group);
}

#[test]
fn test_copied_subtree_is_deep() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let group = doc.add(page, NodeKind::Group, Rect::new(0.0, 0.0, 50.0, 50.0));
    let inner = doc.add(group, NodeKind::Oval, Rect::new(0.0, 0.0, 10.0, 10.0));
    let mut editor = doc.editor();

    editor.set_selection(&[group]).unwrap();
    editor.duplicate().unwrap();
    let copy = editor.selected()[0];
    assert_ne!(copy, group);
    let copy_children = editor.tree().children(copy).to_vec();
    assert_eq!(copy_children.len(), 1);
    assert_ne!(copy_children[0], inner);
    assert_eq!(frame(&editor, copy), Rect::new(10.0, 10.0, 50.0, 50.0));
    assert_eq!(editor.tree().children(group), &[inner]);
}

#[test]
fn test_empty_clipboard_and_selection_are_noops() {
    let (mut editor, _, _, _) = two_shapes();
    assert_eq!(editor.copy().unwrap(), Outcome::NothingToDo);
    assert_eq!(editor.cut().unwrap(), Outcome::NothingToDo);
    assert_eq!(editor.paste().unwrap(), Outcome::NothingToDo);
    assert_eq!(editor.duplicate().unwrap(), Outcome::NothingToDo);
    assert!(!editor.can_undo());
}
