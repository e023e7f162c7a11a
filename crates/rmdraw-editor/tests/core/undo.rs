use std::cell::RefCell;
use std::rc::Rc;

use rmdraw_core::{EditorEvent, EventCategory, EventFilter, Rect};
use rmdraw_editor::{NodeKind, Outcome, Property, ShapeNode};
use rmdraw_settings::Config;

use crate::fixtures::{frame, no_snap, two_shapes, DocBuilder};

#[test]
fn test_undo_then_redo_restores_both_states() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.move_selected_by(5.0, 7.0).unwrap();
    assert_eq!(frame(&editor, a), Rect::new(15.0, 17.0, 20.0, 20.0));

    assert_eq!(editor.undo().unwrap(), Outcome::Done);
    assert_eq!(frame(&editor, a), Rect::new(10.0, 10.0, 20.0, 20.0));
    assert!(editor.can_redo());
    assert_eq!(editor.undoer().redo_title().as_deref(), Some("Redo Move"));

    assert_eq!(editor.redo().unwrap(), Outcome::Done);
    assert_eq!(frame(&editor, a), Rect::new(15.0, 17.0, 20.0, 20.0));
    assert!(!editor.can_redo());
}

#[test]
fn test_undo_with_empty_history_does_nothing() {
    let (mut editor, _, _, _) = two_shapes();
    assert!(!editor.can_undo());
    assert_eq!(editor.undo().unwrap(), Outcome::NothingToDo);
    assert_eq!(editor.redo().unwrap(), Outcome::NothingToDo);
}

#[test]
fn test_new_edit_clears_redo() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.move_selected_by(5.0, 0.0).unwrap();
    editor.undo().unwrap();
    assert!(editor.can_redo());

    editor.set_fill(Some("red".to_string())).unwrap();
    editor.commit_undo();
    assert!(!editor.can_redo());
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Fill Color"));
}

#[test]
fn test_differently_titled_edits_are_separate_steps() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.move_selected_by(1.0, 0.0).unwrap();
    editor.set_fill(Some("blue".to_string())).unwrap();
    editor.commit_undo();
    assert_eq!(editor.undoer().undo_count(), 2);

    editor.undo().unwrap();
    assert_eq!(editor.tree().get(a).unwrap().fill, None);
    assert_eq!(frame(&editor, a).x, 11.0);
}

#[test]
fn test_direct_edits_stay_open_until_idle() {
    let (mut editor, _, a, _) = two_shapes();
    editor.begin_edit("Move");
    editor.tree_mut().set_number(a, Property::X, 12.0).unwrap();
    editor.begin_edit("Move");
    editor.tree_mut().set_number(a, Property::X, 14.0).unwrap();
    editor.process_changes();
    assert!(editor.undoer().has_changes());

    assert_eq!(editor.run_pending(), Outcome::Done);
    assert_eq!(editor.undoer().undo_count(), 1);
    editor.undo().unwrap();
    assert_eq!(frame(&editor, a).x, 10.0);
}

#[test]
fn test_undo_delete_restores_node_and_selection() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    editor.delete_selected().unwrap();
    assert_eq!(editor.tree().children(page), &[b]);
    assert!(editor.selected().is_empty());

    editor.undo().unwrap();
    assert_eq!(editor.tree().children(page), &[a, b]);
    assert_eq!(editor.selected(), &[a]);

    editor.redo().unwrap();
    assert_eq!(editor.tree().children(page), &[b]);
    assert!(editor.selected().is_empty());
    assert_eq!(editor.super_selected(), page);
}

#[test]
fn test_history_depth_is_bounded_by_config() {
    let mut config = no_snap();
    config.history.max_undo_depth = 2;
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let a = doc.add(page, NodeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
    let mut editor = doc.editor_with(config);
    editor.set_selection(&[a]).unwrap();

    for _ in 0..3 {
        editor.move_selected_by(1.0, 0.0).unwrap();
        assert_eq!(editor.run_pending(), Outcome::NothingToDo);
    }
    assert_eq!(editor.undoer().undo_count(), 2);
    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(frame(&editor, a).x, 1.0);
    assert_eq!(editor.undo().unwrap(), Outcome::NothingToDo);
}

#[test]
fn test_transaction_events_are_published() {
    let (mut editor, _, a, _) = two_shapes();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    editor.subscribe(EventFilter::Categories(vec![EventCategory::Undo]), move |e| {
        sink.borrow_mut().push(e.clone())
    });

    editor.set_selection(&[a]).unwrap();
    editor.move_selected_by(2.0, 0.0).unwrap();
    editor.move_selected_by(2.0, 0.0).unwrap();

    let opened = EditorEvent::UndoTransactionOpened {
        title: "Move".to_string(),
    };
    let committed = EditorEvent::UndoTransactionCommitted {
        title: "Move".to_string(),
        changes: 1,
    };
    assert_eq!(
        *events.borrow(),
        vec![opened.clone(), committed.clone(), opened, committed]
    );
}

#[test]
fn test_caret_changes_never_become_undo_steps() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let mut node = ShapeNode::new(NodeKind::Text).with_frame(Rect::new(0.0, 0.0, 50.0, 14.0));
    node.text = "abc".to_string();
    let text = doc.add_node(page, node);
    let mut editor = doc.editor_with(Config::default());

    editor.set_super_selection(Some(text)).unwrap();
    editor.process_changes();
    assert!(!editor.can_undo());
    assert_eq!(editor.run_pending(), Outcome::NothingToDo);
}
