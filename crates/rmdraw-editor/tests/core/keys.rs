use rmdraw_core::{NodeId, Rect};
use rmdraw_editor::{Editor, Key, KeyEvent, Modifiers, NodeKind, Outcome, ShapeNode};

use crate::fixtures::{frame, two_shapes, DocBuilder};

fn press(editor: &mut Editor, key: Key) -> Outcome {
    editor.handle_key(&KeyEvent::new(key)).unwrap()
}

fn shortcut(editor: &mut Editor, c: char, shift: bool) -> Outcome {
    let modifiers = Modifiers {
        control: true,
        shift,
        ..Modifiers::NONE
    };
    editor
        .handle_key(&KeyEvent::new(Key::Char(c)).with_modifiers(modifiers))
        .unwrap()
}

fn text_doc(text: &str) -> (Editor, NodeId) {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let mut node = ShapeNode::new(NodeKind::Text).with_frame(Rect::new(10.0, 10.0, 60.0, 14.0));
    node.text = text.to_string();
    node.font_size = 10.0;
    let id = doc.add_node(page, node);
    let mut editor = doc.editor();
    editor.set_super_selection(Some(id)).unwrap();
    (editor, id)
}

#[test]
fn test_each_nudge_is_its_own_undo_step() {
    let (mut editor, _, a, _) = two_shapes();
    editor.set_selection(&[a]).unwrap();

    press(&mut editor, Key::Right);
    press(&mut editor, Key::Right);
    editor
        .handle_key(&KeyEvent::new(Key::Down).with_modifiers(Modifiers::shift()))
        .unwrap();
    assert_eq!(frame(&editor, a), Rect::new(12.0, 20.0, 20.0, 20.0));
    assert_eq!(editor.undoer().undo_count(), 3);
    assert!(!editor.undoer().has_changes());

    shortcut(&mut editor, 'z', false);
    assert_eq!(frame(&editor, a), Rect::new(12.0, 10.0, 20.0, 20.0));
    shortcut(&mut editor, 'z', false);
    assert_eq!(frame(&editor, a), Rect::new(11.0, 10.0, 20.0, 20.0));
    shortcut(&mut editor, 'z', true);
    assert_eq!(frame(&editor, a), Rect::new(12.0, 10.0, 20.0, 20.0));
}

#[test]
fn test_repeated_delete_key_undoes_one_node_at_a_time() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    press(&mut editor, Key::Delete);
    editor.set_selection(&[b]).unwrap();
    press(&mut editor, Key::Delete);
    assert!(editor.tree().children(page).is_empty());
    assert_eq!(editor.undoer().undo_count(), 2);

    shortcut(&mut editor, 'z', false);
    assert_eq!(editor.tree().children(page), &[b]);
    assert_eq!(editor.selected(), &[b]);
    assert_eq!(editor.undoer().undo_count(), 1);
    assert_eq!(editor.undoer().redo_title().as_deref(), Some("Redo Delete"));

    shortcut(&mut editor, 'z', false);
    assert_eq!(editor.tree().children(page), &[a, b]);
    assert_eq!(editor.selected(), &[a]);
}

#[test]
fn test_nudge_without_selection_does_nothing() {
    let (mut editor, _, _, _) = two_shapes();
    assert_eq!(press(&mut editor, Key::Left), Outcome::NothingToDo);
}

#[test]
fn test_delete_and_escape() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a]).unwrap();
    assert_eq!(press(&mut editor, Key::Delete), Outcome::Done);
    assert_eq!(editor.tree().children(page), &[b]);

    editor.set_selection(&[b]).unwrap();
    assert_eq!(press(&mut editor, Key::Escape), Outcome::Done);
    assert!(editor.selected().is_empty());
}

#[test]
fn test_group_shortcuts() {
    let (mut editor, page, a, b) = two_shapes();
    editor.set_selection(&[a, b]).unwrap();
    assert_eq!(shortcut(&mut editor, 'g', false), Outcome::Done);
    assert_eq!(editor.tree().children(page).len(), 1);

    assert_eq!(shortcut(&mut editor, 'g', true), Outcome::Done);
    assert_eq!(editor.tree().children(page), &[a, b]);
}

#[test]
fn test_select_all_and_duplicate_shortcuts() {
    let (mut editor, page, _, _) = two_shapes();
    shortcut(&mut editor, 'a', false);
    assert_eq!(editor.selected().len(), 2);
    shortcut(&mut editor, 'd', false);
    assert_eq!(editor.tree().children(page).len(), 4);
    assert_eq!(shortcut(&mut editor, 'q', false), Outcome::NothingToDo);
}

#[test]
fn test_typing_goes_to_super_selected_text() {
    let (mut editor, text) = text_doc("ab");
    press(&mut editor, Key::Char('c'));
    press(&mut editor, Key::Left);
    press(&mut editor, Key::Left);
    press(&mut editor, Key::Char('X'));

    let node = editor.tree().get(text).unwrap();
    assert_eq!(node.text, "aXbc");
    assert_eq!(node.caret, 2);

    press(&mut editor, Key::Backspace);
    press(&mut editor, Key::Delete);
    assert_eq!(editor.tree().get(text).unwrap().text, "ac");

    assert_eq!(editor.undoer().undo_count(), 4);
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Typing"));
    editor.undo().unwrap();
    assert_eq!(editor.tree().get(text).unwrap().text, "abc");
    for _ in 0..3 {
        editor.undo().unwrap();
    }
    assert_eq!(editor.tree().get(text).unwrap().text, "ab");
}

#[test]
fn test_typing_grows_text_width() {
    let (mut editor, text) = text_doc("");
    for c in "hello world!".chars() {
        press(&mut editor, Key::Char(c));
    }
    assert!(editor.tree().get(text).unwrap().width >= 12.0 * 10.0 * 0.6);
}

#[test]
fn test_shortcuts_bypass_text_editing() {
    let (mut editor, text) = text_doc("ab");
    press(&mut editor, Key::Char('c'));
    assert_eq!(shortcut(&mut editor, 'z', false), Outcome::Done);
    assert_eq!(editor.tree().get(text).unwrap().text, "ab");
}
