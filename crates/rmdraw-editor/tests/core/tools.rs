use rmdraw_core::{Point, Rect};
use rmdraw_editor::{NodeKind, PointerEvent, ToolKind};

use crate::fixtures::{assert_close, click, drag, frame, DocBuilder};

#[test]
fn test_click_creates_minimum_sized_shape() {
    let doc = DocBuilder::new();
    let page = doc.page;
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Oval);

    click(&mut editor, 50.0, 60.0);
    let id = editor.selected()[0];
    assert_eq!(editor.tree().kind(id), Some(NodeKind::Oval));
    assert_eq!(editor.tree().parent(id), Some(page));
    assert_eq!(frame(&editor, id), Rect::new(50.0, 60.0, 20.0, 20.0));
    assert_eq!(editor.current_tool(), ToolKind::Select);
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo New Oval"));
}

#[test]
fn test_drag_spans_the_frame_in_any_direction() {
    let doc = DocBuilder::new();
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Rectangle);

    drag(&mut editor, PointerEvent::new(50.0, 60.0), &[(35.0, 70.0), (20.0, 90.0)]);
    let id = editor.selected()[0];
    assert_eq!(frame(&editor, id), Rect::new(20.0, 60.0, 30.0, 30.0));
    assert_eq!(editor.undoer().undo_count(), 1);

    editor.undo().unwrap();
    assert!(!editor.tree().is_attached(id));
}

#[test]
fn test_line_keeps_signed_extents() {
    let doc = DocBuilder::new();
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Line);

    drag(&mut editor, PointerEvent::new(100.0, 100.0), &[(60.0, 130.0)]);
    let f = frame(&editor, editor.selected()[0]);
    assert_close(f.x, 100.0);
    assert_close(f.y, 100.0);
    assert_close(f.width, -40.0);
    assert_close(f.height, 30.0);
}

#[test]
fn test_new_shape_goes_into_super_selected_group() {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let group = doc.add(page, NodeKind::Group, Rect::new(100.0, 100.0, 100.0, 100.0));
    doc.add(group, NodeKind::Oval, Rect::new(0.0, 0.0, 10.0, 10.0));
    let mut editor = doc.editor();
    editor.set_super_selection(Some(group)).unwrap();
    editor.set_tool(ToolKind::Rectangle);

    drag(&mut editor, PointerEvent::new(110.0, 110.0), &[(130.0, 140.0)]);
    let id = editor.selected()[0];
    assert_eq!(editor.tree().parent(id), Some(group));
    assert_eq!(frame(&editor, id), Rect::new(10.0, 10.0, 20.0, 30.0));
}

#[test]
fn test_text_tool_super_selects_the_new_node() {
    let doc = DocBuilder::new();
    let page = doc.page;
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Text);

    click(&mut editor, 40.0, 40.0);
    let text = editor.super_selected();
    assert_eq!(editor.tree().kind(text), Some(NodeKind::Text));
    assert!(editor.selected().is_empty());
    assert_eq!(editor.current_tool(), ToolKind::Select);

    // clicking away from the still-empty text node removes it
    click(&mut editor, 300.0, 300.0);
    assert_eq!(editor.super_selected(), page);
    assert!(!editor.tree().is_attached(text));
}

#[test]
fn test_switching_tools_cancels_a_polygon() {
    let doc = DocBuilder::new();
    let page = doc.page;
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Polygon);
    click(&mut editor, 10.0, 10.0);
    click(&mut editor, 50.0, 10.0);

    editor.set_tool(ToolKind::Select);
    assert!(editor.tree().children(page).is_empty());
}

#[test]
fn test_polygon_closes_on_first_vertex() {
    let doc = DocBuilder::new();
    let page = doc.page;
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Polygon);

    click(&mut editor, 10.0, 10.0);
    click(&mut editor, 50.0, 10.0);
    click(&mut editor, 50.0, 50.0);
    assert!(editor.tree().children(page).is_empty());
    click(&mut editor, 12.0, 11.0);

    let id = editor.selected()[0];
    let node = editor.tree().get(id).unwrap();
    assert_eq!(node.kind, NodeKind::Polygon);
    assert_eq!(
        node.points,
        vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)]
    );
    assert_eq!(frame(&editor, id), Rect::new(10.0, 10.0, 40.0, 40.0));
    assert_eq!(editor.current_tool(), ToolKind::Select);
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo New Polygon"));
}

#[test]
fn test_polygon_double_click_finishes() {
    let doc = DocBuilder::new();
    let mut editor = doc.editor();
    editor.set_tool(ToolKind::Polygon);

    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 100.0, 0.0);
    click(&mut editor, 50.0, 80.0);
    let double = PointerEvent::new(50.0, 80.0).with_clicks(2);
    editor.mouse_pressed(&double).unwrap();
    editor.mouse_released(&double).unwrap();

    let id = editor.selected()[0];
    assert_eq!(editor.tree().get(id).unwrap().points.len(), 3);
    assert_eq!(frame(&editor, id), Rect::new(0.0, 0.0, 100.0, 80.0));
}
