use rmdraw_core::{EditorEvent, LoadTicket, Point, Size};
use rmdraw_editor::{DropPayload, NodeKind, Outcome};

use crate::fixtures::{assert_close, frame, record_events, two_shapes};

fn requested_ticket(events: &[EditorEvent]) -> Option<LoadTicket> {
    events.iter().find_map(|e| match e {
        EditorEvent::ImageLoadRequested { ticket, .. } => Some(*ticket),
        _ => None,
    })
}

#[test]
fn test_color_drop_fills_the_shape_under_the_point() {
    let (mut editor, _, a, _) = two_shapes();
    let outcome = editor
        .drop_payload(Point::new(15.0, 15.0), DropPayload::Color("#00ff00".to_string()))
        .unwrap();
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(editor.tree().get(a).unwrap().fill.as_deref(), Some("#00ff00"));
    editor.commit_undo();
    assert_eq!(editor.undoer().undo_title().as_deref(), Some("Undo Fill Color"));
}

#[test]
fn test_text_drop_lands_in_nearest_container() {
    let (mut editor, page, a, _) = two_shapes();
    assert_eq!(
        editor.drop_target(Point::new(15.0, 15.0), &DropPayload::Text("x".into())),
        Some(page)
    );

    editor
        .drop_payload(Point::new(15.0, 15.0), DropPayload::Text("hi".to_string()))
        .unwrap();
    let text = editor.selected()[0];
    let node = editor.tree().get(text).unwrap();
    assert_eq!(node.kind, NodeKind::Text);
    assert_eq!(node.text, "hi");
    assert_eq!(editor.tree().parent(text), Some(page));
    let f = frame(&editor, text);
    assert_close(f.x, 15.0);
    assert_close(f.width, 2.0 * 12.0 * 0.6);
    assert_close(f.height, 12.0 * 1.2);
    assert_eq!(editor.tree().parent(a), Some(page));
}

#[test]
fn test_image_drop_requests_a_load_and_applies_the_result() {
    let (mut editor, _, _, _) = two_shapes();
    let events = record_events(&mut editor);
    editor
        .drop_payload(
            Point::new(200.0, 200.0),
            DropPayload::Image {
                source: "logo.png".to_string(),
            },
        )
        .unwrap();

    let image = editor.selected()[0];
    assert_eq!(editor.tree().get(image).unwrap().image_source.as_deref(), Some("logo.png"));
    let ticket = requested_ticket(&events.borrow()).unwrap();
    assert_eq!(ticket.session, editor.session().id);

    let size = Size::new(640.0, 480.0);
    assert_eq!(editor.complete_image_load(ticket, image, size).unwrap(), Outcome::Done);
    assert_eq!(editor.tree().get(image).unwrap().natural_size, Some(size));
    assert!(events
        .borrow()
        .contains(&EditorEvent::ImageLoaded { node: image, size }));

    assert_eq!(
        editor.complete_image_load(ticket, image, size).unwrap(),
        Outcome::NothingToDo
    );
}

#[test]
fn test_image_load_after_close_is_ignored() {
    let (mut editor, _, _, _) = two_shapes();
    let events = record_events(&mut editor);
    editor
        .drop_payload(
            Point::new(200.0, 200.0),
            DropPayload::Image {
                source: "photo.jpg".to_string(),
            },
        )
        .unwrap();
    let image = editor.selected()[0];
    let ticket = requested_ticket(&events.borrow()).unwrap();

    let old = editor.close_document();
    assert!(old.contains(image));
    let outcome = editor
        .complete_image_load(ticket, image, Size::new(10.0, 10.0))
        .unwrap();
    assert_eq!(outcome, Outcome::NothingToDo);
}

#[test]
fn test_payload_wire_format() {
    let color: DropPayload = serde_json::from_str(r#"{"type":"color","value":"red"}"#).unwrap();
    assert_eq!(color, DropPayload::Color("red".to_string()));

    let image: DropPayload =
        serde_json::from_str(r#"{"type":"image","value":{"source":"a.png"}}"#).unwrap();
    assert_eq!(
        image,
        DropPayload::Image {
            source: "a.png".to_string()
        }
    );
}
