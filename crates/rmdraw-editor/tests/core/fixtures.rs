//! Shared document builders for the editor integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use rmdraw_core::{EditorEvent, EventFilter, NodeId, Rect, Size};
use rmdraw_editor::{Editor, NodeKind, PointerEvent, ShapeNode, ShapeTree};
use rmdraw_settings::Config;

pub const PAGE: Size = Size::new(400.0, 400.0);

/// Builds a document without recording undo changes.
pub struct DocBuilder {
    pub tree: ShapeTree,
    pub page: NodeId,
}

impl DocBuilder {
    pub fn new() -> Self {
        let tree = ShapeTree::new_document(PAGE);
        let page = tree.active_page();
        Self { tree, page }
    }

    pub fn add(&mut self, parent: NodeId, kind: NodeKind, frame: Rect) -> NodeId {
        let id = self.tree.create(kind, frame);
        self.tree.add_child(parent, id).unwrap();
        id
    }

    pub fn add_node(&mut self, parent: NodeId, node: ShapeNode) -> NodeId {
        let id = self.tree.create_node(node);
        self.tree.add_child(parent, id).unwrap();
        id
    }

    pub fn editor(self) -> Editor {
        self.editor_with(Config::default())
    }

    pub fn editor_with(mut self, config: Config) -> Editor {
        let _ = self.tree.take_changes();
        let _ = self.tree.take_dirty();
        Editor::with_document(config, self.tree)
    }
}

/// Config with proximity guides off, so drags move by exact deltas.
pub fn no_snap() -> Config {
    let mut config = Config::default();
    config.snapping.proximity_guides_enabled = false;
    config
}

/// Page with A at (10,10,20,20) and B at (100,100,10,10).
pub fn two_shapes() -> (Editor, NodeId, NodeId, NodeId) {
    let mut doc = DocBuilder::new();
    let page = doc.page;
    let a = doc.add(page, NodeKind::Rectangle, Rect::new(10.0, 10.0, 20.0, 20.0));
    let b = doc.add(page, NodeKind::Rectangle, Rect::new(100.0, 100.0, 10.0, 10.0));
    (doc.editor_with(no_snap()), page, a, b)
}

/// Press, drag through `points`, release at the last one.
pub fn drag(editor: &mut Editor, from: PointerEvent, points: &[(f64, f64)]) {
    let modifiers = from.modifiers;
    editor.mouse_pressed(&from).unwrap();
    let mut last = from;
    for (x, y) in points {
        last = PointerEvent::new(*x, *y).with_modifiers(modifiers);
        editor.mouse_dragged(&last).unwrap();
    }
    editor.mouse_released(&last).unwrap();
}

pub fn click(editor: &mut Editor, x: f64, y: f64) {
    let event = PointerEvent::new(x, y);
    editor.mouse_pressed(&event).unwrap();
    editor.mouse_released(&event).unwrap();
}

pub fn frame(editor: &Editor, id: NodeId) -> Rect {
    let n = editor.tree().get(id).unwrap();
    Rect {
        x: n.x,
        y: n.y,
        width: n.width,
        height: n.height,
    }
}

/// Records every event the editor publishes.
pub fn record_events(editor: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    editor.subscribe(EventFilter::All, move |e| sink.borrow_mut().push(e.clone()));
    events
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
