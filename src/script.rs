//! Gesture scripts.
//!
//! A script describes a starting document and a list of input steps. The
//! runner feeds the steps to an [`Editor`] the way a host toolkit would,
//! answers image load requests, and reports the resulting document.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "a", "kind": "Rectangle", "frame": { "x": 10, "y": 10, "width": 20, "height": 20 } }
//!   ],
//!   "steps": [
//!     { "action": "press", "point": { "x": 20, "y": 20 } },
//!     { "action": "drag", "point": { "x": 40, "y": 30 } },
//!     { "action": "release", "point": { "x": 40, "y": 30 } },
//!     { "action": "command", "command": "undo" }
//!   ]
//! }
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{anyhow, bail, Context};
use rmdraw_core::{EditorEvent, EventCategory, EventFilter, LoadTicket, NodeId, Point, Rect, Size};
use rmdraw_editor::{
    DropPayload, Editor, KeyEvent, NodeKind, Outcome, PointerEvent, ShapeNode, ShapeTree, ToolKind,
    DEFAULT_PAGE_SIZE,
};
use rmdraw_settings::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Size of the first page.
    #[serde(default)]
    pub page: Option<Size>,
    /// Nodes present before the first step. They are not undoable.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    pub frame: Rect,
    /// Name of the parent; the first page when absent.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub roll: f64,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Press(PointerEvent),
    Drag(PointerEvent),
    Move(PointerEvent),
    Release(PointerEvent),
    /// Press and release at the same point.
    Click(PointerEvent),
    Key(KeyEvent),
    Tool { tool: ToolKind },
    Select { nodes: Vec<String> },
    SuperSelect { node: Option<String> },
    Drop { point: Point, payload: DropPayload },
    /// Finish every outstanding image load with this natural size.
    LoadImages { size: Size },
    Command { command: Command },
    /// Name the selected node, or the super-selected one when nothing is
    /// selected, so later steps can refer to it.
    Name { name: String },
    RunPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Delete,
    Group,
    Ungroup,
    BringToFront,
    SendToBack,
    Lock,
    Unlock,
    SelectAll,
    Pop,
    Copy,
    Cut,
    Paste,
    Duplicate,
    AddPage,
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<String>,
    pub frame: Rect,
    pub roll: f64,
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
}

/// Document and editor state after a script ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Attached nodes below the root, parents before children.
    pub nodes: Vec<NodeReport>,
    pub selected: Vec<String>,
    pub super_selection_path: Vec<String>,
    pub tool: ToolKind,
    pub undo_count: usize,
    pub undo_title: Option<String>,
    pub redo_title: Option<String>,
    /// Steps that reported nothing to do, by index.
    pub noop_steps: Vec<usize>,
}

struct Session {
    editor: Editor,
    names: HashMap<String, NodeId>,
    loads: Rc<RefCell<Vec<(LoadTicket, NodeId)>>>,
}

impl Session {
    fn new(config: Config, script: &Script) -> anyhow::Result<Self> {
        let mut tree = ShapeTree::new_document(script.page.unwrap_or(DEFAULT_PAGE_SIZE));
        let page = tree.active_page();
        let mut names = HashMap::new();
        for spec in &script.nodes {
            if names.contains_key(&spec.name) {
                bail!("duplicate node name '{}'", spec.name);
            }
            let parent = match &spec.parent {
                Some(p) => *names
                    .get(p)
                    .ok_or_else(|| anyhow!("unknown parent '{}' for '{}'", p, spec.name))?,
                None => page,
            };
            let mut node = ShapeNode::new(spec.kind).with_frame(spec.frame);
            node.name = spec.name.clone();
            node.roll = spec.roll;
            node.fill = spec.fill.clone();
            node.locked = spec.locked;
            if let Some(text) = &spec.text {
                node.text = text.clone();
            }
            let id = tree.create_node(node);
            tree.add_child(parent, id)
                .with_context(|| format!("adding '{}'", spec.name))?;
            names.insert(spec.name.clone(), id);
        }
        let _ = tree.take_changes();
        let _ = tree.take_dirty();

        let mut editor = Editor::with_document(config, tree);
        let loads = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&loads);
        editor.subscribe(
            EventFilter::Categories(vec![EventCategory::Document]),
            move |event| {
                if let EditorEvent::ImageLoadRequested { ticket, node, .. } = event {
                    sink.borrow_mut().push((*ticket, *node));
                }
            },
        );
        Ok(Self {
            editor,
            names,
            loads,
        })
    }

    fn lookup(&self, name: &str) -> anyhow::Result<NodeId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("unknown node '{}'", name))
    }

    fn run(&mut self, step: &Step) -> anyhow::Result<Outcome> {
        let editor = &mut self.editor;
        let outcome = match step {
            Step::Press(e) => editor.mouse_pressed(e).map(|_| Outcome::Done)?,
            Step::Drag(e) => editor.mouse_dragged(e).map(|_| Outcome::Done)?,
            Step::Move(e) => editor.mouse_moved(e).map(|_| Outcome::Done)?,
            Step::Release(e) => editor.mouse_released(e).map(|_| Outcome::Done)?,
            Step::Click(e) => {
                editor.mouse_pressed(e)?;
                editor.mouse_released(e)?;
                Outcome::Done
            }
            Step::Key(e) => editor.handle_key(e)?,
            Step::Tool { tool } => {
                editor.set_tool(*tool);
                Outcome::Done
            }
            Step::Select { nodes } => {
                let ids = nodes
                    .iter()
                    .map(|n| self.lookup(n))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                self.editor.set_selection(&ids)?;
                Outcome::Done
            }
            Step::SuperSelect { node } => {
                let id = node.as_deref().map(|n| self.lookup(n)).transpose()?;
                self.editor.set_super_selection(id)?;
                Outcome::Done
            }
            Step::Drop { point, payload } => editor.drop_payload(*point, payload.clone())?,
            Step::LoadImages { size } => {
                let pending = std::mem::take(&mut *self.loads.borrow_mut());
                let mut outcome = Outcome::NothingToDo;
                for (ticket, node) in pending {
                    if self.editor.complete_image_load(ticket, node, *size)? == Outcome::Done {
                        outcome = Outcome::Done;
                    }
                }
                outcome
            }
            Step::Command { command } => run_command(editor, *command)?,
            Step::Name { name } => {
                let id = editor
                    .selected()
                    .first()
                    .copied()
                    .unwrap_or_else(|| editor.super_selected());
                self.names.insert(name.clone(), id);
                Outcome::Done
            }
            Step::RunPending => editor.run_pending(),
        };
        Ok(outcome)
    }

    fn label(&self, reverse: &HashMap<NodeId, &str>, id: NodeId) -> String {
        if let Some(name) = reverse.get(&id) {
            return (*name).to_string();
        }
        match self.editor.tree().get(id) {
            Some(n) if !n.name.is_empty() => n.name.clone(),
            _ => id.to_string(),
        }
    }

    fn report(&self, noop_steps: Vec<usize>) -> Report {
        let tree = self.editor.tree();
        let reverse: HashMap<NodeId, &str> =
            self.names.iter().map(|(k, v)| (*v, k.as_str())).collect();
        let nodes = tree
            .descendants(tree.root())
            .into_iter()
            .skip(1)
            .filter_map(|id| {
                let n = tree.get(id)?;
                Some(NodeReport {
                    name: self.label(&reverse, id),
                    kind: n.kind,
                    parent: n
                        .parent()
                        .filter(|p| *p != tree.root())
                        .map(|p| self.label(&reverse, p)),
                    frame: Rect {
                        x: n.x,
                        y: n.y,
                        width: n.width,
                        height: n.height,
                    },
                    roll: n.roll,
                    fill: n.fill.clone(),
                    text: n.text.clone(),
                })
            })
            .collect();
        let undoer = self.editor.undoer();
        Report {
            nodes,
            selected: self
                .editor
                .selected()
                .iter()
                .map(|id| self.label(&reverse, *id))
                .collect(),
            super_selection_path: self
                .editor
                .super_selection_path()
                .iter()
                .map(|id| self.label(&reverse, *id))
                .collect(),
            tool: self.editor.current_tool(),
            undo_count: undoer.undo_count(),
            undo_title: undoer.undo_title(),
            redo_title: undoer.redo_title(),
            noop_steps,
        }
    }
}

fn run_command(editor: &mut Editor, command: Command) -> anyhow::Result<Outcome> {
    let outcome = match command {
        Command::Delete => editor.delete_selected()?,
        Command::Group => editor.group_selected()?,
        Command::Ungroup => editor.ungroup_selected()?,
        Command::BringToFront => editor.bring_to_front()?,
        Command::SendToBack => editor.send_to_back()?,
        Command::Lock => editor.set_locked(true)?,
        Command::Unlock => editor.set_locked(false)?,
        Command::SelectAll => editor.select_all()?,
        Command::Pop => editor.pop_selection()?,
        Command::Copy => editor.copy()?,
        Command::Cut => editor.cut()?,
        Command::Paste => editor.paste()?,
        Command::Duplicate => editor.duplicate()?,
        Command::AddPage => {
            editor.add_page()?;
            Outcome::Done
        }
        Command::Undo => editor.undo()?,
        Command::Redo => editor.redo()?,
    };
    Ok(outcome)
}

/// Replay a script against a fresh editor session.
///
/// Deferred work runs after every step, as a host would on idle, so work
/// held back by a gesture is committed once the gesture ends.
pub fn replay(script: &Script, config: Config) -> anyhow::Result<Report> {
    let mut session = Session::new(config, script)?;
    let mut noop_steps = Vec::new();
    for (i, step) in script.steps.iter().enumerate() {
        let outcome = session
            .run(step)
            .with_context(|| format!("step {} ({:?}) failed", i, step))?;
        if outcome.is_noop() {
            tracing::debug!(step = i, "Step had nothing to do");
            noop_steps.push(i);
        }
        // the host goes idle between events
        let _ = session.editor.run_pending();
    }
    tracing::info!(
        steps = script.steps.len(),
        nodes = session.editor.tree().len(),
        "Script finished"
    );
    Ok(session.report(noop_steps))
}

pub fn load_script(path: &Path) -> anyhow::Result<Script> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing script {}", path.display()))
}
