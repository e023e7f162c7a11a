//! Keyboard dispatch.

use super::Editor;
use crate::error::{EditorResult, Outcome};
use crate::handlers::handler_for;
use crate::input::{Key, KeyEvent};

impl Editor {
    /// Handle a key press. The super-selected node's handler sees it
    /// first; the editor keymap handles the rest. Each key that changes
    /// the document is one undo step.
    pub fn handle_key(&mut self, event: &KeyEvent) -> EditorResult<Outcome> {
        let target = self.selection.super_selected();
        if let Some(kind) = self.tree().kind(target) {
            if handler_for(kind).key_pressed(self, target, event) {
                self.finish_edit();
                return Ok(Outcome::Done);
            }
        }

        let m = event.modifiers;
        let result = match event.key {
            Key::Delete | Key::Backspace => self.delete_selected(),
            Key::Escape => self.pop_selection(),
            Key::Left | Key::Right | Key::Up | Key::Down => {
                let step = if m.shift {
                    self.config.editor.nudge_step_large
                } else {
                    self.config.editor.nudge_step
                };
                let (dx, dy) = match event.key {
                    Key::Left => (-step, 0.0),
                    Key::Right => (step, 0.0),
                    Key::Up => (0.0, -step),
                    _ => (0.0, step),
                };
                self.move_selected_by(dx, dy)
            }
            Key::Char(c) if m.shortcut() => match c.to_ascii_lowercase() {
                'z' if m.shift => self.redo(),
                'z' => self.undo(),
                'y' => self.redo(),
                'g' if m.shift => self.ungroup_selected(),
                'g' => self.group_selected(),
                'a' => self.select_all(),
                'c' => self.copy(),
                'x' => self.cut(),
                'v' => self.paste(),
                'd' => self.duplicate(),
                _ => Ok(Outcome::NothingToDo),
            },
            _ => Ok(Outcome::NothingToDo),
        };
        if let Ok(Outcome::NothingToDo) = result {
            tracing::debug!(key = ?event.key, "Key not handled");
        }
        self.finish_edit();
        result
    }
}
