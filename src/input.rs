use crate::board::Action;
use crate::element::Tool;
use crate::gpu::State;
use crate::hit_test::CursorStyle;
use winit::event::*;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::CursorIcon;

const TOOL_KEYS: [(KeyCode, Tool); 7] = [
    (KeyCode::Digit1, Tool::Selection),
    (KeyCode::Digit2, Tool::Line),
    (KeyCode::Digit3, Tool::Box),
    (KeyCode::Digit4, Tool::Pencil),
    (KeyCode::Digit5, Tool::Pen),
    (KeyCode::Digit6, Tool::Text),
    (KeyCode::Digit7, Tool::Eraser),
];

fn tool_for_key(code: KeyCode) -> Option<Tool> {
    TOOL_KEYS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, tool)| *tool)
}

fn cursor_icon(style: CursorStyle) -> CursorIcon {
    match style {
        CursorStyle::Default => CursorIcon::Default,
        CursorStyle::Move => CursorIcon::Move,
        CursorStyle::NwseResize => CursorIcon::NwseResize,
        CursorStyle::NeswResize => CursorIcon::NeswResize,
        CursorStyle::Text => CursorIcon::Text,
    }
}

impl State {
    /// Feeds a window event to the board. Returns `true` when consumed.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = [position.x as f32, position.y as f32];
                let before = self.board.cursor();
                if let Err(err) = self.board.pointer_move(self.mouse_pos) {
                    log::error!("pointer move failed: {err}");
                }
                if self.board.cursor() != before {
                    self.window.set_cursor(cursor_icon(self.board.cursor()));
                }
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let result = match state {
                    ElementState::Pressed => {
                        if self.board.action() == Action::Writing {
                            self.commit_typing();
                        }
                        self.board.pointer_down(self.mouse_pos)
                    }
                    ElementState::Released => self.board.pointer_up(self.mouse_pos),
                };
                if let Err(err) = result {
                    log::error!("pointer event failed: {err}");
                }
                true
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state != ElementState::Pressed {
                    return false;
                }
                let PhysicalKey::Code(keycode) = key_event.physical_key else {
                    return false;
                };

                if self.board.action() == Action::Writing {
                    return self.typing_key(keycode, key_event.text.as_deref());
                }

                let is_ctrl_or_cmd = self.modifiers.control_key() || self.modifiers.super_key();
                match keycode {
                    KeyCode::KeyZ if is_ctrl_or_cmd && self.modifiers.shift_key() => self.board.redo(),
                    KeyCode::KeyZ if is_ctrl_or_cmd => self.board.undo(),
                    KeyCode::KeyY if is_ctrl_or_cmd => self.board.redo(),
                    KeyCode::Delete => self.board.clear(),
                    code => match tool_for_key(code) {
                        Some(tool) => {
                            self.board.select_tool(tool);
                            self.window.set_cursor(cursor_icon(self.board.cursor()));
                        }
                        None => return false,
                    },
                }
                true
            }
            _ => false,
        }
    }

    fn typing_key(&mut self, keycode: KeyCode, text: Option<&str>) -> bool {
        match keycode {
            KeyCode::Enter | KeyCode::NumpadEnter | KeyCode::Escape => self.commit_typing(),
            KeyCode::Backspace => {
                self.typing.buffer.pop();
                self.typing.touch();
            }
            _ => {
                let typed = text.unwrap_or_default().chars().filter(|ch| !ch.is_control());
                self.typing.buffer.extend(typed);
                self.typing.touch();
            }
        }
        true
    }

    fn commit_typing(&mut self) {
        let text = std::mem::take(&mut self.typing.buffer);
        if let Err(err) = self.board.commit_text(&text) {
            log::error!("committing text failed: {err}");
        }
        self.typing.element = None;
    }
}
