use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::view::{ActionState, ViewAction};

/// Physical key bound to each viewer action.
#[derive(Clone, Debug)]
pub(crate) struct KeyBindings {
    zoom_in: KeyCode,
    zoom_out: KeyCode,
    up: KeyCode,
    down: KeyCode,
    left: KeyCode,
    right: KeyCode,
    quit: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            zoom_in: KeyCode::KeyW,
            zoom_out: KeyCode::KeyS,
            up: KeyCode::ArrowUp,
            down: KeyCode::ArrowDown,
            left: KeyCode::ArrowLeft,
            right: KeyCode::ArrowRight,
            quit: KeyCode::Escape,
        }
    }
}

impl KeyBindings {
    fn key_for(&self, action: ViewAction) -> KeyCode {
        match action {
            ViewAction::ZoomIn => self.zoom_in,
            ViewAction::ZoomOut => self.zoom_out,
            ViewAction::Up => self.up,
            ViewAction::Down => self.down,
            ViewAction::Left => self.left,
            ViewAction::Right => self.right,
            ViewAction::Quit => self.quit,
        }
    }
}

/// Held-key snapshot, fed from window events and queried once per frame.
#[derive(Debug, Default)]
pub struct KeyboardState {
    down: HashSet<KeyCode>,
    bindings: KeyBindings,
}

impl KeyboardState {
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        // Unidentified keys cannot be bound, ignore them.
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        self.set(code, event.state);
    }

    pub fn set(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.down.insert(code);
            }
            ElementState::Released => {
                self.down.remove(&code);
            }
        }
    }

    /// Releases everything; a key let go while unfocused never reports a release.
    pub fn focus_changed(&mut self, focused: bool) {
        if !focused {
            self.down.clear();
        }
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.down.contains(&code)
    }
}

impl ActionState for KeyboardState {
    fn is_down(&self, action: ViewAction) -> bool {
        self.is_key_down(self.bindings.key_for(action))
    }
}
