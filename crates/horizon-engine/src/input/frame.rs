use std::collections::HashSet;

use super::types::{InputEvent, Key};

/// Per-frame input deltas.
///
/// `InputState` provides the current state (held keys).
/// `InputFrame` provides events, edges and accumulated motion for the current frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Keys pressed this frame.
    pub keys_pressed: HashSet<Key>,

    /// Keys released this frame.
    pub keys_released: HashSet<Key>,

    /// Accumulated raw mouse motion `(dx, dy)`, +y down.
    pub mouse_delta: (f32, f32),

    /// Accumulated vertical wheel movement in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = (0.0, 0.0);
        self.wheel_lines = 0.0;
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }
}
