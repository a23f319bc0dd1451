use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Current input state for a single window.
///
/// Holds "is down" information; per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// State for a freshly created window. Platforms may not send an initial
    /// focus event, so the caller passes the window's current focus.
    pub fn new(focused: bool) -> Self {
        Self { focused, ..Self::default() }
    }

    /// Applies raw device motion. Raw motion is delivered even when the window
    /// is unfocused; it is dropped then.
    pub fn apply_raw_motion(&mut self, frame: &mut InputFrame, dx: f32, dy: f32) {
        if self.focused {
            self.apply_event(frame, InputEvent::MouseMotion { dx, dy });
        }
    }

    /// Applies a platform-agnostic input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(key) {
                        frame.keys_released.insert(*key);
                    }
                }
            },

            InputEvent::MouseMotion { dx, dy } => {
                frame.mouse_delta.0 += dx;
                frame.mouse_delta.1 += dy;
            }

            InputEvent::MouseWheel { delta } => {
                frame.wheel_lines += delta.lines_y();
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, repeat: false }
    }

    #[test]
    fn press_records_edge_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));
        frame.clear();
        // OS key repeat delivers another press; no new edge.
        state.apply_event(&mut frame, key(Key::W, KeyState::Pressed));

        assert!(state.key_down(Key::W));
        assert!(!frame.key_pressed(Key::W));
    }

    #[test]
    fn release_edge_requires_prior_press() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::R, KeyState::Released));
        assert!(!frame.key_released(Key::R));

        state.apply_event(&mut frame, key(Key::R, KeyState::Pressed));
        state.apply_event(&mut frame, key(Key::R, KeyState::Released));
        assert!(frame.key_released(Key::R));
        assert!(!state.key_down(Key::R));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::A, KeyState::Pressed));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(!state.key_down(Key::A));
    }

    #[test]
    fn raw_motion_applies_when_created_focused() {
        let mut state = InputState::new(true);
        let mut frame = InputFrame::default();

        // No Focused event has arrived yet.
        state.apply_raw_motion(&mut frame, 4.0, -2.0);
        assert_eq!(frame.mouse_delta, (4.0, -2.0));
    }

    #[test]
    fn raw_motion_dropped_while_unfocused() {
        let mut state = InputState::new(false);
        let mut frame = InputFrame::default();

        state.apply_raw_motion(&mut frame, 4.0, -2.0);
        assert_eq!(frame.mouse_delta, (0.0, 0.0));
        assert!(frame.events.is_empty());

        state.apply_event(&mut frame, InputEvent::Focused(true));
        state.apply_raw_motion(&mut frame, 1.0, 1.0);
        assert_eq!(frame.mouse_delta, (1.0, 1.0));
    }

    #[test]
    fn motion_and_wheel_accumulate_until_cleared() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, InputEvent::MouseMotion { dx: 2.0, dy: -1.0 });
        state.apply_event(&mut frame, InputEvent::MouseMotion { dx: 3.0, dy: 4.0 });
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 } },
        );
        state.apply_event(
            &mut frame,
            InputEvent::MouseWheel { delta: MouseWheelDelta::Pixel { x: 0.0, y: 40.0 } },
        );

        assert_eq!(frame.mouse_delta, (5.0, 3.0));
        assert_eq!(frame.wheel_lines, 2.0);
        assert_eq!(frame.events.len(), 4);

        frame.clear();
        assert_eq!(frame.mouse_delta, (0.0, 0.0));
        assert_eq!(frame.wheel_lines, 0.0);
        assert!(frame.events.is_empty());
    }
}
