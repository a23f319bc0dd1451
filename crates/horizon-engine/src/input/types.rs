use std::fmt;

/// Keyboard key identifier.
///
/// Only keys the viewer binds are named; everything else maps to
/// `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    Shift,
    Control,
    Alt,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Pixel deltas per wheel line when normalizing touchpad input.
    pub const PIXELS_PER_LINE: f32 = 40.0;

    /// Vertical delta expressed in lines. Positive is away from the user.
    pub fn lines_y(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / Self::PIXELS_PER_LINE,
        }
    }
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    /// Raw, unaccelerated pointer motion. Keeps flowing while the cursor is grabbed.
    MouseMotion { dx: f32, dy: f32 },

    MouseWheel { delta: MouseWheelDelta },

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
