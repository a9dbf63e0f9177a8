use std::fmt;

/// Keyboard key, identified by physical position on a US layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,
    Meta,

    /// `A`..=`Z`, always uppercase.
    Letter(char),
    /// `0`..=`9`.
    Digit(u8),
    /// `F1`..=`F12`.
    Function(u8),

    /// Platform key not represented above, with its platform code.
    Unknown(u32),
}

impl Key {
    /// Letter key for `c`, case-insensitive.
    pub fn letter(c: char) -> Option<Key> {
        c.is_ascii_alphabetic().then(|| Key::Letter(c.to_ascii_uppercase()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Letter(c) => write!(f, "{c}"),
            Key::Digit(d) => write!(f, "{d}"),
            Key::Function(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Mouse wheel delta, either in scroll lines or in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Logical pixels per scroll line when converting pixel deltas.
    pub const PIXELS_PER_LINE: f32 = 20.0;

    /// Vertical delta in lines.
    pub fn lines_y(&self) -> f32 {
        match *self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / Self::PIXELS_PER_LINE,
        }
    }
}

/// Pointer move event in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Pointer button event, with the pointer position at the time of the press.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub x: f32,
    pub y: f32,
    pub modifiers: Modifiers,
}

/// Committed text (not IME composition).
#[derive(Debug, Clone, PartialEq)]
pub struct TextEvent {
    pub text: String,
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
        /// True when the event is a key-repeat.
        repeat: bool,
    },

    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),

    MouseWheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },

    Text(TextEvent),

    /// Pointer left the window surface.
    PointerLeft,

    /// Window focus change.
    Focused(bool),
}

impl InputEvent {
    /// `Some(key)` for an initial (non-repeat) key press.
    pub fn pressed_key(&self) -> Option<Key> {
        match self {
            InputEvent::Key { key, state: KeyState::Pressed, repeat: false, .. } => Some(*key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat }
    }

    #[test]
    fn pressed_key_ignores_release_and_repeat() {
        let u = Key::Letter('U');
        assert_eq!(key(u, KeyState::Pressed, false).pressed_key(), Some(u));
        assert_eq!(key(u, KeyState::Pressed, true).pressed_key(), None);
        assert_eq!(key(u, KeyState::Released, false).pressed_key(), None);
        assert_eq!(InputEvent::PointerLeft.pressed_key(), None);
    }

    #[test]
    fn letters_are_case_insensitive() {
        assert_eq!(Key::letter('s'), Some(Key::Letter('S')));
        assert_eq!(Key::letter('S'), Some(Key::Letter('S')));
        assert_eq!(Key::letter('1'), None);
        assert_eq!(Key::Function(5).to_string(), "F5");
    }

    #[test]
    fn wheel_pixels_convert_to_lines() {
        assert_eq!(MouseWheelDelta::Line { x: 0.0, y: -2.0 }.lines_y(), -2.0);
        assert_eq!(MouseWheelDelta::Pixel { x: 0.0, y: 40.0 }.lines_y(), 2.0);
    }
}
