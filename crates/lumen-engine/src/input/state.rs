use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState};

/// Current input state: held keys and buttons, pointer position, focus.
///
/// Used by the runtime to fill in fields that winit does not carry on every
/// event (modifiers and pointer position on button presses).
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered to an unfocused window.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(p) => self.pointer_pos = Some((p.x, p.y)),
            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;
                match state {
                    KeyState::Pressed => self.keys_down.insert(*key),
                    KeyState::Released => self.keys_down.remove(key),
                };
            }

            InputEvent::PointerButton(b) => {
                self.pointer_pos = Some((b.x, b.y));
                self.modifiers = b.modifiers;
                match b.state {
                    MouseButtonState::Pressed => self.buttons_down.insert(b.button),
                    MouseButtonState::Released => self.buttons_down.remove(&b.button),
                };
            }

            InputEvent::MouseWheel { modifiers, .. } => self.modifiers = *modifiers,

            InputEvent::Text(_) => {}
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::{PointerButtonEvent, PointerMoveEvent};

    fn button(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        button_with(state, x, y, Modifiers::default())
    }

    fn button_with(state: MouseButtonState, x: f32, y: f32, modifiers: Modifiers) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            x,
            y,
            modifiers,
        })
    }

    #[test]
    fn tracks_buttons_and_pointer() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::PointerMoved(PointerMoveEvent { x: 3.0, y: 4.0 }));
        assert_eq!(s.pointer_pos, Some((3.0, 4.0)));

        s.apply_event(&button(MouseButtonState::Pressed, 5.0, 6.0));
        assert!(s.button_down(MouseButton::Left));
        assert_eq!(s.pointer_pos, Some((5.0, 6.0)));

        s.apply_event(&button(MouseButtonState::Released, 5.0, 6.0));
        assert!(!s.button_down(MouseButton::Left));

        s.apply_event(&InputEvent::PointerLeft);
        assert_eq!(s.pointer_pos, None);
    }

    #[test]
    fn focus_loss_clears_held_input() {
        let shift = Modifiers { shift: true, ..Default::default() };
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Key {
            key: Key::Shift,
            state: KeyState::Pressed,
            modifiers: shift,
            repeat: false,
        });
        s.apply_event(&button_with(MouseButtonState::Pressed, 0.0, 0.0, shift));
        assert!(s.key_down(Key::Shift) && s.modifiers.shift);
        assert!(s.button_down(MouseButton::Left));

        s.apply_event(&InputEvent::Focused(false));
        assert!(s.keys_down.is_empty() && s.buttons_down.is_empty());
    }

    #[test]
    fn button_event_modifiers_replace_state() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::ModifiersChanged(Modifiers { ctrl: true, ..Default::default() }));
        s.apply_event(&button(MouseButtonState::Pressed, 0.0, 0.0));
        assert!(!s.modifiers.ctrl);
    }
}
