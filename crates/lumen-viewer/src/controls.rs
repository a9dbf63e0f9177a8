//! Keyboard and pointer bindings.
//!
//! | Input | Action |
//! |-------|--------|
//! | `U` | orbit camera |
//! | `S` | scene camera |
//! | `C` | next scene camera |
//! | `B` | toggle bounding boxes |
//! | left drag | orbit (orbit camera only) |
//! | wheel | zoom (orbit camera only) |

use lumen_engine::input::{InputEvent, Key, MouseButton, MouseButtonState};
use lumen_scene::{CameraMode, RenderState};

/// Applies one input event to the viewer state.
pub fn apply_input(state: &mut RenderState, event: &InputEvent) {
    match event {
        InputEvent::PointerButton(b) if b.button == MouseButton::Left => match b.state {
            MouseButtonState::Pressed => state.begin_drag(b.x, b.y),
            MouseButtonState::Released => state.end_drag(),
        },
        InputEvent::PointerMoved(p) => state.drag_to(p.x, p.y),
        InputEvent::PointerLeft | InputEvent::Focused(false) => state.end_drag(),
        InputEvent::MouseWheel { delta, .. } => state.zoom(delta.lines_y()),
        _ => {
            if let Some(Key::Letter(c)) = event.pressed_key() {
                apply_key(state, c);
            }
        }
    }
}

fn apply_key(state: &mut RenderState, c: char) {
    match c {
        'U' => state.set_mode(CameraMode::User),
        'S' => state.set_mode(CameraMode::Scene),
        'C' => state.cycle_camera(),
        'B' => state.toggle_bounds(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_engine::input::{
        KeyState, Modifiers, MouseWheelDelta, PointerButtonEvent, PointerMoveEvent,
    };
    use lumen_scene::source::MemorySource;
    use lumen_scene::{StateOptions, load_str};

    const TWO_CAMERAS: &str = r#"["s72-v2",
        { "type": "SCENE", "name": "s", "roots": ["a", "b"] },
        { "type": "NODE", "name": "a", "translation": [0, 0, 5], "camera": "first" },
        { "type": "NODE", "name": "b", "translation": [0, 0, -5], "camera": "second" },
        { "type": "CAMERA", "name": "first", "perspective": { "aspect": 1.5, "vfov": 1.0, "near": 0.1, "far": 100 } },
        { "type": "CAMERA", "name": "second", "perspective": { "aspect": 1.5, "vfov": 1.0, "near": 0.1, "far": 100 } }
    ]"#;

    fn state() -> RenderState {
        let scene = load_str(TWO_CAMERAS, &mut MemorySource::new()).unwrap();
        RenderState::new(scene, StateOptions::default()).unwrap()
    }

    fn press(c: char) -> InputEvent {
        InputEvent::Key {
            key: Key::letter(c).unwrap(),
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    fn button(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn mode_keys_switch_camera_mode() {
        let mut st = state();
        assert_eq!(st.mode(), CameraMode::Scene);

        apply_input(&mut st, &press('u'));
        assert_eq!(st.mode(), CameraMode::User);

        apply_input(&mut st, &press('s'));
        assert_eq!(st.mode(), CameraMode::Scene);
    }

    #[test]
    fn c_cycles_scene_cameras() {
        let mut st = state();
        let first = st.active_camera();
        apply_input(&mut st, &press('c'));
        assert_ne!(st.active_camera(), first);
        apply_input(&mut st, &press('c'));
        assert_eq!(st.active_camera(), first);
    }

    #[test]
    fn b_toggles_bounds() {
        let mut st = state();
        assert!(!st.show_bounds());
        apply_input(&mut st, &press('b'));
        assert!(st.show_bounds());
        apply_input(&mut st, &press('b'));
        assert!(!st.show_bounds());
    }

    #[test]
    fn key_repeat_and_release_are_ignored() {
        let mut st = state();
        let repeat = InputEvent::Key {
            key: Key::Letter('B'),
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: true,
        };
        let release = InputEvent::Key {
            key: Key::Letter('B'),
            state: KeyState::Released,
            modifiers: Modifiers::default(),
            repeat: false,
        };
        apply_input(&mut st, &repeat);
        apply_input(&mut st, &release);
        assert!(!st.show_bounds());
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn drag_orbits_user_camera() {
        let mut st = state();
        apply_input(&mut st, &press('u'));
        let before = *st.user_camera();

        apply_input(&mut st, &button(MouseButtonState::Pressed, 200.0, 100.0));
        apply_input(&mut st, &moved(20.0, 100.0));
        apply_input(&mut st, &button(MouseButtonState::Released, 20.0, 100.0));
        let after = *st.user_camera();
        assert_ne!(after.azimuth, before.azimuth);
        assert_eq!(after.elevation, before.elevation);

        apply_input(&mut st, &moved(400.0, 100.0));
        assert_eq!(*st.user_camera(), after);
    }

    #[test]
    fn pointer_leaving_ends_drag() {
        let mut st = state();
        apply_input(&mut st, &press('u'));
        apply_input(&mut st, &button(MouseButtonState::Pressed, 0.0, 0.0));
        apply_input(&mut st, &InputEvent::PointerLeft);

        let before = *st.user_camera();
        apply_input(&mut st, &moved(300.0, 300.0));
        assert_eq!(*st.user_camera(), before);
    }

    #[test]
    fn wheel_zooms_in_user_mode_only() {
        let mut st = state();
        let wheel = InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: 2.0 },
            modifiers: Modifiers::default(),
        };

        let before = st.user_camera().radius;
        apply_input(&mut st, &wheel);
        assert_eq!(st.user_camera().radius, before);

        apply_input(&mut st, &press('u'));
        apply_input(&mut st, &wheel);
        assert_ne!(st.user_camera().radius, before);
    }
}
