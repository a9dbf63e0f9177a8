//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! [`translate_window_event`] is the single place winit events are converted.

mod state;
mod translate;
mod types;

pub use state::InputState;
pub use translate::translate_window_event;
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent, TextEvent,
};
