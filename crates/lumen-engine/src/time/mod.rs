//! Frame timing.
//!
//! One `FrameClock` drives the loop; `tick()` is called once per frame and
//! yields the clamped delta handed to `App::update`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
