//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the GPU layer,
//! the workspace ring and the application.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
