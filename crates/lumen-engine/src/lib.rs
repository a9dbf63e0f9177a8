//! Lumen engine crate.
//!
//! Platform and GPU runtime for the viewer: window and event loop, device
//! setup, buffer and image allocation, the frame workspace ring, and the
//! renderer that draws a `lumen_scene::RenderState`.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod gpu;
pub mod frame;
pub mod render;
