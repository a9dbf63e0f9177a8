//! GPU rendering of a scene.
//!
//! Three pipelines share one render pass per frame:
//! - background: full-screen triangle, time pushed as an immediate, no depth
//! - objects: lit textured triangles, one draw per instance
//! - lines: world-space wireframe boxes, depth tested
//!
//! [`FrameRenderer`] owns the pipelines and every buffer and image they read.

mod background;
mod common;
mod lines;
mod objects;
mod renderer;
mod textures;

pub use renderer::FrameRenderer;
