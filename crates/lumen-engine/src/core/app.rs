use anyhow::Result;

use crate::device::Gpu;
use crate::input::InputEvent;

use super::ctx::FrameCtx;

/// The drawable surface changed: first configuration, resize, or recovery.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapchainEvent {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
}

/// Application contract implemented by higher layers.
///
/// The runtime calls these in a fixed order each frame: pending `on_input`
/// events as they arrive, then `update`, then `render` with an acquired
/// workspace and surface image. `on_swapchain` is called before the first
/// `render` and again after every surface reconfiguration.
pub trait App {
    fn on_input(&mut self, event: &InputEvent);

    fn on_swapchain(&mut self, gpu: &Gpu<'_>, event: &SwapchainEvent) -> Result<()>;

    /// Advances by `dt` seconds (already clamped by the frame clock).
    fn update(&mut self, dt: f32);

    /// Records and submits one frame. An error ends the event loop.
    fn render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()>;
}
