use winit::window::Window;

use crate::device::Gpu;
use crate::frame::SubmissionFence;
use crate::input::InputState;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// Per-frame context passed to `core::App::render`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a Gpu<'w>,
    /// View of the acquired surface image.
    pub target: &'a wgpu::TextureView,
    /// Ring slot this frame owns until its submission completes.
    pub workspace: usize,
    pub time: FrameTime,
    pub input: &'a InputState,
    pub runtime: &'a mut RuntimeCtx,
    fence: &'a mut SubmissionFence,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        window: &'a Window,
        gpu: &'a Gpu<'w>,
        target: &'a wgpu::TextureView,
        workspace: usize,
        time: FrameTime,
        input: &'a InputState,
        runtime: &'a mut RuntimeCtx,
        fence: &'a mut SubmissionFence,
    ) -> Self {
        Self { window, gpu, target, workspace, time, input, runtime, fence }
    }

    /// Submits `commands` and makes the workspace slot wait on them before reuse.
    pub fn submit(&mut self, commands: wgpu::CommandBuffer) -> wgpu::SubmissionIndex {
        let index = self.gpu.queue().submit(std::iter::once(commands));
        self.fence.signal_on(index.clone());
        index
    }
}
