use anyhow::Result;
use lumen_engine::core::{App, FrameCtx, SwapchainEvent};
use lumen_engine::device::Gpu;
use lumen_engine::input::InputEvent;
use lumen_engine::render::FrameRenderer;
use lumen_scene::model::CameraId;
use lumen_scene::{CameraMode, RenderState, TextureImage};

use crate::controls::apply_input;

/// The viewer application: scene state plus the renderer that draws it.
///
/// The renderer is built on the first swapchain event, and rebuilt only when
/// the surface or depth format changes.
pub struct Viewer {
    state: RenderState,
    textures: Vec<TextureImage>,
    workspaces: usize,
    renderer: Option<FrameRenderer>,
    titled: Option<(CameraMode, Option<CameraId>, bool)>,
}

impl Viewer {
    pub fn new(state: RenderState, textures: Vec<TextureImage>, workspaces: usize) -> Self {
        Self {
            state,
            textures,
            workspaces,
            renderer: None,
            titled: None,
        }
    }

    fn title(&self) -> String {
        let scene = &self.state.scene().name;
        let view = match (self.state.mode(), self.state.active_camera()) {
            (CameraMode::Scene, Some(id)) => format!("camera '{}'", self.state.scene().camera(id).name),
            _ => "orbit".to_string(),
        };
        let bounds = if self.state.show_bounds() { " +bounds" } else { "" };
        format!("lumen: {scene} [{view}]{bounds}")
    }

    /// The new window title, if the view changed since the last call.
    fn retitle(&mut self) -> Option<String> {
        let shown = (self.state.mode(), self.state.active_camera(), self.state.show_bounds());
        if self.titled == Some(shown) {
            return None;
        }
        self.titled = Some(shown);
        Some(self.title())
    }
}

impl App for Viewer {
    fn on_input(&mut self, event: &InputEvent) {
        apply_input(&mut self.state, event);
    }

    fn on_swapchain(&mut self, gpu: &Gpu<'_>, swapchain: &SwapchainEvent) -> Result<()> {
        self.state.set_viewport(swapchain.width, swapchain.height);

        if let Some(renderer) = self.renderer.as_mut().filter(|r| r.matches(swapchain)) {
            return renderer.on_swapchain(swapchain);
        }

        if self.renderer.take().is_some() {
            log::info!("surface format changed; rebuilding renderer");
        } else {
            log::info!("rendering on '{}'", gpu.adapter_info().name);
        }
        self.renderer = Some(FrameRenderer::new(
            gpu.device(),
            gpu.queue(),
            swapchain,
            &self.state,
            &self.textures,
            self.workspaces,
        )?);
        Ok(())
    }

    fn update(&mut self, dt: f32) {
        self.state.update(dt);
    }

    fn render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        renderer.render(ctx, &mut self.state)?;

        if let Some(title) = self.retitle() {
            ctx.runtime.set_title(title);
        }
        Ok(())
    }
}
