use anyhow::{Context, Result, anyhow, bail};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, FrameCtx, SwapchainEvent};
use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::frame::{SubmissionFence, WorkspaceRing};
use crate::input::{InputState, Key, translate_window_event};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial drawable size in physical pixels.
    pub initial_size: PhysicalSize<u32>,
    /// Number of in-flight frame slots.
    pub workspaces: usize,
    pub exit_on_escape: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            initial_size: PhysicalSize::new(800, 540),
            workspaces: 2,
            exit_on_escape: true,
        }
    }
}

/// Runtime context passed to the application during `render`.
///
/// Commands are buffered and applied after the callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    SetTitle(String),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until exit.
    ///
    /// Returns the error that ended the loop, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        if config.workspaces == 0 {
            bail!("at least one workspace is required");
        }

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    ring: Option<WorkspaceRing<SubmissionFence>>,
    entry: Option<WindowEntry>,

    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            ring: None,
            entry: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let fences: Vec<SubmissionFence> = entry.with_gpu(|gpu| {
            (0..self.config.workspaces)
                .map(|_| SubmissionFence::new(gpu.device()))
                .collect()
        });
        self.ring = Some(WorkspaceRing::new(fences)?);

        let app = &mut self.app;
        entry.with_gpu(|gpu| app.on_swapchain(gpu, &swapchain_event(gpu)))?;

        self.entry = Some(entry);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let app = &mut self.app;
        let (Some(entry), Some(ring)) = (self.entry.as_mut(), self.ring.as_mut()) else {
            return Ok(());
        };

        let mut runtime_ctx = RuntimeCtx::default();

        entry.with_mut(|fields| -> Result<()> {
            let ft = fields.clock.tick();
            app.update(ft.dt);

            if !fields.gpu.is_drawable() {
                return Ok(());
            }

            let slot = ring.acquire()?;
            let Some(frame) = acquire_image(fields.gpu, app)? else {
                return Ok(());
            };

            {
                let mut ctx = FrameCtx::new(
                    fields.window,
                    &*fields.gpu,
                    &frame.view,
                    slot,
                    ft,
                    &*fields.input_state,
                    &mut runtime_ctx,
                    ring.fence_mut(slot),
                );
                app.render(&mut ctx)?;
            }

            fields.window.pre_present_notify();
            fields.gpu.present(frame);
            Ok(())
        })?;

        for cmd in runtime_ctx.commands {
            match cmd {
                Command::SetTitle(title) => entry.with_window(|w| w.set_title(&title)),
                Command::Exit => self.exit_requested = true,
            }
        }
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) -> Result<()> {
        let app = &mut self.app;
        let Some(entry) = self.entry.as_mut() else { return Ok(()) };

        entry.with_mut(|fields| -> Result<()> {
            if fields.gpu.resize(new_size) {
                app.on_swapchain(fields.gpu, &swapchain_event(fields.gpu))?;
            }
            fields.window.request_redraw();
            Ok(())
        })
    }

    /// Waits for every in-flight frame before resources are dropped.
    fn shutdown(&mut self) -> Result<()> {
        if let Some(ring) = self.ring.as_mut() {
            ring.wait_all()?;
        }
        if let Some(entry) = self.entry.as_ref() {
            entry.with_gpu(|gpu| gpu.wait_idle())?;
        }
        Ok(())
    }
}

fn swapchain_event(gpu: &Gpu<'_>) -> SwapchainEvent {
    let size = gpu.size();
    SwapchainEvent {
        width: size.width,
        height: size.height,
        format: gpu.surface_format(),
        depth_format: gpu.depth_format(),
    }
}

/// Acquires a surface image, reconfiguring and retrying once if the surface
/// went out of date. `None` means this frame is skipped.
fn acquire_image<A: App>(gpu: &mut Gpu<'_>, app: &mut A) -> Result<Option<GpuFrame>> {
    for _ in 0..2 {
        let err = match gpu.begin_frame() {
            Ok(frame) => return Ok(Some(frame)),
            Err(err) => err,
        };
        match gpu.handle_surface_error(err) {
            SurfaceErrorAction::Reconfigured => {
                if !gpu.is_drawable() {
                    return Ok(None);
                }
                app.on_swapchain(gpu, &swapchain_event(gpu))?;
            }
            SurfaceErrorAction::SkipFrame => return Ok(None),
            SurfaceErrorAction::Fatal => return Err(anyhow!("surface is out of memory")),
        }
    }
    log::warn!("surface still unusable after reconfiguration; skipping frame");
    Ok(None)
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let exit_on_escape = self.config.exit_on_escape;
        let app = &mut self.app;
        let Some(entry) = self.entry.as_mut() else { return };

        let escape = entry.with_mut(|fields| {
            let scale = fields.window.scale_factor();
            let Some(ev) = translate_window_event(scale, fields.input_state, &event) else {
                return false;
            };
            fields.input_state.apply_event(&ev);
            if exit_on_escape && ev.pressed_key() == Some(Key::Escape) {
                return true;
            }
            app.on_input(&ev);
            false
        });

        if escape {
            log::info!("escape pressed; exiting");
            self.exit_requested = true;
            event_loop.exit();
            return;
        }

        let result = match &event {
            WindowEvent::CloseRequested => {
                self.exit_requested = true;
                Ok(())
            }
            WindowEvent::Resized(new_size) => self.resize(*new_size),
            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = self
                    .entry
                    .as_ref()
                    .map(|e| e.with_window(|w| w.inner_size()));
                match new_size {
                    Some(size) => self.resize(size),
                    None => Ok(()),
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
            return;
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Err(e) = self.shutdown() {
            log::error!("shutdown: {e:#}");
        }
        log::debug!("event loop exiting");
    }
}
