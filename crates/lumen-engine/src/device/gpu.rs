use anyhow::{Context, Result, ensure};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::frame::GpuFrame;
use super::init::GpuInit;
use super::surface::{
    SurfaceErrorAction, choose_alpha_mode, choose_depth_format, choose_surface_format,
    classify_surface_error,
};

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - picks the adapter and checks the capabilities the renderer relies on
/// - creates and stores Device/Queue
/// - creates and configures the Surface (swapchain)
/// - acquires and presents surface images
pub struct Gpu<'w> {
    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; the runtime guarantees the
    /// window outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Depth format chosen for this adapter.
    depth_format: wgpu::TextureFormat,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = select_adapter(&instance, &surface, init.adapter_name.as_deref()).await?;
        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        ensure!(
            adapter.features().contains(init.required_features),
            "adapter '{}' lacks required features {:?}",
            info.name,
            init.required_features
        );
        let limits = adapter.limits();
        ensure!(
            limits.max_immediate_size >= init.required_limits.max_immediate_size,
            "adapter '{}' supports {} bytes of immediate data, {} required",
            info.name,
            limits.max_immediate_size,
            init.required_limits.max_immediate_size
        );

        let depth_format = choose_depth_format(&init.depth_formats, |f| {
            adapter
                .get_texture_format_features(f)
                .allowed_usages
                .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        })
        .with_context(|| format!("no supported depth format among {:?}", init.depth_formats))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&caps, init.prefer_srgb)
            .context("no supported surface formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode,
            alpha_mode: choose_alpha_mode(&caps, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        log::debug!("surface {format:?} {}x{}, depth {depth_format:?}", size.width, size.height);

        Ok(Gpu {
            surface,
            adapter,
            device,
            queue,
            config,
            depth_format,
            size,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Whether the surface currently has a drawable extent.
    pub fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Reconfigures the surface after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only the size is recorded and configuration is deferred.
    /// Returns `true` when the surface was reconfigured.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        self.size = new_size;
        if !self.is_drawable() {
            return false;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        true
    }

    /// Acquires the next surface image.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok(GpuFrame { surface_texture, view })
    }

    /// Presents an image whose commands have been submitted.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame { surface_texture, view } = frame;
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into an action, reconfiguring when needed.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        let action = classify_surface_error(&err);
        match action {
            SurfaceErrorAction::Reconfigured if self.is_drawable() => {
                self.surface.configure(&self.device, &self.config);
            }
            SurfaceErrorAction::Reconfigured => {}
            SurfaceErrorAction::SkipFrame => log::debug!("skipping frame: {err}"),
            SurfaceErrorAction::Fatal => log::error!("surface error: {err}"),
        }
        action
    }

    /// Blocks until all submitted work has completed.
    pub fn wait_idle(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("failed waiting for device idle")?;
        Ok(())
    }
}

async fn select_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    name: Option<&str>,
) -> Result<wgpu::Adapter> {
    let Some(name) = name else {
        return instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter");
    };

    let adapters = instance.enumerate_adapters(wgpu::Backends::all()).await;
    let names: Vec<String> = adapters.iter().map(|a| a.get_info().name).collect();

    adapters
        .into_iter()
        .find(|a| a.get_info().name == name && a.is_surface_supported(surface))
        .with_context(|| {
            format!(
                "no adapter named '{name}' can present to this window; available: [{}]",
                names.join(", ")
            )
        })
}
