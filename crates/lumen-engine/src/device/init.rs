/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    pub prefer_srgb: bool,

    /// Present mode (swap behavior). FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Exact adapter name to use instead of the high-performance default.
    pub adapter_name: Option<String>,

    /// Required wgpu features. Setup fails when the adapter lacks any of them.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Depth formats to try, in order of preference.
    pub depth_formats: Vec<wgpu::TextureFormat>,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

/// Bytes of immediate data the background pass pushes (one `f32` time).
pub const REQUIRED_IMMEDIATE_SIZE: u32 = 4;

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            adapter_name: None,
            required_features: wgpu::Features::IMMEDIATES,
            required_limits: wgpu::Limits {
                max_immediate_size: REQUIRED_IMMEDIATE_SIZE,
                ..wgpu::Limits::default()
            },
            depth_formats: vec![wgpu::TextureFormat::Depth32Float, wgpu::TextureFormat::Depth24Plus],
            desired_maximum_frame_latency: 2,
        }
    }
}
