/// Represents a single acquired surface image.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// image. Dropping it after submission presents it.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}
