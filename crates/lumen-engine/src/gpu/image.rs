use super::handle::Handle;

/// A 2D texture with its default view.
#[derive(Debug)]
pub struct AllocatedImage {
    pub handle: Handle<wgpu::Texture>,
    pub view: wgpu::TextureView,
    pub extent: wgpu::Extent3d,
    pub format: wgpu::TextureFormat,
}

impl AllocatedImage {
    pub fn texture(&self) -> Option<&wgpu::Texture> {
        self.handle.get()
    }
}
