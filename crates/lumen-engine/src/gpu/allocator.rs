use anyhow::{Context, Result, bail};

use super::buffer::{AllocatedBuffer, BufferKind, align_to};
use super::handle::Handle;
use super::image::AllocatedImage;

/// Validation and out-of-memory scopes around one resource creation.
struct CreationScope {
    validation: wgpu::ErrorScopeGuard,
    oom: wgpu::ErrorScopeGuard,
}

impl CreationScope {
    fn push(device: &wgpu::Device) -> Self {
        let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        Self { validation, oom }
    }

    /// Pops both scopes, innermost first.
    fn finish(self) -> Result<()> {
        let oom = pollster::block_on(self.oom.pop());
        let validation = pollster::block_on(self.validation.pop());
        check_scopes(oom, validation)
    }
}

fn check_scopes(oom: Option<wgpu::Error>, validation: Option<wgpu::Error>) -> Result<()> {
    if let Some(err) = oom {
        bail!("out of memory: {err}");
    }
    if let Some(err) = validation {
        bail!("validation failed: {err}");
    }
    Ok(())
}

/// Creates and destroys buffers and images, and performs one-off uploads.
///
/// Every creation runs inside validation and out-of-memory error scopes, so
/// a bad descriptor or allocation failure surfaces as an `Err` instead of an
/// uncaptured device error.
pub struct Allocator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    live_buffers: usize,
    live_images: usize,
}

impl Allocator {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            live_buffers: 0,
            live_images: 0,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers
    }

    pub fn live_images(&self) -> usize {
        self.live_images
    }

    /// Creates a buffer of at least `size` bytes.
    ///
    /// Staging buffers get `MAP_WRITE | COPY_SRC` and start mapped; resident
    /// buffers get `usage | COPY_DST`.
    pub fn create_buffer(
        &mut self,
        label: &str,
        size: u64,
        kind: BufferKind,
        usage: wgpu::BufferUsages,
    ) -> Result<AllocatedBuffer> {
        let size = align_to(size.max(wgpu::COPY_BUFFER_ALIGNMENT), wgpu::COPY_BUFFER_ALIGNMENT);
        let (usage, mapped_at_creation) = match kind {
            BufferKind::Staging => (wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC, true),
            BufferKind::Resident => (usage | wgpu::BufferUsages::COPY_DST, false),
        };

        let scope = CreationScope::push(&self.device);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation,
        });
        scope
            .finish()
            .with_context(|| format!("failed to allocate buffer '{label}' ({size} bytes)"))?;

        self.live_buffers += 1;
        log::trace!("allocated {kind:?} buffer '{label}' ({size} bytes)");
        Ok(AllocatedBuffer::new(buffer, size, kind))
    }

    pub fn destroy_buffer(&mut self, buffer: AllocatedBuffer) {
        let AllocatedBuffer { handle, .. } = buffer;
        if let Some(b) = handle.release() {
            b.destroy();
            self.live_buffers = self.live_buffers.saturating_sub(1);
        }
    }

    pub fn create_image(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Result<AllocatedImage> {
        let extent = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };

        let scope = CreationScope::push(&self.device);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        scope
            .finish()
            .with_context(|| format!("failed to allocate image '{label}' ({width}x{height} {format:?})"))?;

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.live_images += 1;
        Ok(AllocatedImage {
            handle: Handle::new(texture),
            view,
            extent,
            format,
        })
    }

    pub fn destroy_image(&mut self, image: AllocatedImage) {
        let AllocatedImage { handle, .. } = image;
        if let Some(t) = handle.release() {
            t.destroy();
            self.live_images = self.live_images.saturating_sub(1);
        }
    }

    /// Creates a resident buffer holding `bytes`.
    ///
    /// Goes through a temporary staging buffer and waits for the copy.
    pub fn transfer_to_buffer(
        &mut self,
        label: &str,
        bytes: &[u8],
        usage: wgpu::BufferUsages,
    ) -> Result<AllocatedBuffer> {
        let size = bytes.len() as u64;
        let resident = self.create_buffer(label, size, BufferKind::Resident, usage)?;
        let mut staging = self.create_buffer(label, size, BufferKind::Staging, wgpu::BufferUsages::empty())?;

        staging.write(bytes).context("failed to fill upload buffer")?;
        staging.unmap();

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen buffer upload"),
        });
        encoder.copy_buffer_to_buffer(staging.buffer()?, 0, resident.buffer()?, 0, resident.size);
        self.submit_and_wait(encoder)?;

        self.destroy_buffer(staging);
        log::debug!("uploaded {size} bytes to '{label}'");
        Ok(resident)
    }

    /// Creates a sampled image holding tightly packed RGBA8 `pixels`.
    pub fn transfer_to_image(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        pixels: &[u8],
    ) -> Result<AllocatedImage> {
        let row = width as usize * 4;
        if pixels.len() != row * height as usize {
            bail!("image '{label}': expected {} bytes of RGBA8, got {}", row * height as usize, pixels.len());
        }

        let padded_row = align_to(row as u64, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64) as usize;
        let mut padded = vec![0u8; padded_row * height as usize];
        for (dst, src) in padded.chunks_exact_mut(padded_row).zip(pixels.chunks_exact(row)) {
            dst[..row].copy_from_slice(src);
        }

        let image = self.create_image(
            label,
            width,
            height,
            format,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )?;
        let mut staging = self.create_buffer(
            label,
            padded.len() as u64,
            BufferKind::Staging,
            wgpu::BufferUsages::empty(),
        )?;
        staging.write(&padded).context("failed to fill image upload buffer")?;
        staging.unmap();

        let texture = image.texture().context("image handle is empty")?;
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lumen image upload"),
        });
        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: staging.buffer()?,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row as u32),
                    rows_per_image: Some(height),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.extent,
        );
        self.submit_and_wait(encoder)?;

        self.destroy_buffer(staging);
        log::debug!("uploaded {width}x{height} {format:?} image '{label}'");
        Ok(image)
    }

    fn submit_and_wait(&self, encoder: wgpu::CommandEncoder) -> Result<()> {
        let index = self.queue.submit(std::iter::once(encoder.finish()));
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: Some(index),
                timeout: None,
            })
            .context("failed waiting for upload")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(description: &str) -> wgpu::Error {
        wgpu::Error::Validation {
            source: Box::new(std::io::Error::other(description.to_string())),
            description: description.to_string(),
        }
    }

    // ── error scopes ──

    #[test]
    fn clean_scopes_pass() {
        assert!(check_scopes(None, None).is_ok());
    }

    #[test]
    fn validation_error_fails_creation() {
        let err = check_scopes(None, Some(validation("usage MAP_WRITE with VERTEX"))).unwrap_err();
        assert_eq!(err.to_string(), "validation failed: usage MAP_WRITE with VERTEX");
    }

    #[test]
    fn out_of_memory_wins_over_validation() {
        let oom = wgpu::Error::OutOfMemory { source: Box::new(std::io::Error::other("heap")) };
        let err = check_scopes(Some(oom), Some(validation("follow-on"))).unwrap_err();
        assert!(err.to_string().starts_with("out of memory"));
    }
}
