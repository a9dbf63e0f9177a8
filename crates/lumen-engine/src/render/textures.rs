use anyhow::{Context, Result};
use lumen_scene::TextureImage;

use crate::gpu::{AllocatedImage, Allocator};

/// Sampled textures, one bind group per scene texture slot.
pub struct TextureSet {
    images: Vec<AllocatedImage>,
    binds: Vec<wgpu::BindGroup>,
}

impl TextureSet {
    pub fn new(alloc: &mut Allocator, layout: &wgpu::BindGroupLayout, sources: &[TextureImage]) -> Result<Self> {
        let sampler = alloc.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen texture sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let mut images = Vec::with_capacity(sources.len());
        let mut binds = Vec::with_capacity(sources.len());
        for (slot, src) in sources.iter().enumerate() {
            let format = if src.srgb {
                wgpu::TextureFormat::Rgba8UnormSrgb
            } else {
                wgpu::TextureFormat::Rgba8Unorm
            };
            let image = alloc
                .transfer_to_image(&format!("texture #{slot}"), src.width, src.height, format, &src.pixels)
                .with_context(|| format!("failed to upload texture #{slot}"))?;

            binds.push(alloc.device().create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("lumen texture bind group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&image.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            }));
            images.push(image);
        }

        log::info!("uploaded {} textures", images.len());
        Ok(Self { images, binds })
    }

    /// Bind group for `slot`, falling back to slot 0 when out of range.
    pub fn bind(&self, slot: u32) -> Option<&wgpu::BindGroup> {
        match self.binds.get(slot as usize) {
            Some(b) => Some(b),
            None => {
                log::warn!("texture slot {slot} out of range ({} textures)", self.binds.len());
                self.binds.first()
            }
        }
    }

    pub fn destroy(self, alloc: &mut Allocator) {
        drop(self.binds);
        for image in self.images {
            alloc.destroy_image(image);
        }
    }
}
