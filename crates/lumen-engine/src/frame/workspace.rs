use anyhow::{Context, Result};
use lumen_scene::WorldUniform;

use crate::gpu::{AllocatedBuffer, Allocator};

use super::pair::{PAGE_SIZE, StagedPair};

/// Size of the clip-from-world matrix uniform.
pub const CAMERA_UNIFORM_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Bind group layouts a workspace binds its resident buffers with.
#[derive(Clone, Copy)]
pub struct WorkspaceLayouts<'a> {
    pub camera: &'a wgpu::BindGroupLayout,
    pub world: &'a wgpu::BindGroupLayout,
    pub transforms: &'a wgpu::BindGroupLayout,
}

/// Per-frame mutable GPU data for one ring slot.
pub struct Workspace {
    pub camera: StagedPair<AllocatedBuffer>,
    pub camera_bind: wgpu::BindGroup,

    pub world: StagedPair<AllocatedBuffer>,
    pub world_bind: wgpu::BindGroup,

    pub transforms: StagedPair<AllocatedBuffer>,
    pub transforms_bind: wgpu::BindGroup,

    pub lines: StagedPair<AllocatedBuffer>,
}

impl Workspace {
    pub fn new(alloc: &mut Allocator, layouts: WorkspaceLayouts<'_>, slot: usize) -> Result<Self> {
        let camera = StagedPair::new(
            alloc,
            &format!("camera #{slot}"),
            CAMERA_UNIFORM_SIZE,
            wgpu::BufferUsages::UNIFORM,
        )?;
        let world = StagedPair::new(
            alloc,
            &format!("world #{slot}"),
            std::mem::size_of::<WorldUniform>() as u64,
            wgpu::BufferUsages::UNIFORM,
        )?;
        let transforms = StagedPair::new(
            alloc,
            &format!("transforms #{slot}"),
            PAGE_SIZE,
            wgpu::BufferUsages::STORAGE,
        )?;
        let lines = StagedPair::new(
            alloc,
            &format!("lines #{slot}"),
            PAGE_SIZE,
            wgpu::BufferUsages::VERTEX,
        )?;

        let device = alloc.device();
        let camera_bind = bind_buffer(device, layouts.camera, camera.resident()?, "lumen camera bind group")?;
        let world_bind = bind_buffer(device, layouts.world, world.resident()?, "lumen world bind group")?;
        let transforms_bind =
            bind_buffer(device, layouts.transforms, transforms.resident()?, "lumen transforms bind group")?;

        Ok(Self {
            camera,
            camera_bind,
            world,
            world_bind,
            transforms,
            transforms_bind,
            lines,
        })
    }

    /// Makes every staging buffer writable again. Call after the slot's fence.
    pub fn begin(&mut self, device: &wgpu::Device) -> Result<()> {
        self.camera.finish_map(device)?;
        self.world.finish_map(device)?;
        self.transforms.finish_map(device)?;
        self.lines.finish_map(device)?;
        Ok(())
    }

    /// Grows the transform storage for `needed` bytes and rebinds it.
    pub fn grow_transforms(
        &mut self,
        alloc: &mut Allocator,
        layout: &wgpu::BindGroupLayout,
        needed: u64,
    ) -> Result<()> {
        if self.transforms.ensure_capacity(alloc, needed)? {
            self.transforms_bind = bind_buffer(
                alloc.device(),
                layout,
                self.transforms.resident()?,
                "lumen transforms bind group",
            )?;
        }
        Ok(())
    }

    pub fn grow_lines(&mut self, alloc: &mut Allocator, needed: u64) -> Result<()> {
        self.lines.ensure_capacity(alloc, needed)?;
        Ok(())
    }

    /// Requests staging mappings back once this frame's copies complete.
    pub fn remap(&mut self) {
        self.camera.remap();
        self.world.remap();
        self.transforms.remap();
        self.lines.remap();
    }

    pub fn destroy(self, alloc: &mut Allocator) {
        self.camera.destroy(alloc);
        self.world.destroy(alloc);
        self.transforms.destroy(alloc);
        self.lines.destroy(alloc);
    }
}

fn bind_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> Result<wgpu::BindGroup> {
    let size = wgpu::BufferSize::new(buffer.size()).context("cannot bind an empty buffer")?;
    Ok(device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: Some(size),
            }),
        }],
    }))
}
