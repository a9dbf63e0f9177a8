use anyhow::{Context, Result};
use lumen_scene::{ObjectTransform, PosColVertex, RenderState, TextureImage, VertexSpan};

use crate::core::{FrameCtx, SwapchainEvent};
use crate::frame::{CAMERA_UNIFORM_SIZE, Workspace, WorkspaceLayouts};
use crate::gpu::{AllocatedBuffer, AllocatedImage, Allocator};

use super::background::BackgroundPipeline;
use super::lines::LinesPipeline;
use super::objects::ObjectsPipeline;
use super::textures::TextureSet;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.8, g: 0.5, b: 0.3, a: 1.0 };

/// One draw recorded by the objects pass.
#[derive(Debug, Clone, Copy)]
struct Draw {
    span: VertexSpan,
    texture: u32,
}

/// Draws a [`RenderState`] into the acquired surface image.
///
/// Owns every GPU resource the viewer needs: pipelines, the static vertex
/// buffer, textures, the depth image and one [`Workspace`] per ring slot.
/// Resources go back through the allocator on drop.
pub struct FrameRenderer {
    alloc: Allocator,

    background: BackgroundPipeline,
    objects: ObjectsPipeline,
    lines: LinesPipeline,

    vertices: Option<AllocatedBuffer>,
    textures: Option<TextureSet>,
    depth: Option<AllocatedImage>,
    workspaces: Vec<Workspace>,

    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,

    transforms: Vec<ObjectTransform>,
    draws: Vec<Draw>,
    line_vertices: Vec<PosColVertex>,
}

impl FrameRenderer {
    /// Creates pipelines for the swapchain formats and uploads the static scene data.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        swapchain: &SwapchainEvent,
        state: &RenderState,
        textures: &[TextureImage],
        workspaces: usize,
    ) -> Result<Self> {
        let mut alloc = Allocator::new(device, queue);

        let background = BackgroundPipeline::new(device, swapchain.format, swapchain.depth_format);
        let objects = ObjectsPipeline::new(device, swapchain.format, swapchain.depth_format);
        let lines = LinesPipeline::new(device, swapchain.format, swapchain.depth_format);

        let meshes = state.meshes();
        let vertices = alloc
            .transfer_to_buffer(
                "scene vertices",
                bytemuck::cast_slice(&meshes.vertices),
                wgpu::BufferUsages::VERTEX,
            )
            .context("failed to upload scene vertices")?;
        log::info!(
            "uploaded {} vertices ({} bytes)",
            meshes.vertices.len(),
            meshes.byte_len()
        );

        let textures = TextureSet::new(&mut alloc, &objects.texture_layout, textures)?;

        let layouts = WorkspaceLayouts {
            camera: &lines.camera_layout,
            world: &objects.world_layout,
            transforms: &objects.transforms_layout,
        };
        let workspaces = (0..workspaces)
            .map(|slot| Workspace::new(&mut alloc, layouts, slot))
            .collect::<Result<Vec<_>>>()
            .context("failed to create frame workspaces")?;

        let mut renderer = Self {
            alloc,
            background,
            objects,
            lines,
            vertices: Some(vertices),
            textures: Some(textures),
            depth: None,
            workspaces,
            color_format: swapchain.format,
            depth_format: swapchain.depth_format,
            transforms: Vec::new(),
            draws: Vec::new(),
            line_vertices: Vec::new(),
        };
        renderer.recreate_depth(swapchain.width, swapchain.height)?;
        Ok(renderer)
    }

    /// Whether the pipelines were built for these formats.
    pub fn matches(&self, swapchain: &SwapchainEvent) -> bool {
        self.color_format == swapchain.format && self.depth_format == swapchain.depth_format
    }

    /// Recreates the depth image at the new swapchain size.
    pub fn on_swapchain(&mut self, swapchain: &SwapchainEvent) -> Result<()> {
        self.wait_idle()?;
        self.recreate_depth(swapchain.width, swapchain.height)
    }

    fn recreate_depth(&mut self, width: u32, height: u32) -> Result<()> {
        if let Some(old) = self.depth.take() {
            self.alloc.destroy_image(old);
        }
        let depth = self.alloc.create_image(
            "depth",
            width,
            height,
            self.depth_format,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )?;
        log::debug!("depth image {width}x{height} {:?}", self.depth_format);
        self.depth = Some(depth);
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        self.alloc
            .device()
            .poll(wgpu::PollType::wait_indefinitely())
            .context("failed waiting for device idle")?;
        Ok(())
    }

    /// Traverses `state` and records, submits and retires one frame.
    pub fn render(&mut self, ctx: &mut FrameCtx<'_, '_>, state: &mut RenderState) -> Result<()> {
        let view = state.prepare_frame();
        let clip_from_world = view.clip_from_world.to_cols_array();
        let time = view.time;
        let world = *view.world;

        self.transforms.clear();
        self.draws.clear();
        for inst in view.instances {
            self.transforms.push(inst.transform);
            self.draws.push(Draw { span: inst.span, texture: inst.texture });
        }
        state.bounds_lines(&mut self.line_vertices);

        let workspace = self
            .workspaces
            .get_mut(ctx.workspace)
            .with_context(|| format!("no workspace for ring slot {}", ctx.workspace))?;
        workspace.begin(self.alloc.device())?;

        // ── upload ──
        let transform_bytes: &[u8] = bytemuck::cast_slice(&self.transforms);
        let line_bytes: &[u8] = bytemuck::cast_slice(&self.line_vertices);
        workspace.grow_transforms(&mut self.alloc, &self.objects.transforms_layout, transform_bytes.len() as u64)?;
        workspace.grow_lines(&mut self.alloc, line_bytes.len() as u64)?;

        workspace.camera.write(bytemuck::cast_slice(&clip_from_world))?;
        workspace.world.write(bytemuck::bytes_of(&world))?;
        workspace.transforms.write(transform_bytes)?;
        workspace.lines.write(line_bytes)?;

        let mut encoder = self
            .alloc
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("lumen frame encoder") });

        workspace.camera.record_copy(&mut encoder, CAMERA_UNIFORM_SIZE)?;
        workspace.world.record_copy(&mut encoder, std::mem::size_of_val(&world) as u64)?;
        workspace.transforms.record_copy(&mut encoder, transform_bytes.len() as u64)?;
        workspace.lines.record_copy(&mut encoder, line_bytes.len() as u64)?;

        // ── draw ──
        let depth = self.depth.as_ref().context("depth image missing")?;
        let vertices = self.vertices.as_ref().context("vertex buffer missing")?.buffer()?;
        let textures = self.textures.as_ref().context("texture set missing")?;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: ctx.target,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.background.draw(&mut pass, time);

            if !self.draws.is_empty() {
                pass.set_pipeline(self.objects.pipeline());
                pass.set_vertex_buffer(0, vertices.slice(..));
                pass.set_bind_group(0, &workspace.world_bind, &[]);
                pass.set_bind_group(1, &workspace.transforms_bind, &[]);

                for (i, draw) in self.draws.iter().enumerate() {
                    let Some(texture) = textures.bind(draw.texture) else { continue };
                    pass.set_bind_group(2, texture, &[]);
                    let instance = i as u32;
                    pass.draw(draw.span.range(), instance..instance + 1);
                }
            }

            if !self.line_vertices.is_empty() {
                pass.set_pipeline(self.lines.pipeline());
                pass.set_bind_group(0, &workspace.camera_bind, &[]);
                pass.set_vertex_buffer(0, workspace.lines.resident()?.slice(..line_bytes.len() as u64));
                pass.draw(0..self.line_vertices.len() as u32, 0..1);
            }
        }

        ctx.submit(encoder.finish());
        workspace.remap();
        Ok(())
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.wait_idle() {
            log::error!("{e:#}");
        }
        for workspace in self.workspaces.drain(..) {
            workspace.destroy(&mut self.alloc);
        }
        if let Some(textures) = self.textures.take() {
            textures.destroy(&mut self.alloc);
        }
        if let Some(vertices) = self.vertices.take() {
            self.alloc.destroy_buffer(vertices);
        }
        if let Some(depth) = self.depth.take() {
            self.alloc.destroy_image(depth);
        }
        log::debug!(
            "renderer released; {} buffers and {} images still live",
            self.alloc.live_buffers(),
            self.alloc.live_images()
        );
    }
}
