use super::common::{buffer_layout, depth_test, pos_nor_tex_layout, shader, texture_layout};

/// Lit, textured triangles.
///
/// Bind groups: world constants (0), transform storage (1), texture (2).
/// Each draw selects its transform with the instance index.
pub struct ObjectsPipeline {
    pipeline: wgpu::RenderPipeline,
    pub world_layout: wgpu::BindGroupLayout,
    pub transforms_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl ObjectsPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let module = shader(device, "lumen objects shader", include_str!("shaders/objects.wgsl"));

        let world_layout = buffer_layout(
            device,
            "lumen world bgl",
            wgpu::ShaderStages::FRAGMENT,
            wgpu::BufferBindingType::Uniform,
        );
        let transforms_layout = buffer_layout(
            device,
            "lumen transforms bgl",
            wgpu::ShaderStages::VERTEX,
            wgpu::BufferBindingType::Storage { read_only: true },
        );
        let texture_layout = texture_layout(device);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen objects pipeline layout"),
            bind_group_layouts: &[&world_layout, &transforms_layout, &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen objects pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[pos_nor_tex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_test(depth_format)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            world_layout,
            transforms_layout,
            texture_layout,
        }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}
