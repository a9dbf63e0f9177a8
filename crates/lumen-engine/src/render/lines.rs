use super::common::{buffer_layout, depth_test, pos_col_layout, shader};

/// World-space line list drawn over the scene, depth tested.
pub struct LinesPipeline {
    pipeline: wgpu::RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
}

impl LinesPipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Self {
        let module = shader(device, "lumen lines shader", include_str!("shaders/lines.wgsl"));

        let camera_layout = buffer_layout(
            device,
            "lumen camera bgl",
            wgpu::ShaderStages::VERTEX,
            wgpu::BufferBindingType::Uniform,
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen lines pipeline layout"),
            bind_group_layouts: &[&camera_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen lines pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[pos_col_layout()],
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
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(depth_test(depth_format)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self { pipeline, camera_layout }
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}
