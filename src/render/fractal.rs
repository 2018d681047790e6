use anyhow::Result;
use wgpu::{ShaderStages, util::DeviceExt};

use super::{GpuContext, PipelineDesc, UniformBlock};
use crate::{
    primitives::{FractalUniforms, QUAD_INDICES, QUAD_VERTICES, QuadVertex},
    view::ViewState,
};

pub(crate) const MANDELBROT_WGSL: &str = include_str!("../shaders/mandelbrot.wgsl");

/// Full-screen quad whose fragment shader evaluates the Mandelbrot escape time.
pub struct FractalRenderer {
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniforms: UniformBlock,
}

impl FractalRenderer {
    pub fn new(gpu: &GpuContext, view: &ViewState) -> Result<Self> {
        let shader = gpu.create_shader("mandelbrot", MANDELBROT_WGSL)?;

        let initial = FractalUniforms::new(view, gpu.config.width, gpu.config.height);
        let uniforms = UniformBlock::new(
            &gpu.device,
            "Fractal Uniforms",
            &initial,
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        );

        let render_pipeline = gpu.create_pipeline(PipelineDesc {
            label: "Fractal Pipeline",
            shader: &shader,
            bind_group_layout: uniforms.layout(),
            vertex_layout: QuadVertex::desc(),
            cull_mode: Some(wgpu::Face::Back),
        });

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Vertex Buffer"),
                contents: bytemuck::cast_slice(QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Quad Index Buffer"),
                contents: bytemuck::cast_slice(QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            });
        log::info!("fractal pipeline created");

        Ok(Self {
            render_pipeline,
            vertex_buffer,
            index_buffer,
            uniforms,
        })
    }

    /// Uploads the view for the next frame at the current surface size.
    pub fn update(&self, gpu: &GpuContext, view: &ViewState) {
        let data = FractalUniforms::new(view, gpu.config.width, gpu.config.height);
        self.uniforms.write(&gpu.queue, &data);
    }

    pub fn render(&self, gpu: &GpuContext) -> Result<(), wgpu::SurfaceError> {
        gpu.render_pass(wgpu::Color::BLACK, |pass| {
            pass.set_pipeline(&self.render_pipeline);
            pass.set_bind_group(0, self.uniforms.bind_group(), &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
        })
    }
}
