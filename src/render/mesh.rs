use anyhow::Result;
use wgpu::{ShaderStages, util::DeviceExt};

use super::{GpuContext, PipelineDesc, UniformBlock};
use crate::primitives::{ColorVertex, MeshUniforms};

pub(crate) const MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");

struct IndexData {
    buffer: wgpu::Buffer,
    count: u32,
}

/// Static per-vertex-coloured geometry, drawn indexed when indices are given.
pub struct MeshRenderer {
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    indices: Option<IndexData>,
    uniforms: UniformBlock,
}

impl MeshRenderer {
    pub fn new(
        gpu: &GpuContext,
        label: &str,
        vertices: &[ColorVertex],
        indices: Option<&[u16]>,
        scale: f32,
    ) -> Result<Self> {
        let shader = gpu.create_shader("mesh", MESH_WGSL)?;

        let uniforms = UniformBlock::new(
            &gpu.device,
            "Mesh Uniforms",
            &MeshUniforms::new(scale),
            ShaderStages::VERTEX,
        );

        // The pyramid mixes windings, so nothing is culled
        let render_pipeline = gpu.create_pipeline(PipelineDesc {
            label,
            shader: &shader,
            bind_group_layout: uniforms.layout(),
            vertex_layout: ColorVertex::desc(),
            cull_mode: None,
        });

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let indices = indices.map(|indices| IndexData {
            buffer: gpu
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Mesh Index Buffer"),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            count: indices.len() as u32,
        });
        log::info!(
            "{label} created: {} vertices, {} indices",
            vertices.len(),
            indices.as_ref().map_or(0, |i| i.count)
        );

        Ok(Self {
            render_pipeline,
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            indices,
            uniforms,
        })
    }

    pub fn render(&self, gpu: &GpuContext) -> Result<(), wgpu::SurfaceError> {
        gpu.render_pass(wgpu::Color::BLACK, |pass| {
            pass.set_pipeline(&self.render_pipeline);
            pass.set_bind_group(0, self.uniforms.bind_group(), &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            match &self.indices {
                Some(indices) => {
                    pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..indices.count, 0, 0..1);
                }
                None => pass.draw(0..self.vertex_count, 0..1),
            }
        })
    }
}
