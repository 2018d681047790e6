use crate::view::ViewState;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    position: [f32; 2], // [x, y] in clip space
}

// Full-screen quad, shared corners are indexed
pub const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] }, // 0: Bottom Left
    QuadVertex { position: [1.0, -1.0] },  // 1: Bottom Right
    QuadVertex { position: [-1.0, 1.0] },  // 2: Top Left
    QuadVertex { position: [1.0, 1.0] },   // 3: Top Right
];

// Both triangles wind counterclockwise
pub const QUAD_INDICES: &[u16] = &[
    0, 1, 2, // lower left
    2, 1, 3, // upper right
];

impl QuadVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x2,
            }],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            // 24 bytes: position then color
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const TRIANGLE_COLOR: [f32; 3] = [0.8, 0.3, 0.92];

pub const TRIANGLE_VERTICES: &[ColorVertex] = &[
    ColorVertex { position: [-0.5, -0.5, 0.0], color: TRIANGLE_COLOR }, // lower left
    ColorVertex { position: [0.5, -0.5, 0.0], color: TRIANGLE_COLOR },  // lower right
    ColorVertex { position: [0.0, 0.5, 0.0], color: TRIANGLE_COLOR },   // top
];

//     5
//    ---
//   1   3
//  --- ---
// 0---2---4
pub const PYRAMID_VERTICES: &[ColorVertex] = &[
    ColorVertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0] },
    ColorVertex { position: [-0.25, 0.0, 0.0], color: [0.0, 1.0, 0.0] },
    ColorVertex { position: [0.0, -0.5, 0.0], color: [0.0, 0.0, 1.0] },
    ColorVertex { position: [0.25, 0.0, 0.0], color: [1.0, 1.0, 0.0] },
    ColorVertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 1.0] },
    ColorVertex { position: [0.0, 0.5, 0.0], color: [1.0, 0.0, 1.0] },
];

pub const PYRAMID_INDICES: &[u16] = &[
    0, 1, 2, // lower left
    2, 3, 4, // lower right
    1, 5, 3, // top
];

/// Fractal shader inputs. Must match `Uniforms` in `mandelbrot.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FractalUniforms {
    pub resolution: [f32; 2], // Offset 0  (8 bytes)
    pub center: [f32; 2],     // Offset 8  (8 bytes)
    pub scale: f32,           // Offset 16 (4 bytes)
    pub max_iterations: i32,  // Offset 20 (4 bytes)
    pub _padding: [u32; 2],   // Offset 24 (8 bytes)
                              // Total Size: 32 bytes
}

impl FractalUniforms {
    pub fn new(view: &ViewState, width: u32, height: u32) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            center: view.center.to_array(),
            scale: view.scale,
            max_iterations: i32::try_from(view.max_iterations).unwrap_or(i32::MAX),
            _padding: [0; 2],
        }
    }
}

/// Mesh shader inputs. Must match `Uniforms` in `mesh.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniforms {
    pub scale: f32,
    pub _padding: [f32; 3],
}

impl MeshUniforms {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            _padding: [0.0; 3],
        }
    }
}
