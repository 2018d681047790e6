//! GPU bootstrap and the small helpers every demo pipeline shares.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use wgpu::{BindingType, BufferBindingType, ShaderStages, util::DeviceExt};
use winit::{dpi::PhysicalSize, window::Window};

mod fractal;
mod mesh;

pub use fractal::FractalRenderer;
pub use mesh::MeshRenderer;

pub struct GpuContext {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Format pipelines render into; the linear view of the surface texture.
    pub target_format: wgpu::TextureFormat,
    pub size: PhysicalSize<u32>,
}

/// Picks the surface format and a linear (non-sRGB) format to render through.
///
/// Colours leave the fragment shaders unchanged, the way a plain GL default
/// framebuffer stores them. A linear format is used directly when offered,
/// otherwise the first sRGB format is viewed through its linear twin.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Option<(wgpu::TextureFormat, wgpu::TextureFormat)> {
    if let Some(linear) = formats.iter().copied().find(|f| !f.is_srgb()) {
        return Some((linear, linear));
    }
    let first = formats.first().copied()?;
    Some((first, first.remove_srgb_suffix()))
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::default();
        log::debug!("created wgpu instance");

        let surface = instance
            .create_surface(window)
            .context("failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("failed to find an appropriate adapter")?;
        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("fractal_viewer device"),
                ..Default::default()
            })
            .await
            .context("failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let (surface_format, target_format) = choose_surface_format(&surface_caps.formats)
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            // Blocks present() until the next vblank
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: if target_format == surface_format {
                vec![]
            } else {
                vec![target_format]
            },
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?} (rendering as {:?})",
            config.width,
            config.height,
            config.format,
            target_format
        );

        Ok(GpuContext {
            instance,
            surface,
            device,
            queue,
            config,
            target_format,
            size,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            log::debug!("surface resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Clears the next swapchain image, lets `draw` record into the pass, and presents.
    pub fn render_pass<F>(&self, clear: wgpu::Color, draw: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>),
    {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.target_format),
                ..Default::default()
            });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
            });

            draw(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    pub fn create_shader(&self, label: &str, source: &str) -> Result<wgpu::ShaderModule> {
        compile_shader(&self.device, label, source)
    }

    pub fn create_pipeline(&self, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(desc.label),
                bind_group_layouts: &[desc.bind_group_layout],
                immediate_size: 0,
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: desc.shader,
                    entry_point: Some("vs_main"),
                    buffers: &[desc.vertex_layout],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: desc.shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        // Must match the view created in render_pass
                        format: self.target_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: desc.cull_mode,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview_mask: None,
                cache: None,
            })
    }
}

/// Compiles WGSL, logging every diagnostic, and fails if validation reports an error.
///
/// The module is created inside a validation error scope so a bad shader comes
/// back as an `Err` instead of reaching the device's uncaptured-error handler.
pub fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let scope_error = pollster::block_on(scope.pop());

    let info = pollster::block_on(module.get_compilation_info());
    let mut errors = Vec::new();
    for message in &info.messages {
        let at = message
            .location
            .as_ref()
            .map(|loc| format!("{}:{}", loc.line_number, loc.line_position))
            .unwrap_or_else(|| "?".to_string());
        match message.message_type {
            wgpu::CompilationMessageType::Error => {
                log::error!("{label} {at}: {}", message.message);
                errors.push(format!("{at}: {}", message.message));
            }
            wgpu::CompilationMessageType::Warning => {
                log::warn!("{label} {at}: {}", message.message)
            }
            wgpu::CompilationMessageType::Info => {
                log::info!("{label} {at}: {}", message.message)
            }
        }
    }

    if let Some(err) = scope_error {
        if errors.is_empty() {
            log::error!("{label}: {err}");
            errors.push(err.to_string());
        }
    }
    if !errors.is_empty() {
        bail!("shader `{label}` failed to compile:\n{}", errors.join("\n"));
    }
    log::debug!("shader `{label}` compiled");
    Ok(module)
}

pub struct PipelineDesc<'a> {
    pub label: &'a str,
    pub shader: &'a wgpu::ShaderModule,
    pub bind_group_layout: &'a wgpu::BindGroupLayout,
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub cull_mode: Option<wgpu::Face>,
}

/// A single uniform buffer bound at group 0, binding 0.
pub struct UniformBlock {
    buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl UniformBlock {
    pub fn new<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        initial: &T,
        visibility: ShaderStages,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(label),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn write<T: bytemuck::Pod>(&self, queue: &wgpu::Queue, value: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(value));
    }
}

#[cfg(test)]
mod tests {
    use wgpu::naga;

    use super::*;

    /// Device without a surface; `None` when the machine offers no adapter at all.
    fn headless_device() -> Option<wgpu::Device> {
        pollster::block_on(async {
            let instance = wgpu::Instance::default();
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            let (device, _queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()?;
            Some(device)
        })
    }

    fn parse_and_validate(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source).expect("wgsl parses");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .expect("wgsl validates");
        module
    }

    /// `(span, [(member, offset)])` of the named struct.
    fn struct_layout(module: &naga::Module, name: &str) -> (u32, Vec<(String, u32)>) {
        module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(n), naga::TypeInner::Struct { members, span }) if n == name => Some((
                    *span,
                    members
                        .iter()
                        .map(|m| (m.name.clone().unwrap_or_default(), m.offset))
                        .collect(),
                )),
                _ => None,
            })
            .unwrap_or_else(|| panic!("struct {name} not found"))
    }

    #[test]
    fn fractal_shader_uniforms_match_rust_layout() {
        let module = parse_and_validate(fractal::MANDELBROT_WGSL);
        let (span, members) = struct_layout(&module, "Uniforms");

        assert_eq!(span as usize, std::mem::size_of::<crate::primitives::FractalUniforms>());
        assert_eq!(span, 32);
        let offsets: Vec<(&str, u32)> = members.iter().map(|(n, o)| (n.as_str(), *o)).collect();
        assert_eq!(
            &offsets[..4],
            &[("resolution", 0), ("center", 8), ("scale", 16), ("max_iterations", 20)]
        );
    }

    #[test]
    fn mesh_shader_uniforms_match_rust_layout() {
        let module = parse_and_validate(mesh::MESH_WGSL);
        let (span, members) = struct_layout(&module, "Uniforms");

        assert_eq!(span as usize, std::mem::size_of::<crate::primitives::MeshUniforms>());
        assert_eq!(members[0], ("scale".to_string(), 0));
    }

    #[test]
    fn linear_surface_format_is_preferred() {
        use wgpu::TextureFormat::*;

        assert_eq!(
            choose_surface_format(&[Bgra8UnormSrgb, Bgra8Unorm]),
            Some((Bgra8Unorm, Bgra8Unorm))
        );
        assert_eq!(
            choose_surface_format(&[Rgba8UnormSrgb]),
            Some((Rgba8UnormSrgb, Rgba8Unorm))
        );
        assert_eq!(choose_surface_format(&[]), None);
    }

    #[test]
    fn invalid_wgsl_is_an_error_not_a_panic() {
        let Some(device) = headless_device() else {
            eprintln!("no adapter available, skipping");
            return;
        };

        let err = compile_shader(&device, "broken", "fn oops( {").unwrap_err();
        assert!(err.to_string().contains("shader `broken` failed to compile"));

        // The device stays usable for the real shaders afterwards.
        assert!(compile_shader(&device, "mandelbrot", fractal::MANDELBROT_WGSL).is_ok());
        assert!(compile_shader(&device, "mesh", mesh::MESH_WGSL).is_ok());
    }
}
