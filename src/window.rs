use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    input::KeyboardState,
    primitives::{PYRAMID_INDICES, PYRAMID_VERTICES, TRIANGLE_VERTICES},
    render::{FractalRenderer, GpuContext, MeshRenderer},
    view::{ActionState, LoopControl, ViewAction, ViewState, apply_held},
};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.15,
    b: 0.75,
    a: 1.0,
};

/// Which demo to run, with its startup parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Demo {
    Clear,
    Triangle,
    Pyramid { scale: f32 },
    Mandelbrot { view: ViewState },
}

impl Demo {
    pub fn title(&self) -> &'static str {
        match self {
            Demo::Clear => "Window",
            Demo::Triangle => "Triangle",
            Demo::Pyramid { .. } => "Pyramid",
            Demo::Mandelbrot { .. } => "Mandelbrot Set",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    Terminating,
}

enum Scene {
    Clear,
    Mesh(MeshRenderer),
    Fractal {
        renderer: FractalRenderer,
        view: ViewState,
    },
}

struct Running {
    // Dropped before the window
    scene: Scene,
    gpu: GpuContext,
    window: Arc<Window>,
}

pub struct App {
    demo: Demo,
    size: PhysicalSize<u32>,
    phase: Phase,
    keys: KeyboardState,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

/// Opens the window and blocks until the demo quits.
pub fn run(demo: Demo, size: PhysicalSize<u32>) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(demo, size);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;

    app.finish()
}

impl App {
    pub fn new(demo: Demo, size: PhysicalSize<u32>) -> Self {
        Self {
            demo,
            size,
            phase: Phase::Initializing,
            keys: KeyboardState::default(),
            running: None,
            error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Surfaces an initialization failure recorded inside the event loop.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(self.demo.title())
                    .with_inner_size(self.size),
            )
            .context("unable to create window")?;
        let window = Arc::new(window);
        log::info!("window created: {}", self.demo.title());

        let gpu = pollster::block_on(GpuContext::new(window.clone()))?;

        let scene = match self.demo {
            Demo::Clear => Scene::Clear,
            Demo::Triangle => Scene::Mesh(MeshRenderer::new(
                &gpu,
                "Triangle",
                TRIANGLE_VERTICES,
                None,
                1.0,
            )?),
            Demo::Pyramid { scale } => Scene::Mesh(MeshRenderer::new(
                &gpu,
                "Pyramid",
                PYRAMID_VERTICES,
                Some(PYRAMID_INDICES),
                scale,
            )?),
            Demo::Mandelbrot { view } => {
                log::info!("Controls:");
                log::info!("  - W / S: zoom in / out");
                log::info!("  - Arrow keys: pan");
                log::info!("  - Escape: quit");
                Scene::Fractal {
                    renderer: FractalRenderer::new(&gpu, &view)?,
                    view,
                }
            }
        };

        Ok(Running { scene, gpu, window })
    }

    fn terminate(&mut self, event_loop: &ActiveEventLoop, reason: &str) {
        self.shut_down(reason);
        event_loop.exit();
    }

    fn shut_down(&mut self, reason: &str) {
        if self.phase != Phase::Terminating {
            log::info!("{reason}, exiting");
            self.phase = Phase::Terminating;
        }
        if self.running.take().is_some() {
            log::debug!("gpu resources released");
        }
    }

    /// Records a fatal error for `finish`; `main` reports it.
    fn fail(&mut self, err: anyhow::Error) {
        self.error = Some(err);
        self.shut_down("fatal error");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = &mut self.running else {
            return;
        };

        let control = match &mut running.scene {
            Scene::Fractal { renderer, view } => {
                let tick = apply_held(view, &self.keys);
                if tick.changed {
                    log::debug!(
                        "center ({}, {}) scale {:e} depth {}",
                        view.center.x,
                        view.center.y,
                        view.scale,
                        view.depth_at_center()
                    );
                }
                renderer.update(&running.gpu, view);
                tick.control
            }
            _ if self.keys.is_down(ViewAction::Quit) => LoopControl::Quit,
            _ => LoopControl::Continue,
        };

        if control == LoopControl::Quit {
            self.terminate(event_loop, "quit key pressed");
            return;
        }

        let result = match &running.scene {
            Scene::Clear => running.gpu.render_pass(CLEAR_COLOR, |_| {}),
            Scene::Mesh(renderer) => renderer.render(&running.gpu),
            Scene::Fractal { renderer, .. } => renderer.render(&running.gpu),
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = running.gpu.size;
                running.gpu.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(anyhow!("surface out of memory"));
                event_loop.exit();
            }
            Err(e) => log::warn!("frame skipped: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.phase != Phase::Initializing {
            return;
        }

        match self.init(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
                self.phase = Phase::Running;
            }
            Err(err) => {
                self.fail(err.context("initialization failed"));
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.terminate(event_loop, "close requested"),
            WindowEvent::KeyboardInput { event, .. } => self.keys.handle_key_event(&event),
            WindowEvent::Focused(focused) => self.keys.focus_changed(focused),
            WindowEvent::Resized(physical_size) => {
                if let Some(running) = &mut self.running {
                    running.gpu.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // One frame per loop turn; present() paces it to the display
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.phase = Phase::Terminating;
        self.running = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_starts_initializing_without_resources() {
        let app = App::new(Demo::Clear, PhysicalSize::new(500, 500));
        assert_eq!(app.phase(), Phase::Initializing);
        assert!(app.finish().is_ok());
    }

    #[test]
    fn failure_is_returned_once_and_ends_the_loop() {
        let mut app = App::new(Demo::Triangle, PhysicalSize::new(500, 500));
        app.fail(anyhow!("no adapter").context("initialization failed"));

        assert_eq!(app.phase(), Phase::Terminating);
        let err = app.finish().unwrap_err();
        assert_eq!(format!("{err:#}"), "initialization failed: no adapter");
    }

    #[test]
    fn titles() {
        assert_eq!(Demo::Triangle.title(), "Triangle");
        assert_eq!(
            Demo::Mandelbrot {
                view: ViewState::framing(800)
            }
            .title(),
            "Mandelbrot Set"
        );
    }
}
