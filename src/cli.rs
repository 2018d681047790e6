use anyhow::{Result, ensure};
use clap::{Args, Parser, Subcommand};

use crate::{
    math::Point,
    view::{DEFAULT_CENTER, DEFAULT_MAX_ITERATIONS, DEFAULT_SPAN, ViewState},
};

/// Small GPU demos ending in an interactive Mandelbrot viewer.
#[derive(Debug, Parser)]
#[command(name = "fractal_viewer", version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pan/zoom the Mandelbrot set (W/S zoom, arrows pan, Esc quits)
    Mandelbrot(ViewerConfig),
    /// Open a window and clear it to a solid colour
    Clear(WindowArgs),
    /// Draw a single triangle
    Triangle(WindowArgs),
    /// Draw three coloured triangles from an index buffer
    Pyramid(PyramidArgs),
}

#[derive(Debug, Clone, Args)]
pub struct WindowArgs {
    #[arg(long, default_value_t = 500)]
    pub width: u32,
    #[arg(long, default_value_t = 500)]
    pub height: u32,
}

#[derive(Debug, Clone, Args)]
pub struct PyramidArgs {
    #[command(flatten)]
    pub window: WindowArgs,
    /// Vertex position multiplier
    #[arg(long, default_value_t = 1.5)]
    pub scale: f32,
}

/// Startup framing of the Mandelbrot viewer.
#[derive(Debug, Clone, Args)]
pub struct ViewerConfig {
    #[arg(long, default_value_t = 800)]
    pub width: u32,
    #[arg(long, default_value_t = 800)]
    pub height: u32,
    #[arg(long, default_value_t = DEFAULT_CENTER.x, allow_negative_numbers = true)]
    pub center_x: f32,
    #[arg(long, default_value_t = DEFAULT_CENTER.y, allow_negative_numbers = true)]
    pub center_y: f32,
    /// Plane units per pixel [default: 3.5 / width]
    #[arg(long)]
    pub scale: Option<f32>,
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            center_x: DEFAULT_CENTER.x,
            center_y: DEFAULT_CENTER.y,
            scale: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ViewerConfig {
    pub fn view_state(&self) -> Result<ViewState> {
        ensure!(self.width > 0 && self.height > 0, "window size must be non-zero");
        ensure!(self.max_iterations > 0, "max iterations must be positive");
        ensure!(
            self.max_iterations <= i32::MAX as u32,
            "max iterations must fit in a signed 32-bit integer"
        );
        ensure!(
            self.center_x.is_finite() && self.center_y.is_finite(),
            "center must be finite"
        );

        let scale = self.scale.unwrap_or(DEFAULT_SPAN / self.width as f32);
        ensure!(
            scale.is_finite() && scale > 0.0,
            "scale must be positive, got {scale}"
        );

        Ok(ViewState {
            center: Point::new(self.center_x, self.center_y),
            scale,
            max_iterations: self.max_iterations,
        })
    }
}
