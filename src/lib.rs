//! Small wgpu demos: a cleared window, a triangle, an indexed mesh and an
//! interactive Mandelbrot viewer driven by held keys.

pub mod cli;
pub mod input;
pub mod logging;
pub mod math;
pub mod primitives;
pub mod render;
pub mod view;
pub mod window;
