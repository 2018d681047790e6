use anyhow::Result;
use clap::Parser;
use winit::dpi::PhysicalSize;

use fractal_viewer::{
    cli::{Cli, Command, ViewerConfig},
    logging,
    window::{self, Demo},
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let (demo, size) = match cli.command.unwrap_or(Command::Mandelbrot(ViewerConfig::default())) {
        Command::Mandelbrot(config) => {
            let view = config.view_state()?;
            (Demo::Mandelbrot { view }, PhysicalSize::new(config.width, config.height))
        }
        Command::Clear(args) => (Demo::Clear, PhysicalSize::new(args.width, args.height)),
        Command::Triangle(args) => (Demo::Triangle, PhysicalSize::new(args.width, args.height)),
        Command::Pyramid(args) => (
            Demo::Pyramid { scale: args.scale },
            PhysicalSize::new(args.window.width, args.window.height),
        ),
    };

    window::run(demo, size)
}
