#![deny(clippy::all)]
#![forbid(unsafe_code)]

use clap::Parser;
use life_grid::{Coord, Random};
use life_pixels_support::{
    animate, AppConfig, AppError, Camera, Simulation, DEFAULT_DELAY_MILLIS,
};
use log::info;

const CELL_PIXEL_WIDTH: u32 = 10;
const WINDOW_WIDTH: u32 = 850;
const WINDOW_HEIGHT: u32 = 550;
const PAN_SPEED: u32 = 3;

/// Conway's Game of Life on an unbounded grid.
///
/// Paint cells with the left mouse button, erase with the right, drag with
/// the middle button to move around. Space runs or pauses, N steps once,
/// Backspace ends the run, R scatters a random soup, = and - change speed.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Delay between generations while running.
    #[arg(long, default_value_t = DEFAULT_DELAY_MILLIS,
          value_parser = clap::value_parser!(i64).range(1..))]
    delay_millis: i64,

    /// Window pixels per cell.
    #[arg(long, default_value_t = CELL_PIXEL_WIDTH,
          value_parser = clap::value_parser!(u32).range(1..))]
    cell_size: u32,

    #[arg(long, default_value_t = WINDOW_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = WINDOW_HEIGHT)]
    height: u32,

    /// Most cells the view moves per middle-button drag event.
    #[arg(long, default_value_t = PAN_SPEED)]
    pan_speed: u32,

    /// A live cell of the starting pattern, as X,Y. Repeatable.
    #[arg(long = "cell", value_name = "X,Y", allow_hyphen_values = true)]
    cells: Vec<Coord>,

    /// Seed for random soups.
    #[arg(long)]
    seed: Option<u64>,

    /// Start running right away instead of waiting for Space.
    #[arg(long)]
    run: bool,
}

fn main() -> Result<(), AppError> {
    env_logger::init();
    let args = Args::parse();

    let rand = args.seed.map_or_else(Random::new, Random::from_seed);
    let mut simulation = Simulation::new(rand).with_pattern(args.cells.iter().copied());
    simulation.set_delay_millis(args.delay_millis)?;
    if args.run {
        simulation.toggle_run()?;
    }
    info!(
        "Starting with {} painted cells, {} ms per generation",
        args.cells.len(),
        args.delay_millis
    );

    animate(
        simulation,
        Camera::new(args.pan_speed),
        AppConfig {
            window_width: args.width,
            window_height: args.height,
            cell_pixel_width: args.cell_size,
        },
    )
}
