//! Terminal A* visualizer.
//!
//! Run: cargo run --bin gridstar -- --rows 30

use std::time::Duration;

use clap::Parser;
use gridstar_core::app::{App, AppConfig};
use gridstar_crossterm::CrosstermDriver;
use gridstar_demo::{Visualizer, VisualizerConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive A* path finding on a terminal grid")]
struct Cli {
    /// Rows (and columns) of the square board.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(i32).range(2..=100))]
    rows: i32,

    /// Terminal lines per board cell.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i32).range(1..=4))]
    cell_size: i32,

    /// Delay between two animation steps, in milliseconds.
    #[arg(long, default_value_t = 10)]
    step_delay_ms: u64,

    /// Search steps performed per animation tick.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    steps_per_tick: u16,
}

fn main() {
    let cli = Cli::parse();
    let config = VisualizerConfig {
        rows: cli.rows,
        cell_size: cli.cell_size,
        step_delay: Duration::from_millis(cli.step_delay_ms),
        steps_per_tick: cli.steps_per_tick as usize,
    };

    let model = Visualizer::new(config);
    let size = model.screen_size();
    let mut app = App::new(AppConfig {
        model,
        driver: CrosstermDriver::new(),
        width: size.x,
        height: size.y,
        tick: config.step_delay,
    });

    if let Err(e) = app.run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
