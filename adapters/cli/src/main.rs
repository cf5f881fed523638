#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Plungers simulation.

mod config;
mod simulation;

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use plunger_rendering::{
    Color, FrameSimulationBreakdown, GridPresentation, Presentation, RenderingBackend, Scene,
};
use plunger_rendering_macroquad::MacroquadBackend;
use plunger_system_bootstrap::Bootstrap;
use plunger_system_controls::ControlInput;
use plunger_world::{query, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::SimulationConfig,
    simulation::{Simulation, TickPacer},
};

const DEFAULT_LEVEL: &str = include_str!("../levels/default.level");

#[derive(Parser, Debug)]
#[command(name = "plungers")]
#[command(about = "Pressure diffusion on a toroidal maze, stirred by plungers", long_about = None)]
struct Args {
    /// TOML file with simulation settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level file to load instead of the built-in maze.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Equalisation passes per half-tick.
    #[arg(long)]
    passes: Option<u32>,

    /// Simulation ticks per second.
    #[arg(long)]
    tick_rate: Option<f64>,

    /// Cell side length in pixels.
    #[arg(long)]
    cell_size: Option<u32>,

    /// Run without a window for a fixed number of ticks.
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Ticks to run in headless mode.
    #[arg(long, default_value_t = 240)]
    ticks: u64,

    /// Log frame timings once per second.
    #[arg(long, default_value_t = false)]
    show_fps: bool,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: Option<bool>,

    /// Log filter directive, overriding `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,
}

/// Entry point for the Plungers command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref())?;

    let config = resolve_config(&args)?;
    let level = match &config.level {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read level file {}", path.display()))?,
        None => DEFAULT_LEVEL.to_owned(),
    };
    let world = World::from_level(&level, config.cell_size as f32)
        .context("failed to build world from level")?;

    let bootstrap = Bootstrap;
    let (columns, rows) = bootstrap.grid_dimensions(&world);
    info!(columns, rows, "{}", bootstrap.welcome_banner(&world));

    let simulation = Simulation::new(world, &config)?;
    if args.headless {
        run_headless(simulation, args.ticks);
        Ok(())
    } else {
        run_windowed(simulation, &config, &args)
    }
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level {directive:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!(error))
        .context("failed to initialise logging")
}

fn resolve_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    if let Some(level) = &args.level {
        config.level = Some(level.clone());
    }
    if let Some(passes) = args.passes {
        config.equalise_passes = passes;
    }
    if let Some(tick_rate) = args.tick_rate {
        config.tick_rate_hz = tick_rate;
    }
    if let Some(cell_size) = args.cell_size {
        config.cell_size = cell_size;
    }

    config.validate().context("invalid command-line overrides")?;
    Ok(config)
}

fn run_headless(mut simulation: Simulation, ticks: u64) {
    let started = Instant::now();
    for _ in 0..ticks {
        let _ = simulation.advance(ControlInput::default());
    }
    let elapsed = started.elapsed();

    let world = simulation.world();
    let stats = query::pressure_stats(world);
    info!(
        ticks = query::tick_index(world),
        elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
        total_pressure = stats.total,
        peak_pressure = stats.peak,
        open_cells = stats.open_cells,
        "headless run finished"
    );
    for mover in query::mover_view(world).iter() {
        info!(mover = mover.id.get(), kind = ?mover.kind, cell = ?mover.cell, "final position");
    }
}

fn run_windowed(mut simulation: Simulation, config: &SimulationConfig, args: &Args) -> Result<()> {
    let (columns, rows) = query::grid_dimensions(simulation.world());
    let grid = GridPresentation::new(columns, rows, query::cell_length(simulation.world()))
        .context("failed to describe grid for rendering")?;
    let mut scene = Scene::new(grid);
    scene.populate(&query::grid_view(simulation.world()));
    let presentation = Presentation::new("Plungers", Color::from_rgb_u8(0, 0, 0), scene);

    let mut backend = MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .with_window_size(config.window_width, config.window_height);
    if let Some(vsync) = args.vsync {
        backend = backend.with_vsync(vsync);
    }

    let mut pacer = TickPacer::new(config.tick_interval());
    backend.run(presentation, move |dt, input, scene| {
        let simulation_start = Instant::now();
        let control = ControlInput::new(
            input.held,
            input.pointer.map(|pointer| (pointer.x, pointer.y)),
            input.inject,
        );
        for _ in 0..pacer.ticks_due(dt) {
            let _ = simulation.advance(control);
        }
        let simulation_duration = simulation_start.elapsed();

        let scene_start = Instant::now();
        scene.populate(&query::grid_view(simulation.world()));

        FrameSimulationBreakdown {
            simulation: simulation_duration,
            scene_population: scene_start.elapsed(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn embedded_level_builds_the_default_maze() {
        let world = World::from_level(DEFAULT_LEVEL, 25.0).expect("embedded level parses");

        assert_eq!(query::grid_dimensions(&world), (32, 24));
    }

    #[test]
    fn command_line_overrides_file_defaults() {
        let args = Args::parse_from([
            "plungers",
            "--passes",
            "4",
            "--tick-rate",
            "12",
            "--cell-size",
            "10",
            "--headless",
        ]);

        let config = resolve_config(&args).expect("valid overrides");

        assert!(args.headless);
        assert_eq!(config.equalise_passes, 4);
        assert_eq!(config.tick_rate_hz, 12.0);
        assert_eq!(config.cell_size, 10);
        assert_eq!(config.tick_interval(), Duration::from_secs_f64(1.0 / 12.0));
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let args = Args::parse_from(["plungers", "--tick-rate", "0"]);
        assert!(resolve_config(&args).is_err());

        let args = Args::parse_from(["plungers", "--tick-rate", "1e-30"]);
        assert!(resolve_config(&args).is_err());
    }
}
