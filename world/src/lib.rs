#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Plungers.

mod analytics;
mod diffusion;
mod grid;
mod level;
mod movers;

use plunger_core::{Command, Event, InjectionError, SpawnError, WELCOME_BANNER};

use crate::{grid::PressureGrid, movers::MoverRegistry};

pub use level::{Terrain, Topology, TopologyError, OPEN_SYMBOL, SOLID_SYMBOL};

/// Represents the authoritative Plungers world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: PressureGrid,
    cell_length: f32,
    movers: MoverRegistry,
    tick_index: u64,
}

impl World {
    /// Creates a world whose grid mirrors the provided topology.
    ///
    /// Every cell starts at the default pressure and no movers are present.
    #[must_use]
    pub fn new(topology: &Topology, cell_length: f32) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: PressureGrid::build(topology),
            cell_length,
            movers: MoverRegistry::new(),
            tick_index: 0,
        }
    }

    /// Parses level text and builds a world from it.
    pub fn from_level(text: &str, cell_length: f32) -> Result<Self, TopologyError> {
        let topology = Topology::parse(text)?;
        Ok(Self::new(&topology, cell_length))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::SpawnMover { kind, cell } => {
            let Some(index) = world.grid.index(cell) else {
                out_events.push(Event::MoverSpawnRejected {
                    kind,
                    cell,
                    reason: SpawnError::OutOfBounds,
                });
                return;
            };

            if !world.grid.is_open(index) {
                out_events.push(Event::MoverSpawnRejected {
                    kind,
                    cell,
                    reason: SpawnError::Solid,
                });
                return;
            }

            let mover = world.movers.spawn(&mut world.grid, kind, index);
            out_events.push(Event::MoverSpawned { mover, kind, cell });
        }
        Command::StepMover { mover, direction } => {
            let Some(state) = world.movers.get_mut(mover) else {
                return;
            };

            if let Some((from, to)) = state.step(&mut world.grid, direction) {
                out_events.push(Event::MoverAdvanced {
                    mover,
                    from: world.grid.coord(from),
                    to: world.grid.coord(to),
                });
            }
        }
        Command::Equalise { passes } => {
            for _ in 0..passes {
                diffusion::equalise_once(&mut world.grid);
            }
            out_events.push(Event::PressureEqualised { passes });
        }
        Command::InjectPressure { cell, pressure } => match world.grid.index(cell) {
            Some(index) => {
                world.grid.set_pressure(index, pressure);
                out_events.push(Event::PressureInjected { cell, pressure });
            }
            None => out_events.push(Event::PressureInjectionRejected {
                cell,
                reason: InjectionError::OutOfBounds,
            }),
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use plunger_core::{
        CellCoord, CellState, Direction, GridView, MoverSnapshot, MoverView, PressureStats,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub fn grid_dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Side length of a single square cell expressed in screen units.
    #[must_use]
    pub fn cell_length(world: &World) -> f32 {
        world.cell_length
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Exposes a read-only view of every cell's state and pressure.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Captures a read-only view of the movers inhabiting the grid.
    #[must_use]
    pub fn mover_view(world: &World) -> MoverView {
        let snapshots = world
            .movers
            .iter()
            .map(|mover| MoverSnapshot {
                id: mover.id,
                kind: mover.kind,
                cell: world.grid.coord(mover.cell),
            })
            .collect();
        MoverView::from_snapshots(snapshots)
    }

    /// State of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn cell_state(world: &World, cell: CellCoord) -> Option<CellState> {
        world.grid.index(cell).map(|index| world.grid.state(index))
    }

    /// Pressure held by the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn pressure_at(world: &World, cell: CellCoord) -> Option<f64> {
        world.grid.index(cell).map(|index| world.grid.pressure(index))
    }

    /// Cell reached by leaving `cell` in `direction`, wrapping at the edges.
    #[must_use]
    pub fn neighbour(world: &World, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        world
            .grid
            .index(cell)
            .map(|index| world.grid.coord(world.grid.neighbour(index, direction)))
    }

    /// Aggregate pressure over the open cells of the grid.
    #[must_use]
    pub fn pressure_stats(world: &World) -> PressureStats {
        super::analytics::pressure_stats(&world.grid)
    }
}
