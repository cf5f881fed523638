#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Plungers simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems read immutable views such as [`GridView`] and
//! [`MoverView`] and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Plungers.";

/// Pressure every cell holds when a level is first built.
///
/// Equal to 255 spread over a 16x12 block of cells.
pub const DEFAULT_PRESSURE: f64 = 1.328125;

/// Pressure at and above which cells are displayed at full saturation.
pub const DISPLAY_CEILING: f64 = 255.0;

/// Pressure written into a cell by the pointer stimulus.
pub const INJECTION_PRESSURE: f64 = 255.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the tick counter.
    Tick,
    /// Binds a new mover to an open cell.
    SpawnMover {
        /// Behaviour assigned to the mover.
        kind: MoverKind,
        /// Cell the mover should occupy.
        cell: CellCoord,
    },
    /// Requests that a mover step into the neighbouring cell in `direction`.
    StepMover {
        /// Identifier of the mover attempting to move.
        mover: MoverId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Runs the provided number of equalisation passes over the grid.
    Equalise {
        /// Number of sequential averaging passes.
        passes: u32,
    },
    /// Overwrites the pressure held by a single cell.
    InjectPressure {
        /// Cell receiving the new pressure.
        cell: CellCoord,
        /// Pressure written into the cell.
        pressure: f64,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the tick counter advanced.
    TimeAdvanced {
        /// Tick index reached after advancing.
        tick: u64,
    },
    /// Confirms that a mover was bound to its starting cell.
    MoverSpawned {
        /// Identifier assigned to the new mover.
        mover: MoverId,
        /// Behaviour assigned to the mover.
        kind: MoverKind,
        /// Cell the mover occupies.
        cell: CellCoord,
    },
    /// Reports that a spawn request was rejected.
    MoverSpawnRejected {
        /// Behaviour requested for the mover.
        kind: MoverKind,
        /// Cell provided in the spawn request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that a mover moved between two neighbouring cells.
    MoverAdvanced {
        /// Identifier of the mover that advanced.
        mover: MoverId,
        /// Cell the mover occupied before moving.
        from: CellCoord,
        /// Cell the mover occupies after moving.
        to: CellCoord,
    },
    /// Confirms that equalisation passes ran.
    PressureEqualised {
        /// Number of passes that were executed.
        passes: u32,
    },
    /// Confirms that a cell's pressure was overwritten.
    PressureInjected {
        /// Cell that received the pressure.
        cell: CellCoord,
        /// Pressure now held by the cell.
        pressure: f64,
    },
    /// Reports that an injection request was rejected.
    PressureInjectionRejected {
        /// Cell provided in the injection request.
        cell: CellCoord,
        /// Specific reason the injection failed.
        reason: InjectionError,
    },
}

/// Cardinal directions linking a cell to its four neighbours.
///
/// The declaration order is the canonical neighbour order used by every
/// iteration over neighbours, including tie-breaks between equal pressures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in canonical neighbour order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction pointing back the way this one came.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Position of the direction within [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }
}

/// Unique identifier assigned to a mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoverId(u32);

impl MoverId {
    /// Creates a new mover identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behaviour that drives a mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoverKind {
    /// Moves only when the player asks it to.
    Controlled,
    /// Follows the local pressure gradient every tick.
    Autonomous,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the neighbouring cell in `direction` on a torus of the given size.
    ///
    /// Stepping off any edge re-enters from the opposite edge. Returns `None`
    /// when the grid has no area or the cell lies outside it.
    #[must_use]
    pub fn wrapping_step(self, direction: Direction, columns: u32, rows: u32) -> Option<Self> {
        if self.column >= columns || self.row >= rows {
            return None;
        }

        let (column, row) = match direction {
            Direction::Up => (self.column, self.row.checked_sub(1).unwrap_or(rows - 1)),
            Direction::Down => (self.column, (self.row + 1) % rows),
            Direction::Left => (
                self.column.checked_sub(1).unwrap_or(columns - 1),
                self.row,
            ),
            Direction::Right => ((self.column + 1) % columns, self.row),
        };
        Some(Self::new(column, row))
    }
}

/// Solidity of a cell as seen by diffusion, movers and renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Traversable cell taking part in diffusion.
    Open,
    /// Wall from the level topology.
    Solid,
    /// Cell currently held by a mover.
    Occupied(MoverId),
}

impl CellState {
    /// Reports whether the cell blocks movement and diffusion.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Mover holding the cell, if any.
    #[must_use]
    pub const fn occupant(self) -> Option<MoverId> {
        match self {
            Self::Occupied(mover) => Some(mover),
            Self::Open | Self::Solid => None,
        }
    }
}

/// Immutable representation of a single mover's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoverSnapshot {
    /// Unique identifier assigned to the mover.
    pub id: MoverId,
    /// Behaviour driving the mover.
    pub kind: MoverKind,
    /// Grid cell currently occupied by the mover.
    pub cell: CellCoord,
}

/// Read-only snapshot describing all movers within the grid.
#[derive(Clone, Debug, Default)]
pub struct MoverView {
    snapshots: Vec<MoverSnapshot>,
}

impl MoverView {
    /// Creates a new mover view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MoverSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mover snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &MoverSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the mover with the provided identifier.
    #[must_use]
    pub fn get(&self, mover: MoverId) -> Option<&MoverSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == mover)
    }
}

/// Sample of a single cell produced while iterating a [`GridView`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSample {
    /// Coordinates of the sampled cell.
    pub cell: CellCoord,
    /// Solidity of the cell.
    pub state: CellState,
    /// Pressure held by the cell.
    pub pressure: f64,
}

/// Read-only view over the pressure grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    states: &'a [CellState],
    pressures: &'a [f64],
    neighbours: &'a [[usize; 4]],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by row-major slices.
    ///
    /// Each slice is expected to hold `columns * rows` entries. Every entry of
    /// `neighbours` lists the row-major indices of the cell's neighbours in
    /// [`Direction::ALL`] order.
    #[must_use]
    pub fn new(
        states: &'a [CellState],
        pressures: &'a [f64],
        neighbours: &'a [[usize; 4]],
        columns: u32,
        rows: u32,
    ) -> Self {
        Self {
            states,
            pressures,
            neighbours,
            columns,
            rows,
        }
    }

    /// Provides the dimensions of the underlying grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Solidity of the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell)
            .and_then(|index| self.states.get(index).copied())
    }

    /// Pressure held by the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn pressure(&self, cell: CellCoord) -> Option<f64> {
        self.index(cell)
            .and_then(|index| self.pressures.get(index).copied())
    }

    /// Neighbour of `cell` in `direction`, read from the grid's adjacency table.
    #[must_use]
    pub fn neighbour(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let index = self.index(cell)?;
        let adjacent = self.neighbours.get(index)?[direction.index()];
        Some(self.coord(adjacent))
    }

    /// Iterates every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellSample> + 'a {
        let view = *self;
        self.states
            .iter()
            .zip(self.pressures.iter())
            .enumerate()
            .map(move |(index, (state, pressure))| CellSample {
                cell: view.coord(index),
                state: *state,
                pressure: *pressure,
            })
    }

    fn coord(&self, index: usize) -> CellCoord {
        let columns = self.columns.max(1) as usize;
        CellCoord::new((index % columns) as u32, (index / columns) as u32)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Aggregate pressure figures over the open cells of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PressureStats {
    /// Sum of the pressure held by open cells.
    pub total: f64,
    /// Highest pressure held by any open cell.
    pub peak: f64,
    /// Number of open cells that were sampled.
    pub open_cells: u32,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell is a wall or already occupied.
    Solid,
}

/// Reasons a pressure injection may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InjectionError {
    /// The requested cell lies outside the grid.
    OutOfBounds,
}
