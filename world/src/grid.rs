//! Dense toroidal pressure grid owned by the world.

use plunger_core::{CellCoord, CellState, Direction, GridView, DEFAULT_PRESSURE};

use crate::level::{Terrain, Topology};

/// Row-major cell storage with neighbour adjacency fixed at construction.
///
/// States and pressures live in parallel vectors so read-only [`GridView`]s can
/// borrow them directly. Each entry of `neighbours` lists the indices of the
/// cell's neighbours in [`Direction::ALL`] order; edges wrap so every cell has
/// exactly four.
#[derive(Clone, Debug)]
pub(crate) struct PressureGrid {
    columns: u32,
    rows: u32,
    states: Vec<CellState>,
    pressures: Vec<f64>,
    neighbours: Vec<[usize; 4]>,
}

impl PressureGrid {
    /// Builds one cell per topology entry and wires the toroidal adjacency.
    pub(crate) fn build(topology: &Topology) -> Self {
        let states: Vec<CellState> = topology
            .cells()
            .iter()
            .map(|terrain| match terrain {
                Terrain::Open => CellState::Open,
                Terrain::Solid => CellState::Solid,
            })
            .collect();
        let pressures = vec![DEFAULT_PRESSURE; states.len()];
        let neighbours = wire_neighbours(topology.columns(), topology.rows());

        Self {
            columns: topology.columns(),
            rows: topology.rows(),
            states,
            pressures,
            neighbours,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn coord(&self, index: usize) -> CellCoord {
        let columns = self.columns.max(1) as usize;
        CellCoord::new((index % columns) as u32, (index / columns) as u32)
    }

    /// Neighbour indices in [`Direction::ALL`] order.
    pub(crate) fn neighbours(&self, index: usize) -> [usize; 4] {
        self.neighbours[index]
    }

    pub(crate) fn neighbour(&self, index: usize, direction: Direction) -> usize {
        self.neighbours[index][direction.index()]
    }

    pub(crate) fn state(&self, index: usize) -> CellState {
        self.states[index]
    }

    pub(crate) fn set_state(&mut self, index: usize, state: CellState) {
        self.states[index] = state;
    }

    pub(crate) fn is_open(&self, index: usize) -> bool {
        !self.states[index].is_solid()
    }

    pub(crate) fn pressure(&self, index: usize) -> f64 {
        self.pressures[index]
    }

    pub(crate) fn set_pressure(&mut self, index: usize, pressure: f64) {
        self.pressures[index] = pressure;
    }

    pub(crate) fn add_pressure(&mut self, index: usize, amount: f64) {
        self.pressures[index] += amount;
    }

    pub(crate) fn view(&self) -> GridView<'_> {
        GridView::new(
            &self.states,
            &self.pressures,
            &self.neighbours,
            self.columns,
            self.rows,
        )
    }
}

fn wire_neighbours(columns: u32, rows: u32) -> Vec<[usize; 4]> {
    let width = columns as usize;
    (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
        .map(|cell| {
            Direction::ALL.map(|direction| {
                let adjacent = cell.wrapping_step(direction, columns, rows).unwrap_or(cell);
                adjacent.row() as usize * width + adjacent.column() as usize
            })
        })
        .collect()
}
