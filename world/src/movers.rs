//! Authoritative mover state and the displacement rule applied on each step.

use std::collections::BTreeMap;

use plunger_core::{CellState, Direction, MoverId, MoverKind};

use crate::{diffusion::push_from, grid::PressureGrid};

/// Mover stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct MoverState {
    /// Identifier allocated by the world for the mover.
    pub(crate) id: MoverId,
    /// Behaviour driving the mover.
    pub(crate) kind: MoverKind,
    /// Index of the grid cell the mover occupies.
    pub(crate) cell: usize,
}

/// Registry that stores movers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct MoverRegistry {
    entries: BTreeMap<MoverId, MoverState>,
    next_mover_id: MoverId,
}

impl MoverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_mover_id: MoverId::new(0),
        }
    }

    /// Binds a new mover to `cell` and marks the cell occupied.
    ///
    /// Callers are responsible for checking that the cell is open.
    pub(crate) fn spawn(&mut self, grid: &mut PressureGrid, kind: MoverKind, cell: usize) -> MoverId {
        let id = self.next_mover_id;
        self.next_mover_id = MoverId::new(id.get().saturating_add(1));
        grid.set_state(cell, CellState::Occupied(id));
        let _ = self.entries.insert(id, MoverState { id, kind, cell });
        id
    }

    pub(crate) fn get_mut(&mut self, mover: MoverId) -> Option<&mut MoverState> {
        self.entries.get_mut(&mover)
    }

    /// Movers in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &MoverState> {
        self.entries.values()
    }
}

impl MoverState {
    /// Moves into the neighbour in `direction`, displacing whatever pressure
    /// the destination held.
    ///
    /// Returns the `(from, to)` cell indices, or `None` when the destination
    /// is solid. The origin's pressure is left as it was.
    pub(crate) fn step(&mut self, grid: &mut PressureGrid, direction: Direction) -> Option<(usize, usize)> {
        let origin = self.cell;
        let destination = grid.neighbour(origin, direction);
        if !grid.is_open(destination) {
            return None;
        }

        push_from(grid, destination, direction.opposite());
        grid.set_state(origin, CellState::Open);
        self.cell = destination;
        grid.set_state(destination, CellState::Occupied(self.id));
        Some((origin, destination))
    }
}
