#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure controls system that turns player input into plunger and injection commands.

use plunger_core::{CellCoord, Command, Direction, MoverId};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// Direction keys currently held, indexed by [`Direction::index`].
    pub held: [bool; 4],
    /// Pointer position in window pixels, when the pointer is over the window.
    pub pointer: Option<(f32, f32)>,
    /// Indicates whether the injection button is held.
    pub inject: bool,
}

impl ControlInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(held: [bool; 4], pointer: Option<(f32, f32)>, inject: bool) -> Self {
        Self {
            held,
            pointer,
            inject,
        }
    }

    /// First held direction in [`Direction::ALL`] order.
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.held[direction.index()])
    }
}

/// Controls system bound to the player's plunger.
#[derive(Clone, Copy, Debug)]
pub struct Controls {
    plunger: MoverId,
    injection_pressure: f64,
}

impl Controls {
    /// Creates a controls system steering `plunger` and injecting
    /// `injection_pressure` under the pointer.
    #[must_use]
    pub const fn new(plunger: MoverId, injection_pressure: f64) -> Self {
        Self {
            plunger,
            injection_pressure,
        }
    }

    /// Translates input into commands: at most one step, then at most one injection.
    pub fn handle(
        &self,
        input: ControlInput,
        dimensions: (u32, u32),
        cell_length: f32,
        out: &mut Vec<Command>,
    ) {
        if let Some(direction) = input.direction() {
            out.push(Command::StepMover {
                mover: self.plunger,
                direction,
            });
        }

        if !input.inject {
            return;
        }

        if let Some(cell) = input
            .pointer
            .and_then(|pointer| pointer_cell(pointer, cell_length, dimensions))
        {
            out.push(Command::InjectPressure {
                cell,
                pressure: self.injection_pressure,
            });
        }
    }
}

/// Maps a pixel position onto the cell beneath it.
///
/// Returns `None` for positions left of or above the grid, beyond its far
/// edges, or when `cell_length` is not a positive finite number.
#[must_use]
pub fn pointer_cell(pointer: (f32, f32), cell_length: f32, dimensions: (u32, u32)) -> Option<CellCoord> {
    if !cell_length.is_finite() || cell_length <= 0.0 {
        return None;
    }

    let (x, y) = pointer;
    if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
        return None;
    }

    let column = (x / cell_length).floor();
    let row = (y / cell_length).floor();
    let (columns, rows) = dimensions;
    if column >= columns as f32 || row >= rows as f32 {
        return None;
    }

    Some(CellCoord::new(column as u32, row as u32))
}
