#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic drift system that steers autonomous movers down the pressure gradient.

use plunger_core::{Command, Direction, GridView, MoverKind, MoverSnapshot};

/// Outcome of evaluating a mover's surroundings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriftDecision {
    /// Step toward the lowest-pressure open neighbour.
    Move(Direction),
    /// Every open neighbour holds the same pressure, so the mover stays put.
    Stall,
    /// No neighbour is open.
    Trapped,
}

/// Pure system that proposes one step per autonomous mover.
#[derive(Clone, Copy, Debug, Default)]
pub struct Drift;

impl Drift {
    /// Creates a new drift system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Chooses where the mover should go given the current pressure field.
    ///
    /// Neighbours are inspected in [`Direction::ALL`] order and the first one
    /// holding the minimum pressure wins. With two or more open neighbours
    /// whose pressures are all identical the mover stalls; a lone open
    /// neighbour is always taken.
    #[must_use]
    pub fn plan(&self, mover: &MoverSnapshot, view: &GridView<'_>) -> DriftDecision {
        let mut open = [(Direction::Up, 0.0f64); 4];
        let mut count = 0;
        for direction in Direction::ALL {
            let Some(cell) = view.neighbour(mover.cell, direction) else {
                continue;
            };
            let Some(state) = view.state(cell) else {
                continue;
            };
            if state.is_solid() {
                continue;
            }
            let Some(pressure) = view.pressure(cell) else {
                continue;
            };
            open[count] = (direction, pressure);
            count += 1;
        }

        let open = &open[..count];
        let Some(&(first_direction, first_pressure)) = open.first() else {
            return DriftDecision::Trapped;
        };

        if open.len() > 1
            && open
                .iter()
                .all(|&(_, pressure)| pressure == first_pressure)
        {
            return DriftDecision::Stall;
        }

        let (direction, _) = open.iter().skip(1).fold(
            (first_direction, first_pressure),
            |best, &(direction, pressure)| {
                if pressure < best.1 {
                    (direction, pressure)
                } else {
                    best
                }
            },
        );
        DriftDecision::Move(direction)
    }

    /// Emits a step command for autonomous movers whose plan is to move.
    ///
    /// Controlled movers are ignored.
    pub fn handle(&mut self, mover: &MoverSnapshot, view: &GridView<'_>, out: &mut Vec<Command>) {
        if mover.kind != MoverKind::Autonomous {
            return;
        }

        if let DriftDecision::Move(direction) = self.plan(mover, view) {
            out.push(Command::StepMover {
                mover: mover.id,
                direction,
            });
        }
    }
}
