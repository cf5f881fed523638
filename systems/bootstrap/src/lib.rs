#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Plungers experience.

use plunger_core::{CellCoord, Command, MoverKind};
use plunger_world::{query, World};

/// Produces data required to greet the player and seed the grid.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the grid dimensions required for rendering.
    #[must_use]
    pub fn grid_dimensions(&self, world: &World) -> (u32, u32) {
        query::grid_dimensions(world)
    }

    /// Emits spawn commands for the plunger followed by every passive mover.
    ///
    /// The plunger is spawned first so it receives the lowest identifier.
    pub fn spawn_movers(&self, plunger: CellCoord, passives: &[CellCoord], out: &mut Vec<Command>) {
        out.push(Command::SpawnMover {
            kind: MoverKind::Controlled,
            cell: plunger,
        });
        out.extend(passives.iter().map(|cell| Command::SpawnMover {
            kind: MoverKind::Autonomous,
            cell: *cell,
        }));
    }
}
