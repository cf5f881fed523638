use std::time::Duration;

use anyhow::{bail, Result};
use plunger_core::{Command, Event, MoverId, MoverKind};
use plunger_system_bootstrap::Bootstrap;
use plunger_system_controls::{ControlInput, Controls};
use plunger_system_drift::Drift;
use plunger_world::{self as world, query, World};
use tracing::{debug, info, warn};

use crate::config::{wrap_cell, SimulationConfig};

/// Upper bound on ticks run for a single frame after a stall.
const MAX_CATCH_UP_TICKS: u32 = 4;

/// Owns the world and the systems that drive it one tick at a time.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    controls: Controls,
    drift: Drift,
    passes: u32,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Spawns the plunger and passive movers at their configured cells.
    ///
    /// Fails when the plunger cannot be placed. Passive movers whose cell is
    /// unavailable are skipped with a warning.
    pub(crate) fn new(mut world: World, config: &SimulationConfig) -> Result<Self> {
        let dimensions = query::grid_dimensions(&world);
        let plunger_cell = wrap_cell(config.plunger, dimensions);
        let passive_cells: Vec<_> = config
            .passives
            .iter()
            .map(|cell| wrap_cell(*cell, dimensions))
            .collect();

        let mut commands = Vec::new();
        Bootstrap.spawn_movers(plunger_cell, &passive_cells, &mut commands);
        let mut events = Vec::new();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        let mut plunger = None;
        for event in &events {
            match event {
                Event::MoverSpawned { mover, kind, cell } => {
                    info!(mover = mover.get(), ?kind, ?cell, "mover spawned");
                    if *kind == MoverKind::Controlled {
                        plunger = Some(*mover);
                    }
                }
                Event::MoverSpawnRejected { kind, cell, reason } => {
                    warn!(?kind, ?cell, ?reason, "mover spawn rejected");
                }
                _ => {}
            }
        }

        let Some(plunger) = plunger else {
            bail!("plunger start cell {plunger_cell:?} is not an open cell");
        };

        Ok(Self {
            world,
            controls: Controls::new(plunger, config.injection_pressure),
            drift: Drift::new(),
            passes: config.equalise_passes,
            commands,
            events,
        })
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Runs one tick and returns the events it produced.
    ///
    /// The player's input is applied first, then the grid equalises, then
    /// each passive mover in identifier order takes one step against the
    /// field left by the movers before it, then the grid equalises again.
    pub(crate) fn advance(&mut self, input: ControlInput) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick, &mut self.events);

        self.commands.clear();
        self.controls.handle(
            input,
            query::grid_dimensions(&self.world),
            query::cell_length(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.equalise();

        let autonomous: Vec<MoverId> = query::mover_view(&self.world)
            .iter()
            .filter(|snapshot| snapshot.kind == MoverKind::Autonomous)
            .map(|snapshot| snapshot.id)
            .collect();
        for mover in autonomous {
            let mover_view = query::mover_view(&self.world);
            let Some(snapshot) = mover_view.get(mover) else {
                continue;
            };
            self.drift
                .handle(snapshot, &query::grid_view(&self.world), &mut self.commands);
            self.flush_commands();
        }

        self.equalise();

        for event in &self.events {
            if let Event::PressureInjectionRejected { cell, reason } = event {
                debug!(?cell, ?reason, "pressure injection rejected");
            }
        }

        &self.events
    }

    fn equalise(&mut self) {
        world::apply(
            &mut self.world,
            Command::Equalise {
                passes: self.passes,
            },
            &mut self.events,
        );
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}

/// Converts variable frame deltas into a whole number of fixed ticks.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickPacer {
    interval: Duration,
    accumulated: Duration,
}

impl TickPacer {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Adds `dt` to the backlog and returns how many ticks are due.
    ///
    /// Backlog beyond the catch-up limit is discarded.
    pub(crate) fn ticks_due(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }

        self.accumulated += dt;
        let mut due = 0;
        while self.accumulated >= self.interval && due < MAX_CATCH_UP_TICKS {
            self.accumulated -= self.interval;
            due += 1;
        }
        if due == MAX_CATCH_UP_TICKS {
            self.accumulated = self.accumulated.min(self.interval);
        }
        due
    }
}
