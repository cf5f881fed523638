use plunger_core::{CellCoord, Command, Direction, Event, MoverId, MoverKind, MoverSnapshot};
use plunger_system_drift::{Drift, DriftDecision};
use plunger_world::{self as world, query, World};

fn world_with_mover(level: &str, kind: MoverKind, cell: CellCoord) -> (World, MoverId) {
    let mut world = World::from_level(level, 25.0).expect("valid level");
    let mut events = Vec::new();
    world::apply(&mut world, Command::SpawnMover { kind, cell }, &mut events);
    let mover = match events.as_slice() {
        [Event::MoverSpawned { mover, .. }] => *mover,
        other => panic!("unexpected spawn events: {other:?}"),
    };
    (world, mover)
}

fn inject(world: &mut World, column: u32, row: u32, pressure: f64) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::InjectPressure {
            cell: CellCoord::new(column, row),
            pressure,
        },
        &mut events,
    );
}

fn snapshot(world: &World, mover: MoverId) -> MoverSnapshot {
    *query::mover_view(world)
        .get(mover)
        .expect("mover snapshot")
}

#[test]
fn stalls_when_all_open_neighbours_share_a_pressure() {
    let (world, mover) = world_with_mover("000\n000\n000", MoverKind::Autonomous, CellCoord::new(1, 1));
    let drift = Drift::new();

    let decision = drift.plan(&snapshot(&world, mover), &query::grid_view(&world));

    assert_eq!(decision, DriftDecision::Stall);
}

#[test]
fn signed_zero_pressures_count_as_equal() {
    let (mut world, mover) =
        world_with_mover("###\n000\n###", MoverKind::Autonomous, CellCoord::new(1, 1));
    inject(&mut world, 0, 1, 0.0);
    inject(&mut world, 2, 1, -0.0);
    let drift = Drift::new();

    let decision = drift.plan(&snapshot(&world, mover), &query::grid_view(&world));

    assert_eq!(decision, DriftDecision::Stall);
}

#[test]
fn takes_a_lone_open_neighbour_even_at_equilibrium() {
    let (world, mover) = world_with_mover("###\n#00\n###", MoverKind::Autonomous, CellCoord::new(1, 1));
    let drift = Drift::new();

    let decision = drift.plan(&snapshot(&world, mover), &query::grid_view(&world));

    assert_eq!(decision, DriftDecision::Move(Direction::Right));
}

#[test]
fn reports_trapped_when_surrounded_by_walls() {
    let (world, mover) = world_with_mover("###\n#0#\n###", MoverKind::Autonomous, CellCoord::new(1, 1));
    let drift = Drift::new();
    let mut commands = Vec::new();

    let decision = drift.plan(&snapshot(&world, mover), &query::grid_view(&world));
    Drift::new().handle(&snapshot(&world, mover), &query::grid_view(&world), &mut commands);

    assert_eq!(decision, DriftDecision::Trapped);
    assert!(commands.is_empty());
}

#[test]
fn follows_the_lowest_pressure_neighbour() {
    let (mut world, mover) =
        world_with_mover("000\n000\n000", MoverKind::Autonomous, CellCoord::new(1, 1));
    inject(&mut world, 1, 0, 9.0);
    inject(&mut world, 1, 2, 4.0);
    inject(&mut world, 0, 1, 7.0);
    inject(&mut world, 2, 1, 5.0);
    let mut drift = Drift::new();
    let mut commands = Vec::new();

    drift.handle(&snapshot(&world, mover), &query::grid_view(&world), &mut commands);

    assert_eq!(
        commands,
        vec![Command::StepMover {
            mover,
            direction: Direction::Down,
        }]
    );
}

#[test]
fn ties_resolve_in_up_down_left_right_order() {
    let (mut world, mover) =
        world_with_mover("000\n000\n000", MoverKind::Autonomous, CellCoord::new(1, 1));
    inject(&mut world, 1, 0, 9.0);
    inject(&mut world, 1, 2, 9.0);
    inject(&mut world, 0, 1, 2.0);
    inject(&mut world, 2, 1, 2.0);
    let drift = Drift::new();

    let decision = drift.plan(&snapshot(&world, mover), &query::grid_view(&world));

    assert_eq!(decision, DriftDecision::Move(Direction::Left));
}

#[test]
fn occupied_neighbours_are_treated_as_walls() {
    let mut world = World::from_level("000\n000\n000", 25.0).expect("valid level");
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnMover {
            kind: MoverKind::Autonomous,
            cell: CellCoord::new(1, 1),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnMover {
            kind: MoverKind::Controlled,
            cell: CellCoord::new(1, 0),
        },
        &mut events,
    );
    inject(&mut world, 1, 0, 0.0);
    inject(&mut world, 2, 1, 0.5);
    let autonomous = MoverId::new(0);
    let drift = Drift::new();

    let decision = drift.plan(&snapshot(&world, autonomous), &query::grid_view(&world));

    assert_eq!(decision, DriftDecision::Move(Direction::Right));
}

#[test]
fn controlled_movers_are_never_steered() {
    let (mut world, mover) =
        world_with_mover("000\n000\n000", MoverKind::Controlled, CellCoord::new(1, 1));
    inject(&mut world, 1, 0, 0.0);
    let mut drift = Drift::new();
    let mut commands = Vec::new();

    drift.handle(&snapshot(&world, mover), &query::grid_view(&world), &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn applying_the_planned_step_pushes_pressure_ahead() {
    let (mut world, mover) =
        world_with_mover("####\n0000\n####", MoverKind::Autonomous, CellCoord::new(1, 1));
    inject(&mut world, 0, 1, 8.0);
    inject(&mut world, 2, 1, 1.0);
    inject(&mut world, 3, 1, 3.0);
    let mut drift = Drift::new();
    let mut commands = Vec::new();
    drift.handle(&snapshot(&world, mover), &query::grid_view(&world), &mut commands);

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(
        events,
        vec![Event::MoverAdvanced {
            mover,
            from: CellCoord::new(1, 1),
            to: CellCoord::new(2, 1),
        }]
    );
    assert_eq!(query::pressure_at(&world, CellCoord::new(2, 1)), Some(0.0));
    assert_eq!(query::pressure_at(&world, CellCoord::new(3, 1)), Some(4.0));
    assert_eq!(query::pressure_at(&world, CellCoord::new(1, 1)), Some(plunger_core::DEFAULT_PRESSURE));
}
