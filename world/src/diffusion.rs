//! Pressure equalisation and displacement over the toroidal grid.

use plunger_core::Direction;

use crate::grid::PressureGrid;

/// Runs a single equalisation pass over every open cell in row-major order.
///
/// Each open cell averages its pressure with its open neighbours and writes
/// the average into itself and into each of those neighbours. Writes happen
/// immediately, so cells visited later in the same pass read values written
/// by earlier cells. Solid cells are neither read nor written.
pub(crate) fn equalise_once(grid: &mut PressureGrid) {
    let mut open_neighbours = [0usize; 4];

    for index in 0..grid.len() {
        if !grid.is_open(index) {
            continue;
        }

        let mut total = grid.pressure(index);
        let mut count = 0;
        for neighbour in grid.neighbours(index) {
            if grid.is_open(neighbour) {
                total += grid.pressure(neighbour);
                open_neighbours[count] = neighbour;
                count += 1;
            }
        }

        let equalised = total / (count + 1) as f64;
        grid.set_pressure(index, equalised);
        for &neighbour in &open_neighbours[..count] {
            grid.set_pressure(neighbour, equalised);
        }
    }
}

/// Spreads the pressure held by `index` evenly into its open neighbours,
/// skipping the neighbour in `exclude`.
///
/// When no neighbour can take the pressure it stays where it is.
pub(crate) fn push_from(grid: &mut PressureGrid, index: usize, exclude: Direction) {
    let neighbours = grid.neighbours(index);
    let eligible = Direction::ALL
        .into_iter()
        .filter(|direction| *direction != exclude)
        .filter(|direction| grid.is_open(neighbours[direction.index()]))
        .count();
    if eligible == 0 {
        return;
    }

    let share = grid.pressure(index) / eligible as f64;
    for direction in Direction::ALL {
        if direction == exclude {
            continue;
        }
        let neighbour = neighbours[direction.index()];
        if grid.is_open(neighbour) {
            grid.add_pressure(neighbour, share);
        }
    }
    grid.set_pressure(index, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Terrain, Topology};
    use plunger_core::{CellCoord, CellState, MoverId};
    use proptest::prelude::*;

    fn grid_from(text: &str) -> PressureGrid {
        PressureGrid::build(&Topology::parse(text).expect("valid topology"))
    }

    fn index_of(grid: &PressureGrid, column: u32, row: u32) -> usize {
        grid.index(CellCoord::new(column, row)).expect("cell in bounds")
    }

    fn fill(grid: &mut PressureGrid, pressure: f64) {
        for index in 0..grid.len() {
            grid.set_pressure(index, pressure);
        }
    }

    #[test]
    fn sequential_pass_matches_hand_computed_three_by_three() {
        let mut grid = grid_from("000\n000\n000");
        fill(&mut grid, 10.0);
        let center = index_of(&grid, 1, 1);
        grid.set_pressure(center, 0.0);

        equalise_once(&mut grid);

        let expected = [
            [8.94208, 8.895488000000004, 8.864972800000004],
            [8.94208, 8.895488000000004, 8.864972800000004],
            [8.864972800000004, 8.864972800000004, 8.864972800000004],
        ];
        for (row, values) in expected.iter().enumerate() {
            for (column, value) in values.iter().enumerate() {
                let index = index_of(&grid, column as u32, row as u32);
                assert_eq!(
                    grid.pressure(index),
                    *value,
                    "unexpected pressure at column {column}, row {row}"
                );
            }
        }
    }

    #[test]
    fn isolated_open_cell_keeps_its_pressure() {
        let mut grid = grid_from("###\n#0#\n###");
        let center = index_of(&grid, 1, 1);
        grid.set_pressure(center, 42.0);

        equalise_once(&mut grid);

        assert_eq!(grid.pressure(center), 42.0);
    }

    #[test]
    fn solid_cells_are_untouched_by_equalisation() {
        let mut grid = grid_from("0#0\n000\n0#0");
        fill(&mut grid, 3.0);
        let wall = index_of(&grid, 1, 0);
        let occupied = index_of(&grid, 1, 1);
        grid.set_pressure(wall, 123.456);
        grid.set_state(occupied, CellState::Occupied(MoverId::new(0)));
        grid.set_pressure(occupied, 987.0);
        let corner = index_of(&grid, 0, 0);
        grid.set_pressure(corner, 250.0);

        for _ in 0..25 {
            equalise_once(&mut grid);
        }

        assert_eq!(grid.pressure(wall).to_bits(), 123.456f64.to_bits());
        assert_eq!(grid.pressure(occupied).to_bits(), 987.0f64.to_bits());
    }

    #[test]
    fn push_splits_pressure_between_two_open_neighbours() {
        let mut grid = grid_from("#0#\n000\n###");
        fill(&mut grid, 0.0);
        let destination = index_of(&grid, 1, 1);
        grid.set_pressure(destination, 100.0);

        push_from(&mut grid, destination, Direction::Up);

        assert_eq!(grid.pressure(destination), 0.0);
        assert_eq!(grid.pressure(index_of(&grid, 0, 1)), 50.0);
        assert_eq!(grid.pressure(index_of(&grid, 2, 1)), 50.0);
        assert_eq!(grid.pressure(index_of(&grid, 1, 0)), 0.0);
    }

    #[test]
    fn push_with_no_outlet_keeps_pressure() {
        let mut grid = grid_from("#0#\n#0#\n###");
        let destination = index_of(&grid, 1, 1);
        grid.set_pressure(destination, 77.5);

        push_from(&mut grid, destination, Direction::Up);

        assert_eq!(grid.pressure(destination), 77.5);
        assert_eq!(grid.pressure(index_of(&grid, 1, 0)), plunger_core::DEFAULT_PRESSURE);
    }

    #[test]
    fn push_adds_to_existing_neighbour_pressure() {
        let mut grid = grid_from("###\n000\n###");
        fill(&mut grid, 5.0);
        let destination = index_of(&grid, 1, 1);
        grid.set_pressure(destination, 20.0);

        push_from(&mut grid, destination, Direction::Left);

        assert_eq!(grid.pressure(index_of(&grid, 2, 1)), 25.0);
        assert_eq!(grid.pressure(index_of(&grid, 0, 1)), 5.0);
    }

    fn topology_strategy() -> impl Strategy<Value = Vec<Vec<Terrain>>> {
        (1usize..6, 1usize..6).prop_flat_map(|(columns, rows)| {
            prop::collection::vec(
                prop::collection::vec(
                    prop_oneof![3 => Just(Terrain::Open), 1 => Just(Terrain::Solid)],
                    columns,
                ),
                rows,
            )
        })
    }

    proptest! {
        #[test]
        fn push_conserves_pressure(
            pressure in 0.0f64..1_000.0,
            up in any::<bool>(),
            left in any::<bool>(),
            right in any::<bool>(),
        ) {
            let symbol = |open: bool| if open { '0' } else { '#' };
            let text = format!(
                "#{}#\n{}0{}\n#0#",
                symbol(up),
                symbol(left),
                symbol(right),
            );
            let mut grid = grid_from(&text);
            fill(&mut grid, 0.0);
            let destination = index_of(&grid, 1, 1);
            grid.set_pressure(destination, pressure);
            let eligible = [up, left, right].into_iter().filter(|open| *open).count();
            prop_assume!(eligible > 0);

            push_from(&mut grid, destination, Direction::Down);

            let share = pressure / eligible as f64;
            prop_assert_eq!(grid.pressure(destination), 0.0);
            let neighbours = [(1, 0, up), (0, 1, left), (2, 1, right)];
            let mut total = grid.pressure(destination);
            for (column, row, open) in neighbours {
                let received = grid.pressure(index_of(&grid, column, row));
                if open {
                    prop_assert_eq!(received, share);
                    total += received;
                } else {
                    prop_assert_eq!(received, 0.0);
                }
            }
            prop_assert!((total - pressure).abs() <= 1e-9 * pressure.max(1.0));
        }

        #[test]
        fn equalisation_keeps_pressure_non_negative(
            rows in topology_strategy(),
            seeds in prop::collection::vec(0.0f64..500.0, 36),
        ) {
            let topology = Topology::from_rows(rows).expect("strategy yields rectangles");
            let mut grid = PressureGrid::build(&topology);
            for index in 0..grid.len() {
                grid.set_pressure(index, seeds[index % seeds.len()]);
            }

            equalise_once(&mut grid);

            for index in 0..grid.len() {
                prop_assert!(grid.pressure(index) >= 0.0);
            }
        }
    }
}
