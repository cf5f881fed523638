//! Immutable analytics snapshots sourced from the authoritative world state.

use plunger_core::PressureStats;

use crate::grid::PressureGrid;

/// Sums pressure over the open cells of the grid.
pub(crate) fn pressure_stats(grid: &PressureGrid) -> PressureStats {
    let mut stats = PressureStats::default();
    for index in 0..grid.len() {
        if !grid.is_open(index) {
            continue;
        }
        let pressure = grid.pressure(index);
        stats.total += pressure;
        stats.peak = stats.peak.max(pressure);
        stats.open_cells = stats.open_cells.saturating_add(1);
    }
    stats
}
