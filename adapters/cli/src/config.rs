use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use plunger_core::{CellCoord, INJECTION_PRESSURE};
use serde::Deserialize;

/// Tunables for a simulation run, read from an optional TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    /// Side length of a cell in pixels; pointer positions are divided by it.
    pub(crate) cell_size: u32,
    /// Equalisation passes run before and after the passive movers step.
    pub(crate) equalise_passes: u32,
    /// Simulation ticks per second in windowed mode.
    pub(crate) tick_rate_hz: f64,
    /// Pressure written under the pointer while the button is held.
    pub(crate) injection_pressure: f64,
    /// Window width in pixels.
    pub(crate) window_width: u32,
    /// Window height in pixels.
    pub(crate) window_height: u32,
    /// Starting `[column, row]` of the player's plunger.
    pub(crate) plunger: [i64; 2],
    /// Starting `[column, row]` of every passive plunger.
    pub(crate) passives: Vec<[i64; 2]>,
    /// Level file replacing the built-in maze.
    pub(crate) level: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell_size: 25,
            equalise_passes: 10,
            tick_rate_hz: 24.0,
            injection_pressure: INJECTION_PRESSURE,
            window_width: 800,
            window_height: 600,
            plunger: [2, 1],
            passives: vec![[6, 1], [-2, -2]],
            level: None,
        }
    }
}

impl SimulationConfig {
    /// Reads and validates a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.cell_size == 0 {
            bail!("cell_size must be positive");
        }
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            bail!("tick_rate_hz must be positive (received {})", self.tick_rate_hz);
        }
        if Duration::try_from_secs_f64(self.tick_rate_hz.recip()).is_err() {
            bail!("tick_rate_hz {} gives an unrepresentable tick interval", self.tick_rate_hz);
        }
        if !self.injection_pressure.is_finite() {
            bail!("injection_pressure must be finite");
        }
        Ok(())
    }

    /// Wall-clock time between ticks, or zero for a configuration that failed validation.
    pub(crate) fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.tick_rate_hz.recip()).unwrap_or(Duration::ZERO)
    }
}

/// Maps a signed `[column, row]` onto the torus, so `-1` names the last column or row.
pub(crate) fn wrap_cell(signed: [i64; 2], dimensions: (u32, u32)) -> CellCoord {
    let (columns, rows) = dimensions;
    let [column, row] = signed;
    let column = column.rem_euclid(i64::from(columns.max(1)));
    let row = row.rem_euclid(i64::from(rows.max(1)));
    CellCoord::new(
        u32::try_from(column).unwrap_or(0),
        u32::try_from(row).unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = SimulationConfig::parse("").expect("empty config is valid");

        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.tick_interval(), Duration::from_secs_f64(24.0f64.recip()));
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config = SimulationConfig::parse(
            "equalise_passes = 3\npassives = [[1, 1]]\nlevel = \"mazes/small.level\"\n",
        )
        .expect("valid config");

        assert_eq!(config.equalise_passes, 3);
        assert_eq!(config.passives, vec![[1, 1]]);
        assert_eq!(config.level, Some(PathBuf::from("mazes/small.level")));
        assert_eq!(config.cell_size, 25);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = SimulationConfig::parse("tile_size = 4").expect_err("unknown field");

        assert!(format!("{error:#}").contains("tile_size"));
    }

    #[test]
    fn degenerate_values_are_rejected() {
        assert!(SimulationConfig::parse("cell_size = 0").is_err());
        assert!(SimulationConfig::parse("tick_rate_hz = 0.0").is_err());
        assert!(SimulationConfig::parse("tick_rate_hz = -5.0").is_err());
        assert!(SimulationConfig::parse("tick_rate_hz = 1e-30").is_err());
    }

    #[test]
    fn negative_cells_wrap_from_the_far_edge() {
        assert_eq!(wrap_cell([-2, -2], (32, 24)), CellCoord::new(30, 22));
        assert_eq!(wrap_cell([6, 1], (32, 24)), CellCoord::new(6, 1));
        assert_eq!(wrap_cell([33, 25], (32, 24)), CellCoord::new(1, 1));
    }
}
