//! Level topology parsing and validation.

use std::str::FromStr;

use thiserror::Error;

/// Symbol marking a traversable cell in level text.
pub const OPEN_SYMBOL: char = '0';
/// Symbol marking a wall in level text.
pub const SOLID_SYMBOL: char = '#';

/// Static terrain of a single cell before any mover enters the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Traversable cell.
    Open,
    /// Wall.
    Solid,
}

/// Validated rectangular layout of open and solid cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    columns: u32,
    rows: u32,
    terrain: Vec<Terrain>,
}

impl Topology {
    /// Parses level text where `0` is open, `#` is solid and each line is a row.
    ///
    /// Carriage returns are ignored and a single trailing line break is
    /// tolerated. Any other symbol is rejected.
    pub fn parse(text: &str) -> Result<Self, TopologyError> {
        let body = text
            .strip_suffix('\n')
            .map(|stripped| stripped.strip_suffix('\r').unwrap_or(stripped))
            .unwrap_or(text);

        let mut rows = Vec::new();
        for (row, line) in body.split('\n').enumerate() {
            let mut terrain = Vec::with_capacity(line.len());
            for symbol in line.chars().filter(|symbol| *symbol != '\r') {
                match symbol {
                    OPEN_SYMBOL => terrain.push(Terrain::Open),
                    SOLID_SYMBOL => terrain.push(Terrain::Solid),
                    _ => {
                        return Err(TopologyError::UnexpectedSymbol {
                            row,
                            column: terrain.len(),
                            symbol,
                        })
                    }
                }
            }
            rows.push(terrain);
        }

        Self::from_rows(rows)
    }

    /// Builds a topology from explicit rows, validating that it is rectangular
    /// and non-empty.
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> Result<Self, TopologyError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(TopologyError::Empty);
        }

        for (row, terrain) in rows.iter().enumerate() {
            if terrain.len() != expected {
                return Err(TopologyError::Ragged {
                    row,
                    expected,
                    found: terrain.len(),
                });
            }
        }

        let too_large = || TopologyError::TooLarge {
            columns: expected,
            rows: rows.len(),
        };
        let columns = u32::try_from(expected).map_err(|_| too_large())?;
        let row_count = u32::try_from(rows.len()).map_err(|_| too_large())?;
        if columns.checked_mul(row_count).is_none() {
            return Err(too_large());
        }

        Ok(Self {
            columns,
            rows: row_count,
            terrain: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of columns in every row.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major terrain of every cell.
    #[must_use]
    pub fn cells(&self) -> &[Terrain] {
        &self.terrain
    }
}

impl FromStr for Topology {
    type Err = TopologyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

/// Errors raised while validating a level topology.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// The layout contains no cells.
    #[error("level topology contains no cells")]
    Empty,
    /// A row's width differs from the first row.
    #[error("level row {row} has {found} cells but the first row has {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The text contains a character that is neither open nor solid.
    #[error("unexpected symbol {symbol:?} at row {row}, column {column}")]
    UnexpectedSymbol {
        /// Zero-based row of the symbol.
        row: usize,
        /// Zero-based column of the symbol.
        column: usize,
        /// Offending character.
        symbol: char,
    },
    /// The layout does not fit the grid's index space.
    #[error("level topology of {columns}x{rows} cells is too large")]
    TooLarge {
        /// Width of the layout.
        columns: usize,
        /// Height of the layout.
        rows: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_and_solid_symbols_row_major() {
        let topology = Topology::parse("#0#\n000\n").expect("valid topology");

        assert_eq!(topology.columns(), 3);
        assert_eq!(topology.rows(), 2);
        assert_eq!(
            topology.cells(),
            &[
                Terrain::Solid,
                Terrain::Open,
                Terrain::Solid,
                Terrain::Open,
                Terrain::Open,
                Terrain::Open,
            ]
        );
    }

    #[test]
    fn tolerates_carriage_returns() {
        let topology: Topology = "0#\r\n#0\r\n".parse().expect("crlf topology");

        assert_eq!(topology.columns(), 2);
        assert_eq!(topology.rows(), 2);
    }

    #[test]
    fn rejects_empty_text() {
        assert_eq!(Topology::parse(""), Err(TopologyError::Empty));
        assert_eq!(Topology::parse("\n"), Err(TopologyError::Empty));
        assert_eq!(Topology::from_rows(Vec::new()), Err(TopologyError::Empty));
    }

    #[test]
    fn rejects_ragged_rows() {
        let error = Topology::parse("000\n00\n000").expect_err("ragged rows must fail");

        assert_eq!(
            error,
            TopologyError::Ragged {
                row: 1,
                expected: 3,
                found: 2,
            }
        );
    }

    #[test]
    fn blank_line_between_rows_is_ragged() {
        let error = Topology::parse("00\n\n00").expect_err("blank row must fail");

        assert!(matches!(error, TopologyError::Ragged { row: 1, .. }));
    }

    #[test]
    fn rejects_unknown_symbols() {
        let error = Topology::parse("00\n0x").expect_err("unknown symbol must fail");

        assert_eq!(
            error,
            TopologyError::UnexpectedSymbol {
                row: 1,
                column: 1,
                symbol: 'x',
            }
        );
        assert_eq!(
            error.to_string(),
            "unexpected symbol 'x' at row 1, column 1"
        );
    }
}
