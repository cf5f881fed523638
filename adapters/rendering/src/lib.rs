#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Plungers adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use plunger_core::{CellState, GridView, DISPLAY_CEILING};
use std::{error::Error, fmt, time::Duration};

/// Fill used for walls.
pub const WALL_COLOR: Color = Color::from_rgb_u8(255, 0, 0);
/// Fill used for cells holding a mover.
pub const MOVER_COLOR: Color = Color::from_rgb_u8(255, 255, 0);
/// Fill used for open cells at or above the display ceiling.
pub const SATURATED_COLOR: Color = Color::from_rgb_u8(255, 255, 255);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque grey whose three channels share `level`.
    #[must_use]
    pub const fn grey(level: u8) -> Self {
        Self::from_rgb_u8(level, level, level)
    }
}

/// Derives the fill of a cell from its state and pressure.
///
/// Open cells below the display ceiling are drawn as a grey whose level is
/// the pressure truncated to a byte.
#[must_use]
pub fn tile_color(state: CellState, pressure: f64) -> Color {
    match state {
        CellState::Solid => WALL_COLOR,
        CellState::Occupied(_) => MOVER_COLOR,
        CellState::Open if pressure >= DISPLAY_CEILING => SATURATED_COLOR,
        CellState::Open => Color::grey(pressure.clamp(0.0, DISPLAY_CEILING) as u8),
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Direction keys held on this frame, indexed by `Direction::index`.
    pub held: [bool; 4],
    /// Pointer position in window pixels, when the pointer is over the window.
    pub pointer: Option<Vec2>,
    /// Whether the injection button is held on this frame.
    pub inject: bool,
}

/// Describes the cell grid that can be rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in pixels.
    pub cell_length: f32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid has no cells or `cell_length` is not a
    /// positive finite number.
    pub fn new(columns: u32, rows: u32, cell_length: f32) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
        })
    }

    /// Top-left corner of the provided cell in pixels.
    #[must_use]
    pub fn cell_origin(&self, column: u32, row: u32) -> Vec2 {
        Vec2::new(column as f32, row as f32) * self.cell_length
    }
}

/// Fill of a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Zero-based column of the cell.
    pub column: u32,
    /// Zero-based row of the cell.
    pub row: u32,
    /// Fill color of the cell.
    pub color: Color,
}

impl TilePresentation {
    /// Creates a new tile presentation descriptor.
    #[must_use]
    pub const fn new(column: u32, row: u32, color: Color) -> Self {
        Self { column, row, color }
    }
}

/// Scene description combining the grid layout with the fill of every cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Cell fills in row-major order.
    pub tiles: Vec<TilePresentation>,
}

impl Scene {
    /// Creates a scene with no tiles populated yet.
    #[must_use]
    pub fn new(grid: GridPresentation) -> Self {
        Self {
            grid,
            tiles: Vec::new(),
        }
    }

    /// Replaces the tile fills with colors derived from the provided view.
    pub fn populate(&mut self, view: &GridView<'_>) {
        self.tiles.clear();
        self.tiles.extend(view.iter().map(|sample| {
            TilePresentation::new(
                sample.cell.column(),
                sample.cell.row(),
                tile_color(sample.state, sample.pressure),
            )
        }));
    }
}

/// Timings reported by the scene update closure for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// Time spent advancing the simulation.
    pub simulation: Duration,
    /// Time spent rebuilding the scene from world queries.
    pub scene_population: Duration,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Plungers scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered. It reports how long the simulation and scene
    /// population took so the backend can include them in frame metrics.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cell length must be positive and finite.
    InvalidCellLength {
        /// Provided cell length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must contain cells (received {columns}x{rows})")
            }
            Self::InvalidCellLength { cell_length } => {
                write!(
                    f,
                    "cell_length must be positive (received {cell_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
