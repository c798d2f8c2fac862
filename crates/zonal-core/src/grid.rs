//! Raster classification: applies the rule cascade to every cell of a
//! building-class grid.
//!
//! Cells are visited in row-major order and every draw comes from the
//! single stream passed in, so the visiting order is part of the
//! reproducibility contract. Cell `(row, col)` sits at
//! `(col * cell_size, row * cell_size)` in the raster frame.

use serde::{Deserialize, Serialize};

use crate::cascade::{CascadeOutcome, classify_building};
use crate::category::{NONE_CLASS, UNKNOWN_ZONE_LABEL};
use crate::resolver::distance;
use crate::rng::SimRng;
use crate::rules::RuleSet;
use crate::stats::ClassificationStats;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid data has {len} cells, expected {rows}x{cols}")]
    DataLength { rows: usize, cols: usize, len: usize },

    #[error("grid shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A dense row-major 2D raster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: usize,
    cols: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// A `rows x cols` grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            cells: vec![value; rows * cols],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap row-major cell data. Fails if the length does not match.
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<T>) -> Result<Self, GridError> {
        if cells.len() != rows * cols {
            return Err(GridError::DataLength {
                rows,
                cols,
                len: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        if row < self.rows && col < self.cols {
            self.cells.get_mut(row * self.cols + col)
        } else {
            None
        }
    }

    /// Row-major cell data.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    /// Iterate `((row, col), value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| ((i / cols, i % cols), v))
    }
}

// ---------------------------------------------------------------------------
// Center
// ---------------------------------------------------------------------------

/// Marker value identifying the reference center in a marker grid.
pub const CENTER_MARKER: i32 = 1;

/// Reference center in raster meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterPosition {
    pub x: f64,
    pub y: f64,
}

impl CenterPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Center of the cell at `(row, col)`.
    pub fn from_cell(row: usize, col: usize, cell_size: f64) -> Self {
        Self::new(col as f64 * cell_size, row as f64 * cell_size)
    }

    /// The first marked cell in row-major order, or the geometric center
    /// of the grid if nothing is marked.
    pub fn from_marker(marker: &Grid<i32>, cell_size: f64) -> Self {
        match marker.iter().find(|(_, v)| **v == CENTER_MARKER) {
            Some(((row, col), _)) => Self::from_cell(row, col, cell_size),
            None => Self::new(
                marker.cols() as f64 * cell_size / 2.0,
                marker.rows() as f64 * cell_size / 2.0,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Cells that were classified as "none" without entering the statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    /// No zone contains the cell.
    pub outside_zones: u64,
    /// The cell's zone lacks a housing or landuse rule.
    pub missing_rules: u64,
}

/// Output of [`classify_grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridClassification {
    /// Building-class codes, same shape as the input.
    pub building_grid: Grid<i32>,
    /// Zone labels; [`UNKNOWN_ZONE_LABEL`] outside every zone.
    pub zone_grid: Grid<i32>,
    pub stats: ClassificationStats,
    pub skipped: SkipCounts,
}

/// Classify every cell of `building_grid` against `rules`.
///
/// Every cell is overwritten: with a residential class code, or with
/// [`NONE_CLASS`] for non-residential cells, cells outside every zone and
/// cells whose zone lacks a housing or landuse rule.
pub fn classify_grid(
    rules: &RuleSet,
    mut building_grid: Grid<i32>,
    center: CenterPosition,
    cell_size: f64,
    rng: &mut SimRng,
) -> GridClassification {
    let (rows, cols) = building_grid.shape();
    let mut zone_grid = Grid::filled(rows, cols, UNKNOWN_ZONE_LABEL);
    let mut stats = ClassificationStats::new((rows * cols) as u64);
    let mut skipped = SkipCounts::default();

    for row in 0..rows {
        for col in 0..cols {
            let idx = row * cols + col;
            let position = (col as f64 * cell_size, row as f64 * cell_size);
            let d = distance(position, (center.x, center.y));

            match classify_building(rules, d, rng) {
                CascadeOutcome::OutsideZones => {
                    building_grid.cells[idx] = NONE_CLASS;
                    skipped.outside_zones += 1;
                }
                CascadeOutcome::MissingRules(zone) => {
                    zone_grid.cells[idx] = zone.label();
                    building_grid.cells[idx] = NONE_CLASS;
                    skipped.missing_rules += 1;
                }
                CascadeOutcome::Classified {
                    zone,
                    building_type,
                } => {
                    zone_grid.cells[idx] = zone.label();
                    building_grid.cells[idx] = building_type.class_code();
                    stats.record(zone.name(), building_type);
                }
            }
        }
    }

    tracing::debug!(
        rows,
        cols,
        classified = stats.classified_units(),
        residential = stats.residential_units(),
        outside_zones = skipped.outside_zones,
        missing_rules = skipped.missing_rules,
        "grid classified"
    );

    GridClassification {
        building_grid,
        zone_grid,
        stats,
        skipped,
    }
}

/// Locate the center from `marker_grid` and classify `building_grid`.
///
/// The marker grid must be co-registered with the building grid.
pub fn classify_template(
    rules: &RuleSet,
    building_grid: Grid<i32>,
    marker_grid: &Grid<i32>,
    cell_size: f64,
    rng: &mut SimRng,
) -> Result<GridClassification, GridError> {
    if marker_grid.shape() != building_grid.shape() {
        return Err(GridError::ShapeMismatch {
            expected: building_grid.shape(),
            found: marker_grid.shape(),
        });
    }
    let center = CenterPosition::from_marker(marker_grid, cell_size);
    tracing::debug!(x = center.x, y = center.y, "reference center located");
    Ok(classify_grid(rules, building_grid, center, cell_size, rng))
}
