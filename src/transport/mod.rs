//! Transport oracle over precomputed origin–destination matrices.
//!
//! Four dense `n × n` tables — car/walk × distance/time — are loaded once
//! (see [`crate::io::matrix`]) and queried read-only for the rest of the
//! run. All query methods take `&self`, so a single [`TravelMatrices`] can
//! be shared by any number of concurrent engine instances without locking.
//!
//! Name lookups are whitespace-insensitive: each attraction is indexed
//! under its trimmed name and, as a fallback, under a fully space-stripped
//! alias.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use tracing::warn;

use crate::constants::{COST_CAR_PER_KM, WALK_TIME_PREFERENCE};

/// How a tourist moves between two consecutive attractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportMode {
    /// Driving (or ride-hailing); costs [`COST_CAR_PER_KM`] per km.
    Car,
    /// Walking; free, but capped at [`WALK_TIME_PREFERENCE`] minutes
    /// per segment.
    Walk,
}

impl TransportMode {
    /// Human-readable label used by the CSV exporter.
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Car => "Car",
            TransportMode::Walk => "Walk",
        }
    }

    /// The opposite mode.
    pub fn other(self) -> Self {
        match self {
            TransportMode::Car => TransportMode::Walk,
            TransportMode::Walk => TransportMode::Car,
        }
    }
}

/// Errors raised by name-keyed oracle queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The given name is absent from the matrix index map.
    UnknownAttraction(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttraction(name) => {
                write!(f, "attraction '{name}' not found in transport matrices")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors detected while assembling the four tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixDataError {
    /// No attractions at all.
    Empty,
    /// A table is not `n × n` for the `n` names given.
    NotSquare {
        /// Which of the four tables is malformed.
        table: &'static str,
        /// Expected dimension (number of attraction names).
        expected: usize,
        /// Offending row index.
        row: usize,
        /// Number of cells found in that row (or number of rows when
        /// `row == usize::MAX`).
        found: usize,
    },
}

impl Display for MatrixDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "transport matrices contain no attractions"),
            Self::NotSquare {
                table,
                expected,
                row,
                found,
            } => {
                if *row == usize::MAX {
                    write!(f, "{table} matrix has {found} rows, expected {expected}")
                } else {
                    write!(
                        f,
                        "{table} matrix row {row} has {found} cells, expected {expected}"
                    )
                }
            }
        }
    }
}

impl std::error::Error for MatrixDataError {}

/// The transport oracle: four OD tables plus the name→index map.
///
/// # Examples
///
/// ```
/// use roteiro::transport::{TravelMatrices, TransportMode};
///
/// let matrices = TravelMatrices::from_tables(
///     vec!["A".into(), "B".into()],
///     vec![vec![0.0, 500.0], vec![500.0, 0.0]],   // car metres
///     vec![vec![0.0, 600.0], vec![600.0, 0.0]],   // walk metres
///     vec![vec![0.0, 5.0], vec![5.0, 0.0]],       // car minutes
///     vec![vec![0.0, 10.0], vec![10.0, 0.0]],     // walk minutes
/// )
/// .unwrap();
///
/// assert_eq!(matrices.travel_time("A", "B", TransportMode::Walk).unwrap(), 10.0);
/// assert_eq!(matrices.preferred_mode("A", "B").unwrap(), TransportMode::Walk);
/// ```
#[derive(Debug, Clone)]
pub struct TravelMatrices {
    names: Vec<String>,
    index: HashMap<String, usize>,
    car_distances: Vec<Vec<f64>>,
    walk_distances: Vec<Vec<f64>>,
    car_times: Vec<Vec<f64>>,
    walk_times: Vec<Vec<f64>>,
}

impl TravelMatrices {
    /// Builds the oracle from four already-parsed tables.
    ///
    /// Each table must be `n × n` where `n == names.len()`. Names are
    /// indexed under their trimmed form plus a space-stripped alias.
    pub fn from_tables(
        names: Vec<String>,
        car_distances: Vec<Vec<f64>>,
        walk_distances: Vec<Vec<f64>>,
        car_times: Vec<Vec<f64>>,
        walk_times: Vec<Vec<f64>>,
    ) -> Result<Self, MatrixDataError> {
        let n = names.len();
        if n == 0 {
            return Err(MatrixDataError::Empty);
        }

        for (table, data) in [
            ("car distance", &car_distances),
            ("walk distance", &walk_distances),
            ("car time", &car_times),
            ("walk time", &walk_times),
        ] {
            if data.len() != n {
                return Err(MatrixDataError::NotSquare {
                    table,
                    expected: n,
                    row: usize::MAX,
                    found: data.len(),
                });
            }
            for (row, cells) in data.iter().enumerate() {
                if cells.len() != n {
                    return Err(MatrixDataError::NotSquare {
                        table,
                        expected: n,
                        row,
                        found: cells.len(),
                    });
                }
            }
        }

        let names: Vec<String> = names.iter().map(|s| s.trim().to_string()).collect();
        let mut index = HashMap::with_capacity(n * 2);
        for (i, name) in names.iter().enumerate() {
            index.insert(name.clone(), i);
            let squashed = squash(name);
            if squashed != *name {
                index.insert(squashed, i);
            }
        }

        Ok(Self {
            names,
            index,
            car_distances,
            walk_distances,
            car_times,
            walk_times,
        })
    }

    /// Number of attractions covered by the matrices.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the matrices cover no attractions.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical (trimmed) attraction names, in matrix order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolves a name to its matrix index.
    ///
    /// Matching is trimmed first and falls back to a space-stripped
    /// comparison, so `" Mercado Central "` and `"MercadoCentral"` both
    /// resolve to the same row.
    pub fn index_of(&self, name: &str) -> Result<usize, TransportError> {
        let trimmed = name.trim();
        if let Some(&i) = self.index.get(trimmed) {
            return Ok(i);
        }
        if let Some(&i) = self.index.get(&squash(trimmed)) {
            return Ok(i);
        }
        Err(TransportError::UnknownAttraction(trimmed.to_string()))
    }

    /// Distance in metres between two attractions, by name.
    pub fn distance(
        &self,
        from: &str,
        to: &str,
        mode: TransportMode,
    ) -> Result<f64, TransportError> {
        let (i, j) = (self.index_of(from)?, self.index_of(to)?);
        Ok(self.distance_by_index(i, j, mode))
    }

    /// Travel time in minutes between two attractions, by name.
    pub fn travel_time(
        &self,
        from: &str,
        to: &str,
        mode: TransportMode,
    ) -> Result<f64, TransportError> {
        let (i, j) = (self.index_of(from)?, self.index_of(to)?);
        Ok(self.travel_time_by_index(i, j, mode))
    }

    /// Monetary cost in R$ of one travel segment, by name.
    ///
    /// Walking is free. Driving costs [`COST_CAR_PER_KM`] per km of the
    /// car distance, clamped to be non-negative: a negative cell means a
    /// corrupt matrix and is logged and treated as zero.
    pub fn travel_cost(
        &self,
        from: &str,
        to: &str,
        mode: TransportMode,
    ) -> Result<f64, TransportError> {
        let (i, j) = (self.index_of(from)?, self.index_of(to)?);
        Ok(self.travel_cost_by_index(i, j, mode))
    }

    /// Preferred transport mode between two attractions, by name.
    pub fn preferred_mode(&self, from: &str, to: &str) -> Result<TransportMode, TransportError> {
        let (i, j) = (self.index_of(from)?, self.index_of(to)?);
        Ok(self.preferred_mode_by_index(i, j))
    }

    /// Distance in metres, by resolved matrix indices.
    pub fn distance_by_index(&self, from: usize, to: usize, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Car => self.car_distances[from][to],
            TransportMode::Walk => self.walk_distances[from][to],
        }
    }

    /// Travel time in minutes, by resolved matrix indices.
    pub fn travel_time_by_index(&self, from: usize, to: usize, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Car => self.car_times[from][to],
            TransportMode::Walk => self.walk_times[from][to],
        }
    }

    /// Segment cost in R$, by resolved matrix indices.
    pub fn travel_cost_by_index(&self, from: usize, to: usize, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walk => 0.0,
            TransportMode::Car => {
                let metres = self.distance_by_index(from, to, TransportMode::Car);
                if metres < 0.0 {
                    warn!(from, to, metres, "negative car distance cell, treating as zero");
                    0.0
                } else {
                    metres / 1000.0 * COST_CAR_PER_KM
                }
            }
        }
    }

    /// Preferred transport mode, by resolved matrix indices.
    ///
    /// Walk when the walking time is within [`WALK_TIME_PREFERENCE`],
    /// car otherwise. This is the only place the threshold is consulted
    /// for mode choice.
    pub fn preferred_mode_by_index(&self, from: usize, to: usize) -> TransportMode {
        if self.travel_time_by_index(from, to, TransportMode::Walk) <= WALK_TIME_PREFERENCE {
            TransportMode::Walk
        } else {
            TransportMode::Car
        }
    }
}

/// Removes all whitespace from a name, for the lookup alias.
fn squash(name: &str) -> String {
    name.split_whitespace().collect()
}

// ============================================================================
// Tests
// ============================================================================
