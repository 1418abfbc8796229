//! Attraction catalog bound to the transport oracle.

use std::fmt::{self, Display, Formatter};

use crate::model::Attraction;
use crate::transport::{TransportError, TransportMode, TravelMatrices};

/// Errors raised when binding attractions to the matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog contains no attractions.
    Empty,
    /// An attraction name is absent from the matrix index map.
    UnknownAttraction(String),
    /// Two attractions share the same name.
    DuplicateName(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "catalog contains no attractions"),
            Self::UnknownAttraction(name) => {
                write!(f, "attraction '{name}' has no row in the transport matrices")
            }
            Self::DuplicateName(name) => {
                write!(f, "attraction '{name}' appears more than once in the catalog")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<TransportError> for CatalogError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::UnknownAttraction(name) => CatalogError::UnknownAttraction(name),
        }
    }
}

/// The read-only problem instance: attractions plus travel matrices.
///
/// Every attraction is resolved to its matrix row once, at construction,
/// so the travel queries used inside the engines are plain array lookups
/// keyed by catalog index. The catalog is immutable after construction
/// and safe to share across threads.
///
/// Routes and solutions store catalog indices; all their computations
/// borrow the catalog, which is what keeps them from outliving it.
#[derive(Debug, Clone)]
pub struct Catalog {
    attractions: Vec<Attraction>,
    matrix_row: Vec<usize>,
    matrices: TravelMatrices,
}

impl Catalog {
    /// Binds a set of attractions to their matrix rows.
    pub fn new(
        attractions: Vec<Attraction>,
        matrices: TravelMatrices,
    ) -> Result<Self, CatalogError> {
        if attractions.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut matrix_row = Vec::with_capacity(attractions.len());
        let mut seen = std::collections::HashSet::new();
        for attraction in &attractions {
            if !seen.insert(attraction.name().trim().to_string()) {
                return Err(CatalogError::DuplicateName(attraction.name().to_string()));
            }
            matrix_row.push(matrices.index_of(attraction.name())?);
        }
        Ok(Self {
            attractions,
            matrix_row,
            matrices,
        })
    }

    /// Number of attractions.
    pub fn len(&self) -> usize {
        self.attractions.len()
    }

    /// Returns `true` if the catalog holds no attractions.
    ///
    /// Construction rejects empty catalogs, so this is only `false` in
    /// practice; kept for API completeness.
    pub fn is_empty(&self) -> bool {
        self.attractions.is_empty()
    }

    /// The attraction at a catalog index.
    pub fn attraction(&self, idx: usize) -> &Attraction {
        &self.attractions[idx]
    }

    /// All attractions, in catalog order.
    pub fn attractions(&self) -> &[Attraction] {
        &self.attractions
    }

    /// The underlying transport oracle.
    pub fn matrices(&self) -> &TravelMatrices {
        &self.matrices
    }

    /// Distance in metres between two attractions, by catalog index.
    pub fn distance(&self, from: usize, to: usize, mode: TransportMode) -> f64 {
        self.matrices
            .distance_by_index(self.matrix_row[from], self.matrix_row[to], mode)
    }

    /// Travel time in minutes between two attractions, by catalog index.
    pub fn travel_time(&self, from: usize, to: usize, mode: TransportMode) -> f64 {
        self.matrices
            .travel_time_by_index(self.matrix_row[from], self.matrix_row[to], mode)
    }

    /// Travel cost in R$ between two attractions, by catalog index.
    pub fn travel_cost(&self, from: usize, to: usize, mode: TransportMode) -> f64 {
        self.matrices
            .travel_cost_by_index(self.matrix_row[from], self.matrix_row[to], mode)
    }

    /// Preferred mode between two attractions, by catalog index.
    pub fn preferred_mode(&self, from: usize, to: usize) -> TransportMode {
        self.matrices
            .preferred_mode_by_index(self.matrix_row[from], self.matrix_row[to])
    }
}
