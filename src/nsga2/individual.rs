//! Gene-level individuals.

use crate::model::{Catalog, Route, Solution, EMPTY_ROUTE_OBJECTIVES};
use crate::transport::TransportMode;

/// One member of the genetic population.
///
/// The chromosome is an ordered list of catalog indices (each at most
/// once), with one transport mode per segment derived from the mode
/// preference whenever the chromosome changes. The individual caches its
/// objective vector, non-dominated rank, and crowding distance between
/// sort passes.
#[derive(Debug, Clone)]
pub struct Individual {
    genes: Vec<usize>,
    modes: Vec<TransportMode>,
    objectives: Vec<f64>,
    rank: usize,
    crowding: f64,
}

impl Individual {
    /// Wraps a chromosome, deriving its transport modes. The individual
    /// is unevaluated until [`evaluate`](Individual::evaluate) runs.
    pub fn new(genes: Vec<usize>, catalog: &Catalog) -> Self {
        let modes = derive_modes(&genes, catalog);
        Self {
            genes,
            modes,
            objectives: Vec::new(),
            rank: 0,
            crowding: 0.0,
        }
    }

    /// The chromosome: catalog indices in visit order.
    pub fn genes(&self) -> &[usize] {
        &self.genes
    }

    /// Transport modes, one per chromosome segment.
    pub fn modes(&self) -> &[TransportMode] {
        &self.modes
    }

    /// Cached objective vector (empty until evaluated).
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// Non-dominated rank from the latest sort (0 = best front).
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Crowding distance from the latest sort.
    pub fn crowding(&self) -> f64 {
        self.crowding
    }

    pub(crate) fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    pub(crate) fn set_crowding(&mut self, crowding: f64) {
        self.crowding = crowding;
    }

    /// Materializes the chromosome as a [`Route`].
    pub fn build_route(&self, catalog: &Catalog) -> Route {
        let mut route = Route::new();
        for (i, &gene) in self.genes.iter().enumerate() {
            let mode = if i == 0 { None } else { Some(self.modes[i - 1]) };
            route.push(catalog, gene, mode);
        }
        route
    }

    /// Runs the constraint-aware evaluation pipeline and caches the
    /// objectives.
    ///
    /// Invalid and empty routes take the bounded penalty vector and stay
    /// in the population; the sort ranks them behind every feasible
    /// solution that beats the penalties.
    pub fn evaluate(&mut self, catalog: &Catalog) {
        let route = self.build_route(catalog);
        self.objectives = if route.is_empty() || !route.is_valid(catalog) {
            EMPTY_ROUTE_OBJECTIVES.to_vec()
        } else {
            Solution::evaluate(route, catalog).objectives().to_vec()
        };
    }

    /// Converts an evaluated individual into a [`Solution`].
    pub fn into_solution(self, catalog: &Catalog) -> Solution {
        Solution::evaluate(self.build_route(catalog), catalog)
    }
}

/// Preferred mode for every segment of a chromosome.
fn derive_modes(genes: &[usize], catalog: &Catalog) -> Vec<TransportMode> {
    genes
        .windows(2)
        .map(|pair| catalog.preferred_mode(pair[0], pair[1]))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
