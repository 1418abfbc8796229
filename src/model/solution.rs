//! Solutions: a route plus its cached objective vector.

use crate::constants::{DAILY_TIME_LIMIT, TIME_TOLERANCE};
use crate::model::{Catalog, Route};
use crate::pareto::{self, Dominance};

/// Length of the canonical objective vector.
pub const NUM_OBJECTIVES: usize = 4;

/// Objectives assigned to an empty route: a large but finite cost and
/// time with nothing visited, so any feasible non-empty solution
/// dominates it without upsetting range normalization.
pub const EMPTY_ROUTE_OBJECTIVES: [f64; NUM_OBJECTIVES] = [1000.0, DAILY_TIME_LIMIT, 0.0, 0.0];

/// A route together with its canonical objective vector.
///
/// All four axes are stored as minimization values:
///
/// | Index | Semantic |
/// |-------|----------|
/// | 0 | total monetary cost |
/// | 1 | total elapsed time, plus the overrun penalty |
/// | 2 | −(attractions visited) |
/// | 3 | −(distinct neighborhoods visited) |
///
/// The objective vector is computed once at construction and cached; the
/// route is immutable afterwards. Axis 1 carries a quadratic penalty when
/// the elapsed time exceeds the tolerated budget
/// `DAILY_TIME_LIMIT · (1 + TIME_TOLERANCE)`.
#[derive(Debug, Clone)]
pub struct Solution {
    route: Route,
    objectives: Vec<f64>,
}

impl Solution {
    /// Evaluates a route into a solution.
    pub fn evaluate(route: Route, catalog: &Catalog) -> Self {
        let objectives = if route.is_empty() {
            EMPTY_ROUTE_OBJECTIVES.to_vec()
        } else {
            let total_time = route.total_time(catalog);
            vec![
                route.total_cost(catalog),
                total_time + overrun_penalty(total_time),
                -(route.len() as f64),
                -(route.distinct_neighborhoods(catalog) as f64),
            ]
        };
        Self { route, objectives }
    }

    /// The underlying route.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The cached objective vector (length [`NUM_OBJECTIVES`]).
    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    /// Total monetary cost (axis 0).
    pub fn total_cost(&self) -> f64 {
        self.objectives[0]
    }

    /// Penalized elapsed time (axis 1).
    pub fn total_time(&self) -> f64 {
        self.objectives[1]
    }

    /// Number of attractions visited.
    pub fn num_attractions(&self) -> usize {
        (-self.objectives[2]) as usize
    }

    /// Number of distinct neighborhoods visited.
    pub fn num_neighborhoods(&self) -> usize {
        (-self.objectives[3]) as usize
    }

    /// Pareto-dominance against another solution.
    ///
    /// Both vectors are [`NUM_OBJECTIVES`] long by construction, so the
    /// shape check cannot fail here.
    pub fn dominates(&self, other: &Solution) -> bool {
        pareto::dominance_unchecked(&self.objectives, &other.objectives) == Dominance::Left
    }
}

/// Solutions compare by route structure; objectives are derived.
impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
    }
}

impl Eq for Solution {}

/// Quadratic penalty applied to axis 1 beyond the tolerated budget.
///
/// With `v` the excess over `DAILY_TIME_LIMIT · (1 + TIME_TOLERANCE)`,
/// the penalty is `v · (1 + v / DAILY_TIME_LIMIT)` — smooth near the
/// boundary, superlinear far beyond it.
fn overrun_penalty(total_time: f64) -> f64 {
    let tolerated = DAILY_TIME_LIMIT * (1.0 + TIME_TOLERANCE);
    if total_time <= tolerated {
        return 0.0;
    }
    let v = total_time - tolerated;
    v * (1.0 + v / DAILY_TIME_LIMIT)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attraction, Catalog};
    use crate::transport::TravelMatrices;

    fn catalog(visit_a: f64, visit_b: f64) -> Catalog {
        let matrices = TravelMatrices::from_tables(
            vec!["A".into(), "B".into()],
            vec![vec![0.0, 500.0], vec![500.0, 0.0]],
            vec![vec![0.0, 700.0], vec![700.0, 0.0]],
            vec![vec![0.0, 5.0], vec![5.0, 0.0]],
            vec![vec![0.0, 10.0], vec![10.0, 0.0]],
        )
        .unwrap();
        Catalog::new(
            vec![
                Attraction::new("A", "Centro", 0.0, 0.0, visit_a, 10.0, 0, 1439).unwrap(),
                Attraction::new("B", "Savassi", 0.0, 0.0, visit_b, 20.0, 0, 1439).unwrap(),
            ],
            matrices,
        )
        .unwrap()
    }

    // ---- Objective computation ----

    #[test]
    fn test_objectives_of_feasible_route() {
        let cat = catalog(60.0, 30.0);
        let sol = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let obj = sol.objectives();
        assert_eq!(obj.len(), NUM_OBJECTIVES);
        assert_eq!(obj[0], 30.0);
        assert_eq!(obj[1], 100.0);
        assert_eq!(obj[2], -2.0);
        assert_eq!(obj[3], -2.0);
        assert_eq!(sol.num_attractions(), 2);
        assert_eq!(sol.num_neighborhoods(), 2);
    }

    #[test]
    fn test_no_penalty_inside_tolerance_band() {
        // 500 + 400 + 10 = 910 minutes: over the limit but within +10%.
        let cat = catalog(500.0, 400.0);
        let sol = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        assert_eq!(sol.total_time(), 910.0);
    }

    #[test]
    fn test_quadratic_penalty_beyond_tolerance() {
        // 600 + 400 + 10 = 1010 minutes; tolerated is 924, so v = 86.
        let cat = catalog(600.0, 400.0);
        let sol = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let v: f64 = 1010.0 - DAILY_TIME_LIMIT * (1.0 + TIME_TOLERANCE);
        let expected = 1010.0 + v * (1.0 + v / DAILY_TIME_LIMIT);
        assert!(
            (sol.total_time() - expected).abs() < 1e-9,
            "expected {expected}, got {}",
            sol.total_time()
        );
    }

    #[test]
    fn test_empty_route_bounded_penalties() {
        let cat = catalog(60.0, 30.0);
        let sol = Solution::evaluate(Route::new(), &cat);
        assert_eq!(sol.objectives(), &EMPTY_ROUTE_OBJECTIVES);
        assert!(sol.objectives().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_feasible_solution_dominates_empty() {
        let cat = catalog(60.0, 30.0);
        let feasible = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let empty = Solution::evaluate(Route::new(), &cat);
        assert!(feasible.dominates(&empty));
        assert!(!empty.dominates(&feasible));
    }

    // ---- Dominance over cached vectors ----

    #[test]
    fn test_neighborhood_axis_breaks_ties() {
        // Same cost, time, and attraction count; more neighborhoods wins.
        let cat = catalog(60.0, 30.0);
        let a = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let mut b = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        b.objectives[3] = -1.0;
        assert!(a.dominates(&b));
        assert!(!b.dominates(&a));
    }

    #[test]
    fn test_identical_objectives_do_not_dominate() {
        let cat = catalog(60.0, 30.0);
        let a = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let b = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        assert!(!a.dominates(&b));
        assert!(!b.dominates(&a));
        assert_eq!(a, b);
    }
}
