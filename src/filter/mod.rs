//! Pre-export filtering of non-dominated sets.
//!
//! Both engines hand back raw fronts; this module applies the two
//! export passes — duplicate elimination and ε-dominance thinning —
//! then the canonical output ordering and size cap.

use itertools::Itertools;
use tracing::{debug, warn};

use crate::model::Solution;

/// Comparison slack for float ties in the export ordering.
const TIE_EPS: f64 = 1e-6;

/// Settings for [`prepare_export`].
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Per-axis ε slack for thinning, in objective order
    /// (cost, time, attractions, neighborhoods). Only the two
    /// continuous axes are consulted; the discrete axes define the
    /// grouping instead.
    pub epsilon: [f64; 4],
    /// Maximum number of solutions emitted.
    pub cap: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            epsilon: [10.0, 30.0, 0.1, 0.1],
            cap: 50,
        }
    }
}

impl FilterConfig {
    /// Sets the per-axis ε slack.
    pub fn with_epsilon(mut self, epsilon: [f64; 4]) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the output cap.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }
}

/// Runs the full export pipeline: dedup → ε-thin → sort → cap.
///
/// An empty input is passed through with a diagnostic; the caller
/// decides how to surface the empty result.
pub fn prepare_export(solutions: Vec<Solution>, config: &FilterConfig) -> Vec<Solution> {
    if solutions.is_empty() {
        warn!("no feasible solutions to export");
        return solutions;
    }
    let before = solutions.len();
    let deduped = dedup_by_attraction_set(solutions);
    let mut thinned = epsilon_thin(deduped, &config.epsilon);
    debug!(before, after = thinned.len(), "export filtering");
    sort_for_export(&mut thinned);
    thinned.truncate(config.cap);
    thinned
}

/// Keeps the first solution for each distinct set of attractions,
/// regardless of visit order or transport modes.
pub fn dedup_by_attraction_set(solutions: Vec<Solution>) -> Vec<Solution> {
    let mut seen = std::collections::HashSet::new();
    solutions
        .into_iter()
        .filter(|sol| {
            let mut key: Vec<usize> = sol.route().stops().to_vec();
            key.sort_unstable();
            seen.insert(key)
        })
        .collect()
}

/// ε-dominance thinning.
///
/// Solutions are grouped by structure — identical attraction count and
/// neighborhood count — and inside each group a solution is dropped
/// when an already-kept group-mate is within `ε` of it on both cost and
/// time. Groups are scanned best-first (cost, then time), so the kept
/// representatives are spaced at least one ε step apart along the
/// cost/time tradeoff.
pub fn epsilon_thin(solutions: Vec<Solution>, epsilon: &[f64; 4]) -> Vec<Solution> {
    let groups = solutions
        .into_iter()
        .into_group_map_by(|sol| (sol.num_attractions(), sol.num_neighborhoods()));

    let mut result = Vec::new();
    for (_, mut group) in groups {
        group.sort_by(|a, b| {
            (a.total_cost(), a.total_time())
                .partial_cmp(&(b.total_cost(), b.total_time()))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut kept: Vec<Solution> = Vec::new();
        for sol in group {
            let covered = kept.iter().any(|t| {
                t.total_cost() <= sol.total_cost() + epsilon[0]
                    && t.total_time() <= sol.total_time() + epsilon[1]
            });
            if !covered {
                kept.push(sol);
            }
        }
        result.extend(kept);
    }
    result
}

/// Canonical output ordering: neighborhoods desc, attractions desc,
/// cost asc, time asc.
pub fn sort_for_export(solutions: &mut [Solution]) {
    solutions.sort_by(|a, b| {
        b.num_neighborhoods()
            .cmp(&a.num_neighborhoods())
            .then(b.num_attractions().cmp(&a.num_attractions()))
            .then_with(|| cmp_f64(a.total_cost(), b.total_cost()))
            .then_with(|| cmp_f64(a.total_time(), b.total_time()))
    });
}

fn cmp_f64(a: f64, b: f64) -> std::cmp::Ordering {
    if (a - b).abs() <= TIE_EPS {
        std::cmp::Ordering::Equal
    } else {
        a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attraction, Catalog, Route};
    use crate::transport::TravelMatrices;

    fn catalog() -> Catalog {
        let n = 6usize;
        let names: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
        let gap = |i: usize, j: usize| (i as f64 - j as f64).abs();
        let table = |f: &dyn Fn(usize, usize) -> f64| -> Vec<Vec<f64>> {
            (0..n).map(|i| (0..n).map(|j| f(i, j)).collect()).collect()
        };
        let matrices = TravelMatrices::from_tables(
            names.clone(),
            table(&|i, j| 1000.0 * gap(i, j)),
            table(&|i, j| 800.0 * gap(i, j)),
            table(&|i, j| 3.0 * gap(i, j)),
            table(&|i, j| 6.0 * gap(i, j)),
        )
        .unwrap();
        let attractions = (0..n)
            .map(|i| {
                Attraction::new(
                    names[i].clone(),
                    format!("N{}", i % 2),
                    0.0,
                    0.0,
                    30.0,
                    10.0 * i as f64,
                    0,
                    1439,
                )
                .unwrap()
            })
            .collect();
        Catalog::new(attractions, matrices).unwrap()
    }

    fn solution(cat: &Catalog, stops: &[usize]) -> Solution {
        Solution::evaluate(Route::from_stops(cat, stops), cat)
    }

    // ---- Dedup ----

    #[test]
    fn test_dedup_collapses_reordered_routes() {
        let cat = catalog();
        let a = solution(&cat, &[0, 1, 2]);
        let b = solution(&cat, &[2, 1, 0]);
        let c = solution(&cat, &[0, 1, 3]);
        let kept = dedup_by_attraction_set(vec![a.clone(), b, c.clone()]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], a, "first occurrence wins");
        assert_eq!(kept[1], c);
    }

    // ---- Thinning ----

    #[test]
    fn test_thinning_drops_near_duplicates_within_group() {
        let cat = catalog();
        // Same structure (2 stops, 2 neighborhoods), costs 10 and 30:
        // inside the ε box of the cheaper one.
        let cheap = solution(&cat, &[0, 1]);
        let close = solution(&cat, &[2, 1]);
        let kept = epsilon_thin(vec![cheap.clone(), close.clone()], &[30.0, 600.0, 0.1, 0.1]);
        assert_eq!(kept.len(), 1, "near-identical tradeoffs collapse");
        assert_eq!(kept[0], cheap);
    }

    #[test]
    fn test_thinning_keeps_distinct_structures() {
        let cat = catalog();
        let two = solution(&cat, &[0, 1]);
        let three = solution(&cat, &[0, 1, 2]);
        let kept = epsilon_thin(vec![two, three], &[1e9, 1e9, 0.1, 0.1]);
        assert_eq!(kept.len(), 2, "different structures never thin each other");
    }

    #[test]
    fn test_thinning_keeps_spread_out_solutions() {
        let cat = catalog();
        let cheap = solution(&cat, &[0, 1]); // cost 10
        let costly = solution(&cat, &[4, 5]); // cost 90, same structure
        let kept = epsilon_thin(vec![cheap, costly], &[10.0, 30.0, 0.1, 0.1]);
        assert_eq!(kept.len(), 2);
    }

    // ---- Ordering ----

    #[test]
    fn test_sort_for_export_orders_lexicographically() {
        let cat = catalog();
        let mut solutions = vec![
            solution(&cat, &[0, 2]),    // 2 stops, 1 neighborhood
            solution(&cat, &[0, 1, 2]), // 3 stops, 2 neighborhoods
            solution(&cat, &[0, 1]),    // 2 stops, 2 neighborhoods
        ];
        sort_for_export(&mut solutions);
        assert_eq!(solutions[0].num_attractions(), 3);
        assert_eq!(solutions[1].num_attractions(), 2);
        assert_eq!(solutions[1].num_neighborhoods(), 2);
        assert_eq!(solutions[2].num_neighborhoods(), 1);
    }

    #[test]
    fn test_sort_breaks_ties_by_cost() {
        let cat = catalog();
        let mut solutions = vec![
            solution(&cat, &[2, 1]), // cost 30
            solution(&cat, &[0, 1]), // cost 10, same structure
        ];
        sort_for_export(&mut solutions);
        assert_eq!(solutions[0].total_cost(), 10.0);
    }

    // ---- Pipeline ----

    #[test]
    fn test_prepare_export_caps_output() {
        let cat = catalog();
        let all: Vec<Solution> = (0..5)
            .flat_map(|i| (0..6).filter(move |&j| j != i).map(move |j| (i, j)))
            .map(|(i, j)| solution(&cat, &[i, j]))
            .collect();
        let config = FilterConfig::default()
            .with_epsilon([0.0, 0.0, 0.0, 0.0])
            .with_cap(3);
        let kept = prepare_export(all, &config);
        assert!(kept.len() <= 3);
    }

    #[test]
    fn test_prepare_export_empty_input() {
        let kept = prepare_export(vec![], &FilterConfig::default());
        assert!(kept.is_empty());
    }
}
