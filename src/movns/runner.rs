//! The MOVNS shaking + local search loop.

use std::collections::{HashMap, HashSet};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::config::{MovnsConfig, MovnsError};
use super::neighborhood::Operator;
use crate::constants::MAX_ROUTE_LEN;
use crate::model::{Catalog, Route, Solution};
use crate::progress::ProgressRecord;

/// Shaking attempts per iteration before giving up on a move.
const SHAKE_ATTEMPTS: usize = 10;

/// Mode-flip probes per local-search polish.
const LOCAL_SEARCH_ATTEMPTS: usize = 10;

/// Soft per-iteration budget; a slower iteration is abandoned and
/// counted as no-improvement.
const ITERATION_BUDGET: Duration = Duration::from_secs(5);

/// Checkpoint period, in iterations.
const CHECKPOINT_EVERY: usize = 100;

/// Result of a MOVNS run.
#[derive(Debug, Clone)]
pub struct MovnsResult {
    /// The final approximation set: mutually non-dominated, valid,
    /// non-empty solutions.
    ///
    /// Raw engine output; see [`crate::filter`] for export preparation.
    pub solutions: Vec<Solution>,

    /// One checkpoint every hundred iterations.
    pub history: Vec<ProgressRecord>,

    /// Iterations executed before termination.
    pub iterations: usize,

    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// The MOVNS engine, bound to a catalog for one run.
///
/// # Examples
///
/// ```no_run
/// use roteiro::model::Catalog;
/// use roteiro::movns::{Movns, MovnsConfig};
///
/// # fn demo(catalog: &Catalog) -> Result<(), roteiro::movns::MovnsError> {
/// let config = MovnsConfig::default()
///     .with_max_iterations(5000)
///     .with_max_seconds(30)
///     .with_seed(42);
/// let result = Movns::new(catalog, config)?.run();
/// println!("approximation set: {}", result.solutions.len());
/// # Ok(())
/// # }
/// ```
pub struct Movns<'a> {
    catalog: &'a Catalog,
    config: MovnsConfig,
}

impl<'a> Movns<'a> {
    /// Creates the engine, validating the configuration.
    pub fn new(catalog: &'a Catalog, config: MovnsConfig) -> Result<Self, MovnsError> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    /// Runs the search until the iteration, stall, or wall-clock limit.
    pub fn run(&self) -> MovnsResult {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let start = Instant::now();
        let mut archive = vec![self.initial_solution(&mut rng)];
        // Explored operators per solution, keyed by content hash so the
        // bookkeeping survives archive eviction and reordering.
        let mut explored: HashMap<u64, HashSet<&'static str>> = HashMap::new();
        let mut history = Vec::new();
        let mut iteration = 0usize;
        let mut stall = 0usize;

        while iteration < self.config.max_iterations && stall < self.config.max_no_improve {
            if start.elapsed() >= Duration::from_secs(self.config.max_seconds) {
                info!(iteration, "wall-clock limit reached");
                break;
            }
            let iteration_start = Instant::now();

            let current = select_for_exploration(&archive, &mut explored, &mut rng).clone();
            let operator = Operator::ALL[rng.random_range(0..Operator::ALL.len())];

            let shaken = self.shake(&current, operator, &mut rng);
            if iteration_start.elapsed() > ITERATION_BUDGET {
                warn!(iteration, operator = operator.name(), "iteration abandoned after shaking");
                iteration += 1;
                stall += 1;
                continue;
            }

            let polished = self.local_search(shaken, &mut rng);
            if iteration_start.elapsed() > ITERATION_BUDGET {
                warn!(iteration, operator = operator.name(), "iteration abandoned after local search");
                iteration += 1;
                stall += 1;
                continue;
            }

            let improved = update_archive(self.catalog, &mut archive, &mut explored, polished);
            explored
                .entry(solution_key(&current))
                .or_default()
                .insert(operator.name());

            if archive.is_empty() {
                archive.push(self.initial_solution(&mut rng));
            }

            iteration += 1;
            stall = if improved { 0 } else { stall + 1 };

            if iteration % CHECKPOINT_EVERY == 0 {
                if let Some(record) = ProgressRecord::from_front(iteration, &archive) {
                    debug!(
                        iteration,
                        archive = record.front_size,
                        stall,
                        best_cost = record.best_cost,
                        "movns checkpoint"
                    );
                    history.push(record);
                }
            }
        }

        let elapsed = start.elapsed();
        info!(
            iterations = iteration,
            archive = archive.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "movns finished"
        );
        MovnsResult {
            solutions: archive,
            history,
            iterations: iteration,
            elapsed,
        }
    }

    /// Random starting point: a shuffled selection of 2 to
    /// `min(8, |A|)` attractions, tail-trimmed until valid.
    fn initial_solution(&self, rng: &mut StdRng) -> Solution {
        let n = self.catalog.len();
        let hi = MAX_ROUTE_LEN.min(n);
        let lo = 2.min(hi);
        let len = rng.random_range(lo..=hi);

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        let mut route = Route::from_stops(self.catalog, &indices[..len]);
        while !route.is_valid(self.catalog) && route.len() > 1 {
            route.remove(self.catalog, route.len() - 1);
        }
        Solution::evaluate(route, self.catalog)
    }

    /// Shaking: up to [`SHAKE_ATTEMPTS`] candidates until one is valid
    /// and distinct from `current`.
    fn shake(&self, current: &Solution, operator: Operator, rng: &mut StdRng) -> Solution {
        for _ in 0..SHAKE_ATTEMPTS {
            let candidate = operator.apply(current, self.catalog, rng);
            if candidate != *current {
                return candidate;
            }
        }
        current.clone()
    }

    /// Local search by transport-mode shaking: up to
    /// [`LOCAL_SEARCH_ATTEMPTS`] mode-flip probes, accepting neighbors
    /// that dominate the incumbent or are mutually non-dominated but
    /// cheaper on cost or time. The probe count is a hard bound, so the
    /// search always terminates even on segments where flipping back and
    /// forth trades cost against time.
    fn local_search(&self, mut solution: Solution, rng: &mut StdRng) -> Solution {
        for _ in 0..LOCAL_SEARCH_ATTEMPTS {
            let neighbor = Operator::TransportModeChange.apply(&solution, self.catalog, rng);
            if neighbor == solution {
                continue;
            }
            if neighbor.dominates(&solution)
                || (!solution.dominates(&neighbor)
                    && (neighbor.total_cost() < solution.total_cost()
                        || neighbor.total_time() < solution.total_time()))
            {
                solution = neighbor;
            }
        }
        solution
    }
}

/// Picks a solution with unexplored operators; when everything is fully
/// explored, resets the bookkeeping and picks at random.
fn select_for_exploration<'s>(
    archive: &'s [Solution],
    explored: &mut HashMap<u64, HashSet<&'static str>>,
    rng: &mut StdRng,
) -> &'s Solution {
    let fresh: Vec<&Solution> = archive
        .iter()
        .filter(|sol| {
            explored
                .get(&solution_key(sol))
                .map_or(true, |ops| ops.len() < Operator::ALL.len())
        })
        .collect();
    if fresh.is_empty() {
        explored.clear();
        &archive[rng.random_range(0..archive.len())]
    } else {
        fresh[rng.random_range(0..fresh.len())]
    }
}

/// Merges a candidate into the approximation set.
///
/// The candidate is discarded when it is invalid, already present, or
/// dominated by an incumbent; otherwise it evicts every incumbent it
/// dominates (dropping their exploration state) and joins the set.
/// Returns whether the set changed.
fn update_archive(
    catalog: &Catalog,
    archive: &mut Vec<Solution>,
    explored: &mut HashMap<u64, HashSet<&'static str>>,
    candidate: Solution,
) -> bool {
    if candidate.route().is_empty() || !candidate.route().is_valid(catalog) {
        return false;
    }
    if archive.iter().any(|incumbent| *incumbent == candidate) {
        return false;
    }
    if archive.iter().any(|incumbent| incumbent.dominates(&candidate)) {
        return false;
    }
    archive.retain(|incumbent| {
        if candidate.dominates(incumbent) {
            explored.remove(&solution_key(incumbent));
            false
        } else {
            true
        }
    });
    archive.push(candidate);
    true
}

/// Stable identity of a solution: a hash of its stops and modes.
fn solution_key(solution: &Solution) -> u64 {
    let mut hasher = DefaultHasher::new();
    solution.route().hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attraction;
    use crate::pareto::{dominance, Dominance};
    use crate::transport::TravelMatrices;

    /// Ten attractions on a line, mirroring the NSGA-II test instance.
    fn line_catalog() -> Catalog {
        let n = 10usize;
        let names: Vec<String> = (0..n).map(|i| format!("P{i}")).collect();
        let gap = |i: usize, j: usize| (i as f64 - j as f64).abs();
        let table = |f: &dyn Fn(usize, usize) -> f64| -> Vec<Vec<f64>> {
            (0..n).map(|i| (0..n).map(|j| f(i, j)).collect()).collect()
        };
        let matrices = TravelMatrices::from_tables(
            names.clone(),
            table(&|i, j| 1200.0 * gap(i, j)),
            table(&|i, j| 900.0 * gap(i, j)),
            table(&|i, j| 2.0 * gap(i, j)),
            table(&|i, j| 4.0 * gap(i, j)),
        )
        .unwrap();
        let attractions = (0..n)
            .map(|i| {
                Attraction::new(
                    names[i].clone(),
                    format!("N{}", i / 3),
                    0.0,
                    0.0,
                    30.0,
                    5.0 * i as f64,
                    0,
                    1439,
                )
                .unwrap()
            })
            .collect();
        Catalog::new(attractions, matrices).unwrap()
    }

    // ---- End to end ----

    #[test]
    fn test_run_terminates_within_budget_with_nonempty_archive() {
        let cat = line_catalog();
        let config = MovnsConfig::default()
            .with_max_iterations(100)
            .with_max_seconds(5)
            .with_max_no_improve(50)
            .with_seed(0);
        let start = Instant::now();
        let result = Movns::new(&cat, config).unwrap().run();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!result.solutions.is_empty());
        assert!(result.iterations <= 100);
        for sol in &result.solutions {
            assert!(sol.route().is_valid(&cat));
        }
    }

    #[test]
    fn test_archive_is_pairwise_non_dominated() {
        let cat = line_catalog();
        let config = MovnsConfig::default()
            .with_max_iterations(200)
            .with_max_seconds(5)
            .with_max_no_improve(100)
            .with_seed(0);
        let result = Movns::new(&cat, config).unwrap().run();

        for a in &result.solutions {
            for b in &result.solutions {
                if std::ptr::eq(a, b) {
                    continue;
                }
                assert_ne!(
                    dominance(a.objectives(), b.objectives()).unwrap(),
                    Dominance::Left,
                    "archive members must be mutually non-dominated"
                );
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_archive() {
        let cat = line_catalog();
        let run = |seed| {
            let config = MovnsConfig::default()
                .with_max_iterations(150)
                .with_max_seconds(5)
                .with_max_no_improve(150)
                .with_seed(seed);
            Movns::new(&cat, config).unwrap().run()
        };
        let a = run(42);
        let b = run(42);
        let objs = |r: &MovnsResult| -> Vec<Vec<f64>> {
            r.solutions.iter().map(|s| s.objectives().to_vec()).collect()
        };
        assert_eq!(objs(&a), objs(&b));
    }

    #[test]
    fn test_history_checkpoints_every_hundred_iterations() {
        let cat = line_catalog();
        let config = MovnsConfig::default()
            .with_max_iterations(250)
            .with_max_seconds(10)
            .with_max_no_improve(250)
            .with_seed(1);
        let result = Movns::new(&cat, config).unwrap().run();
        for record in &result.history {
            assert_eq!(record.step % CHECKPOINT_EVERY, 0);
            assert!(record.front_size > 0);
        }
    }

    // ---- Building blocks ----

    #[test]
    fn test_initial_solution_is_valid() {
        let cat = line_catalog();
        let engine = Movns::new(&cat, MovnsConfig::default().with_seed(5)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let sol = engine.initial_solution(&mut rng);
            assert!(sol.route().is_valid(&cat));
            assert!(!sol.route().is_empty());
            assert!(sol.route().len() <= MAX_ROUTE_LEN);
        }
    }

    #[test]
    fn test_update_archive_rejects_dominated_candidate() {
        let cat = line_catalog();
        // Same stop set; the detoured order walks a longer path, so it
        // loses on time with everything else equal.
        let good = Solution::evaluate(Route::from_stops(&cat, &[0, 1, 2]), &cat);
        let worse = Solution::evaluate(Route::from_stops(&cat, &[0, 2, 1]), &cat);
        assert!(good.dominates(&worse));

        let mut archive = vec![good.clone()];
        let mut explored = HashMap::new();
        assert!(!update_archive(&cat, &mut archive, &mut explored, worse));
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_update_archive_evicts_dominated_incumbents() {
        let cat = line_catalog();
        let worse = Solution::evaluate(Route::from_stops(&cat, &[0, 2, 1]), &cat);
        let better = Solution::evaluate(Route::from_stops(&cat, &[0, 1, 2]), &cat);

        let mut archive = vec![worse.clone()];
        let mut explored = HashMap::new();
        explored
            .entry(solution_key(&worse))
            .or_insert_with(HashSet::new)
            .insert("transport-mode-change");

        assert!(update_archive(&cat, &mut archive, &mut explored, better.clone()));
        assert_eq!(archive.len(), 1);
        assert_eq!(archive[0], better);
        assert!(
            !explored.contains_key(&solution_key(&worse)),
            "evicted incumbents must drop their exploration state"
        );
    }

    #[test]
    fn test_update_archive_keeps_mutually_non_dominated() {
        let cat = line_catalog();
        let a = Solution::evaluate(Route::from_stops(&cat, &[0]), &cat);
        let b = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let mut archive = vec![a];
        let mut explored = HashMap::new();
        assert!(update_archive(&cat, &mut archive, &mut explored, b));
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_update_archive_rejects_duplicate() {
        let cat = line_catalog();
        let a = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let mut archive = vec![a.clone()];
        let mut explored = HashMap::new();
        assert!(!update_archive(&cat, &mut archive, &mut explored, a));
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_solution_key_stable_across_clones() {
        let cat = line_catalog();
        let a = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let b = a.clone();
        assert_eq!(solution_key(&a), solution_key(&b));

        let c = Solution::evaluate(Route::from_stops(&cat, &[1, 0]), &cat);
        assert_ne!(solution_key(&a), solution_key(&c));
    }

    #[test]
    fn test_selection_prefers_unexplored_solutions() {
        let cat = line_catalog();
        let a = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let b = Solution::evaluate(Route::from_stops(&cat, &[0]), &cat);
        let archive = vec![a.clone(), b.clone()];

        let mut explored = HashMap::new();
        let all: HashSet<&'static str> = Operator::ALL.iter().map(|op| op.name()).collect();
        explored.insert(solution_key(&a), all);

        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..10 {
            let picked = select_for_exploration(&archive, &mut explored, &mut rng);
            assert_eq!(*picked, b, "fully explored solutions must be skipped");
        }
    }

    #[test]
    fn test_selection_resets_when_everything_explored() {
        let cat = line_catalog();
        let a = Solution::evaluate(Route::from_stops(&cat, &[0, 1]), &cat);
        let archive = vec![a.clone()];

        let mut explored = HashMap::new();
        let all: HashSet<&'static str> = Operator::ALL.iter().map(|op| op.name()).collect();
        explored.insert(solution_key(&a), all);

        let mut rng = StdRng::seed_from_u64(0);
        let picked = select_for_exploration(&archive, &mut explored, &mut rng).clone();
        assert_eq!(picked, a);
        assert!(explored.is_empty(), "exploration state must reset");
    }
}
