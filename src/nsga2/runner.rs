//! The NSGA-II evolutionary loop.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::{Nsga2Config, Nsga2Error};
use super::individual::Individual;
use super::operators;
use crate::constants::MAX_ROUTE_LEN;
use crate::model::{Catalog, Solution};
use crate::pareto::{crowding_distance, non_dominated_sort};
use crate::progress::ProgressRecord;

/// Result of an NSGA-II run.
#[derive(Debug, Clone)]
pub struct Nsga2Result {
    /// Valid, non-empty members of the final non-dominated front.
    ///
    /// Raw engine output: duplicate elimination, thinning, and export
    /// ordering are applied separately by [`crate::filter`].
    pub solutions: Vec<Solution>,

    /// One checkpoint per generation with a non-empty feasible front.
    pub history: Vec<ProgressRecord>,

    /// Number of generations executed.
    pub generations: usize,
}

/// The NSGA-II engine, bound to a catalog for one run.
///
/// # Examples
///
/// ```no_run
/// use roteiro::model::Catalog;
/// use roteiro::nsga2::{Nsga2, Nsga2Config};
///
/// # fn demo(catalog: &Catalog) -> Result<(), roteiro::nsga2::Nsga2Error> {
/// let config = Nsga2Config::default()
///     .with_population_size(50)
///     .with_max_generations(100)
///     .with_seed(42);
/// let result = Nsga2::new(catalog, config)?.run()?;
/// println!("front size: {}", result.solutions.len());
/// # Ok(())
/// # }
/// ```
pub struct Nsga2<'a> {
    catalog: &'a Catalog,
    config: Nsga2Config,
}

impl<'a> Nsga2<'a> {
    /// Creates the engine, validating the configuration.
    pub fn new(catalog: &'a Catalog, config: Nsga2Config) -> Result<Self, Nsga2Error> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    /// Runs the evolutionary loop to completion.
    pub fn run(&self) -> Result<Nsga2Result, Nsga2Error> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let mut population = self.initial_population(&mut rng);
        self.evaluate_population(&mut population);
        assign_rank_and_crowding(&mut population)?;

        let mut history = Vec::with_capacity(self.config.max_generations);

        for generation in 0..self.config.max_generations {
            let mut offspring = self.create_offspring(&population, &mut rng);
            self.evaluate_population(&mut offspring);
            population = self.select_next_generation(population, offspring)?;

            if let Some(record) = self.front_record(generation, &population) {
                debug!(
                    generation,
                    front_size = record.front_size,
                    best_cost = record.best_cost,
                    best_time = record.best_time,
                    "generation checkpoint"
                );
                history.push(record);
            }
        }

        let solutions = self.final_front(&population);
        info!(
            generations = self.config.max_generations,
            front_size = solutions.len(),
            "nsga-ii finished"
        );
        Ok(Nsga2Result {
            solutions,
            history,
            generations: self.config.max_generations,
        })
    }

    /// Builds the initial population in three length regimes: one third
    /// near the route cap, one third medium, one third small — each a
    /// shuffled prefix of the attraction list.
    fn initial_population(&self, rng: &mut StdRng) -> Vec<Individual> {
        let n = self.catalog.len();
        let pop_size = self.config.population_size;
        let base: Vec<usize> = (0..n).collect();

        (0..pop_size)
            .map(|i| {
                let size = if i < pop_size / 3 {
                    MAX_ROUTE_LEN.min(n)
                } else if i < pop_size * 2 / 3 {
                    let lo = 3.min(n / 2).max(1);
                    let hi = 6.min(n).max(lo);
                    rng.random_range(lo..=hi)
                } else {
                    let hi = 4.min(n / 2).max(1);
                    rng.random_range(1..=hi)
                };
                let mut genes = base.clone();
                genes.shuffle(rng);
                genes.truncate(size);
                Individual::new(genes, self.catalog)
            })
            .collect()
    }

    /// Evaluates every individual, optionally in parallel.
    fn evaluate_population(&self, population: &mut [Individual]) {
        if self.config.parallel {
            population
                .par_iter_mut()
                .for_each(|ind| ind.evaluate(self.catalog));
        } else {
            for ind in population.iter_mut() {
                ind.evaluate(self.catalog);
            }
        }
    }

    /// Breeds a full offspring population via tournament selection,
    /// crossover, and mutation.
    fn create_offspring(&self, parents: &[Individual], rng: &mut StdRng) -> Vec<Individual> {
        let mut offspring = Vec::with_capacity(parents.len());
        while offspring.len() < parents.len() {
            let p1 = tournament(parents, rng);
            let p2 = tournament(parents, rng);
            if p1 == p2 && parents.len() > 1 {
                continue;
            }

            let mut genes = if rng.random_range(0.0..1.0) < self.config.crossover_rate {
                operators::crossover(
                    parents[p1].genes(),
                    parents[p2].genes(),
                    self.catalog.len(),
                    rng,
                )
            } else {
                parents[p1].genes().to_vec()
            };

            if rng.random_range(0.0..1.0) < self.config.mutation_rate {
                operators::mutate(&mut genes, self.catalog.len(), rng);
            }

            offspring.push(Individual::new(genes, self.catalog));
        }
        offspring
    }

    /// Environmental selection over `P ∪ Q` (Deb 2002, Section III-C):
    /// copy whole fronts while they fit, then fill from the split front
    /// by descending crowding distance.
    fn select_next_generation(
        &self,
        parents: Vec<Individual>,
        offspring: Vec<Individual>,
    ) -> Result<Vec<Individual>, Nsga2Error> {
        let mut combined: Vec<Option<Individual>> = parents
            .into_iter()
            .chain(offspring)
            .map(Some)
            .collect();
        let objectives: Vec<Vec<f64>> = combined
            .iter()
            .map(|ind| {
                ind.as_ref()
                    .expect("combined slots are filled before selection")
                    .objectives()
                    .to_vec()
            })
            .collect();

        let sorted = non_dominated_sort(&objectives)?;
        let target = self.config.population_size;
        let mut next = Vec::with_capacity(target);

        for (rank, front) in sorted.fronts.iter().enumerate() {
            let front_objectives: Vec<Vec<f64>> =
                front.iter().map(|&i| objectives[i].clone()).collect();
            let crowding = crowding_distance(&front_objectives)?;

            let mut members: Vec<(usize, f64)> =
                front.iter().copied().zip(crowding).collect();

            if next.len() + members.len() > target {
                members.sort_by(|a, b| {
                    b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal)
                });
                members.truncate(target - next.len());
            }

            for (idx, distance) in members {
                let mut ind = combined[idx]
                    .take()
                    .expect("each combined slot is consumed once");
                ind.set_rank(rank);
                ind.set_crowding(distance);
                next.push(ind);
            }

            if next.len() == target {
                break;
            }
        }

        Ok(next)
    }

    /// Valid, non-empty rank-0 members as solutions for a checkpoint.
    fn front_record(&self, generation: usize, population: &[Individual]) -> Option<ProgressRecord> {
        let front = self.feasible_front(population);
        ProgressRecord::from_front(generation, &front)
    }

    /// Final engine output: the feasible part of the last front, with
    /// structurally identical routes collapsed.
    fn final_front(&self, population: &[Individual]) -> Vec<Solution> {
        let mut seen = std::collections::HashSet::new();
        self.feasible_front(population)
            .into_iter()
            .filter(|sol| seen.insert(sol.route().clone()))
            .collect()
    }

    fn feasible_front(&self, population: &[Individual]) -> Vec<Solution> {
        population
            .iter()
            .filter(|ind| ind.rank() == 0)
            .filter_map(|ind| {
                let route = ind.build_route(self.catalog);
                (!route.is_empty() && route.is_valid(self.catalog))
                    .then(|| Solution::evaluate(route, self.catalog))
            })
            .collect()
    }
}

/// Binary tournament with the crowded-comparison operator: lower rank
/// wins, ties broken by larger crowding distance.
fn tournament<R: Rng>(population: &[Individual], rng: &mut R) -> usize {
    let a = rng.random_range(0..population.len());
    let b = rng.random_range(0..population.len());
    let (ia, ib) = (&population[a], &population[b]);
    if ia.rank() != ib.rank() {
        if ia.rank() < ib.rank() {
            a
        } else {
            b
        }
    } else if ia.crowding() >= ib.crowding() {
        a
    } else {
        b
    }
}

/// Sorts a freshly evaluated population and stamps rank and crowding on
/// every member, front by front.
fn assign_rank_and_crowding(population: &mut [Individual]) -> Result<(), Nsga2Error> {
    let objectives: Vec<Vec<f64>> = population
        .iter()
        .map(|ind| ind.objectives().to_vec())
        .collect();
    let sorted = non_dominated_sort(&objectives)?;
    for (rank, front) in sorted.fronts.iter().enumerate() {
        let front_objectives: Vec<Vec<f64>> =
            front.iter().map(|&i| objectives[i].clone()).collect();
        let crowding = crowding_distance(&front_objectives)?;
        for (&idx, distance) in front.iter().zip(crowding) {
            population[idx].set_rank(rank);
            population[idx].set_crowding(distance);
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
