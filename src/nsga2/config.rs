//! NSGA-II configuration.

use std::fmt::{self, Display, Formatter};

use crate::pareto::ShapeMismatch;

/// Errors produced by the NSGA-II engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Nsga2Error {
    /// Population size must be greater than zero.
    InvalidPopulationSize(usize),
    /// Number of generations must be at least one.
    InvalidGenerationCount(usize),
    /// Crossover probability outside `[0, 1]`.
    InvalidCrossoverRate(f64),
    /// Mutation probability outside `[0, 1]`.
    InvalidMutationRate(f64),
    /// Objective vectors disagreed on length — a programmer bug.
    Objective(ShapeMismatch),
}

impl Display for Nsga2Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPopulationSize(n) => {
                write!(f, "population size must be positive (received {n})")
            }
            Self::InvalidGenerationCount(n) => {
                write!(f, "generation count must be positive (received {n})")
            }
            Self::InvalidCrossoverRate(r) => {
                write!(f, "crossover rate must be within [0, 1] (received {r})")
            }
            Self::InvalidMutationRate(r) => {
                write!(f, "mutation rate must be within [0, 1] (received {r})")
            }
            Self::Objective(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Nsga2Error {}

impl From<ShapeMismatch> for Nsga2Error {
    fn from(err: ShapeMismatch) -> Self {
        Self::Objective(err)
    }
}

/// Configuration for the NSGA-II engine.
///
/// # Defaults
///
/// ```
/// use roteiro::nsga2::Nsga2Config;
///
/// let config = Nsga2Config::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use roteiro::nsga2::Nsga2Config;
///
/// let config = Nsga2Config::default()
///     .with_population_size(50)
///     .with_max_generations(200)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Nsga2Config {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Number of generations to evolve.
    pub max_generations: usize,

    /// Probability of applying crossover to a selected pair (0.0–1.0).
    ///
    /// When crossover is skipped, the first parent's chromosome is cloned.
    pub crossover_rate: f64,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Whether to evaluate individuals in parallel using rayon.
    ///
    /// Evaluation is a pure function of the chromosome, so results are
    /// identical either way for a fixed seed.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for Nsga2Config {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            crossover_rate: 0.9,
            mutation_rate: 0.1,
            parallel: false,
            seed: None,
        }
    }
}

impl Nsga2Config {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration; construction-time errors are fatal.
    pub fn validate(&self) -> Result<(), Nsga2Error> {
        if self.population_size == 0 {
            return Err(Nsga2Error::InvalidPopulationSize(self.population_size));
        }
        if self.max_generations == 0 {
            return Err(Nsga2Error::InvalidGenerationCount(self.max_generations));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(Nsga2Error::InvalidCrossoverRate(self.crossover_rate));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Nsga2Error::InvalidMutationRate(self.mutation_rate));
        }
        Ok(())
    }
}
