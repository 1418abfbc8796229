//! Progress checkpoints recorded by the engines.

use crate::model::Solution;

/// One checkpoint row: the state of the current non-dominated front at a
/// generation (NSGA-II) or iteration (MOVNS) boundary.
///
/// Rendered to CSV by [`crate::io::export::write_history`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    /// Generation or iteration number.
    pub step: usize,
    /// Size of the non-dominated front at this checkpoint.
    pub front_size: usize,
    /// Lowest cost on the front.
    pub best_cost: f64,
    /// Lowest (penalized) time on the front.
    pub best_time: f64,
    /// Largest attraction count on the front.
    pub max_attractions: usize,
    /// Largest neighborhood count on the front.
    pub max_neighborhoods: usize,
}

impl ProgressRecord {
    /// Summarizes a front of solutions; `None` when the front is empty.
    pub fn from_front<'a, I>(step: usize, front: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Solution>,
    {
        let mut record: Option<ProgressRecord> = None;
        let mut size = 0usize;
        for solution in front {
            size += 1;
            let entry = record.get_or_insert(ProgressRecord {
                step,
                front_size: 0,
                best_cost: f64::INFINITY,
                best_time: f64::INFINITY,
                max_attractions: 0,
                max_neighborhoods: 0,
            });
            entry.best_cost = entry.best_cost.min(solution.total_cost());
            entry.best_time = entry.best_time.min(solution.total_time());
            entry.max_attractions = entry.max_attractions.max(solution.num_attractions());
            entry.max_neighborhoods = entry.max_neighborhoods.max(solution.num_neighborhoods());
        }
        if let Some(ref mut record) = record {
            record.front_size = size;
        }
        record
    }
}
