//! Result and history CSV writers.
//!
//! Both formats are semicolon-separated with pipe-separated lists and
//! `HH:MM` times, one row per solution or checkpoint.

use std::io::{self, Write};

use itertools::Itertools;

use crate::constants::DAY_START;
use crate::model::{Catalog, Solution};
use crate::progress::ProgressRecord;

/// Header of the result CSV.
const SOLUTIONS_HEADER: &str = "id;cost;time;n_attractions;n_neighborhoods;start_hhmm;end_hhmm;\
neighborhood_list;attraction_sequence;arrival_times;departure_times;modes";

/// Header of the checkpoint history CSV.
const HISTORY_HEADER: &str =
    "generation;front_size;best_cost;best_time;max_attractions;max_neighborhoods";

/// Renders a minute-of-day as `HH:MM`.
pub fn format_hhmm(minutes: f64) -> String {
    let total = minutes.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Writes the result CSV, one line per solution.
///
/// Callers usually pass the output of [`crate::filter::prepare_export`];
/// an empty slice produces just the header.
pub fn write_solutions<W: Write>(
    w: &mut W,
    catalog: &Catalog,
    solutions: &[Solution],
) -> io::Result<()> {
    writeln!(w, "{SOLUTIONS_HEADER}")?;
    for (id, solution) in solutions.iter().enumerate() {
        let route = solution.route();
        let end = DAY_START + route.total_time(catalog);

        let neighborhoods = route
            .stops()
            .iter()
            .map(|&s| catalog.attraction(s).neighborhood())
            .unique()
            .join("|");
        let sequence = route
            .stops()
            .iter()
            .map(|&s| catalog.attraction(s).name())
            .join("|");
        let arrivals = route.times().iter().map(|t| format_hhmm(t.arrival)).join("|");
        let departures = route
            .times()
            .iter()
            .map(|t| format_hhmm(t.departure))
            .join("|");
        let modes = route.modes().iter().map(|m| m.label()).join("|");

        writeln!(
            w,
            "{};{:.2};{:.2};{};{};{};{};{};{};{};{};{}",
            id + 1,
            solution.total_cost(),
            solution.total_time(),
            solution.num_attractions(),
            solution.num_neighborhoods(),
            format_hhmm(DAY_START),
            format_hhmm(end),
            neighborhoods,
            sequence,
            arrivals,
            departures,
            modes,
        )?;
    }
    Ok(())
}

/// Writes the checkpoint history CSV.
pub fn write_history<W: Write>(w: &mut W, records: &[ProgressRecord]) -> io::Result<()> {
    writeln!(w, "{HISTORY_HEADER}")?;
    for record in records {
        writeln!(
            w,
            "{};{};{:.2};{:.2};{};{}",
            record.step,
            record.front_size,
            record.best_cost,
            record.best_time,
            record.max_attractions,
            record.max_neighborhoods,
        )?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
