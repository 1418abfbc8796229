//! Multi-objective day-tour itinerary optimization.
//!
//! Given a catalog of attractions (location, opening hours, visit time,
//! entrance fee, neighborhood) and precomputed origin–destination
//! matrices for driving and walking, this crate searches for
//! Pareto-approximate day itineraries that simultaneously:
//!
//! - minimize monetary cost,
//! - minimize elapsed time,
//! - maximize attractions visited,
//! - maximize distinct neighborhoods covered,
//!
//! under a daily time budget and a per-segment walking limit.
//!
//! Two metaheuristic engines are provided:
//!
//! - **NSGA-II** ([`nsga2`]): population-based, with fast non-dominated
//!   sorting, crowding distance, crowded tournament selection, and
//!   route-aware crossover/mutation operators.
//! - **MOVNS** ([`movns`]): a multi-objective variable neighborhood
//!   search over an archive of mutually non-dominated solutions, with
//!   six neighborhood structures and a transport-mode local search.
//!
//! Front quality is assessed with the exact [`hypervolume`] indicator
//! (HSO), and [`filter`] prepares fronts for export (deduplication,
//! ε-dominance thinning, canonical ordering). The [`io`] module reads
//! the semicolon-separated catalog/matrix formats and writes result and
//! history CSVs; wiring those into a command-line front end is left to
//! the embedding application.
//!
//! # Architecture
//!
//! Leaves first: [`transport`] wraps the OD matrices behind a
//! concurrent-read oracle; [`model`] builds the index-based domain
//! (attractions, catalog, routes with recomputed time-info, solutions
//! with cached objective vectors); [`pareto`] supplies the dominance
//! machinery both engines share. Everything above consumes these
//! through `&Catalog`, which pins solution lifetimes to the data they
//! reference.
//!
//! All objective vectors are **minimization**: the two maximization
//! axes are stored negated throughout (see [`model::Solution`]).

pub mod constants;
pub mod filter;
pub mod hypervolume;
pub mod io;
pub mod model;
pub mod movns;
pub mod nsga2;
pub mod pareto;
pub mod progress;
pub mod transport;
