//! NSGA-II engine for itinerary optimization.
//!
//! A gene-level non-dominated-sorting genetic algorithm over variable
//! length attraction sequences. Individuals carry a chromosome of catalog
//! indices plus one transport mode per segment; evaluation runs the
//! constraint-aware route pipeline and infeasible individuals compete
//! with bounded penalty objectives until the sort buries them.
//!
//! # Key Types
//!
//! - [`Nsga2Config`]: population size, generations, operator rates, seed
//! - [`Nsga2`]: the engine, bound to a [`crate::model::Catalog`]
//! - [`Nsga2Result`]: final front plus per-generation history
//!
//! # References
//!
//! - Deb, Pratap, Agarwal & Meyarivan (2002), "A Fast and Elitist
//!   Multiobjective Genetic Algorithm: NSGA-II"

mod config;
mod individual;
mod operators;
mod runner;

pub use config::{Nsga2Config, Nsga2Error};
pub use individual::Individual;
pub use runner::{Nsga2, Nsga2Result};
