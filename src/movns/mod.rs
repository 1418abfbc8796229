//! Multi-objective Variable Neighborhood Search engine.
//!
//! MOVNS keeps an approximation set of mutually non-dominated solutions
//! and, each iteration, shakes one of them through a randomly chosen
//! neighborhood operator, polishes the neighbor with a transport-mode
//! local search, and merges the result back into the set. Exploration
//! state per solution records which operators have already failed to
//! improve it, steering selection toward fresh ground.
//!
//! # Key Types
//!
//! - [`MovnsConfig`]: iteration, wall-clock, and stall limits plus seed
//! - [`Operator`]: the six neighborhood structures
//! - [`Movns`]: the engine, bound to a [`crate::model::Catalog`]
//! - [`MovnsResult`]: final approximation set plus checkpoint history
//!
//! # References
//!
//! - Mladenović & Hansen (1997), "Variable neighborhood search",
//!   Computers & Operations Research 24(11)
//! - Geiger (2008) on multi-objective VNS archives

mod config;
mod neighborhood;
mod runner;

pub use config::{MovnsConfig, MovnsError};
pub use neighborhood::Operator;
pub use runner::{Movns, MovnsResult};
