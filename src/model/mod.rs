//! Domain model for day-tour itineraries.
//!
//! The model is index-based: a [`Catalog`] owns the attraction records and
//! the transport oracle, and resolves every attraction to its matrix row
//! once, at construction. [`Route`]s and [`Solution`]s then refer to
//! attractions exclusively by catalog index, which keeps them cheap to
//! clone and impossible to dangle — every computation borrows the catalog
//! it was built against.
//!
//! # Key Types
//!
//! - [`Attraction`]: immutable record (location, hours, visit time, fee)
//! - [`Catalog`]: attraction set bound to [`crate::transport::TravelMatrices`]
//! - [`Route`]: ordered stops + transport modes + recomputed time-info
//! - [`Solution`]: a route with its cached objective vector

mod attraction;
mod catalog;
mod route;
mod solution;

pub use attraction::{Attraction, AttractionError};
pub use catalog::{Catalog, CatalogError};
pub use route::{Route, TimeInfo};
pub use solution::{Solution, EMPTY_ROUTE_OBJECTIVES, NUM_OBJECTIVES};
