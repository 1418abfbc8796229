//! Planning constants shared across the crate.
//!
//! All times are minutes; costs are in R$. These mirror the operating
//! assumptions of a single tourist day: the tour starts at 09:00, may not
//! exceed 14 hours of elapsed time, and walking is only attractive for
//! short hops.

/// Start of the touring day, in minutes from midnight (09:00).
pub const DAY_START: f64 = 540.0;

/// Maximum elapsed time for one day of touring, in minutes (14 h).
pub const DAILY_TIME_LIMIT: f64 = 840.0;

/// Walking is preferred over driving when the walking time between two
/// attractions is at most this many minutes. Walk segments above this
/// threshold are invalid.
pub const WALK_TIME_PREFERENCE: f64 = 15.0;

/// Driving cost per kilometre, in R$.
pub const COST_CAR_PER_KM: f64 = 6.0;

/// Fractional tolerance on [`DAILY_TIME_LIMIT`] before the overrun
/// penalty kicks in.
pub const TIME_TOLERANCE: f64 = 0.1;

/// Hard cap on the number of attractions in a single itinerary.
pub const MAX_ROUTE_LEN: usize = 8;
