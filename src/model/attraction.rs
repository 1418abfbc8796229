//! Attraction records.

use std::fmt::{self, Display, Formatter};

/// Minutes in a day; opening and closing times live in `[0, 1440)`.
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Errors raised when constructing an [`Attraction`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttractionError {
    /// Visit duration was negative.
    NegativeVisitTime(f64),
    /// Entrance cost was negative.
    NegativeCost(f64),
    /// Opening minute outside `[0, 1440)`.
    InvalidOpeningTime(u32),
    /// Closing minute outside `[0, 1440)`.
    InvalidClosingTime(u32),
}

impl Display for AttractionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeVisitTime(v) => {
                write!(f, "visit time must be non-negative (received {v})")
            }
            Self::NegativeCost(c) => write!(f, "cost must be non-negative (received {c})"),
            Self::InvalidOpeningTime(t) => {
                write!(f, "opening time must be within [0, 1440) (received {t})")
            }
            Self::InvalidClosingTime(t) => {
                write!(f, "closing time must be within [0, 1440) (received {t})")
            }
        }
    }
}

impl std::error::Error for AttractionError {}

/// A single visitable attraction.
///
/// Immutable once constructed; the catalog owns one record per attraction
/// for the whole run. A 24-hour attraction is encoded as `[0, 1439]`.
///
/// # Examples
///
/// ```
/// use roteiro::model::Attraction;
///
/// let a = Attraction::new(
///     "Mercado Central", "Centro", -19.923, -43.944,
///     90.0, 0.0, 480, 1080,
/// )
/// .unwrap();
/// assert!(a.is_open_at(540.0));
/// assert!(!a.is_open_at(1081.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Attraction {
    name: String,
    neighborhood: String,
    latitude: f64,
    longitude: f64,
    visit_time: f64,
    cost: f64,
    opening_time: u32,
    closing_time: u32,
}

impl Attraction {
    /// Creates an attraction, validating durations, cost, and hours.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        neighborhood: impl Into<String>,
        latitude: f64,
        longitude: f64,
        visit_time: f64,
        cost: f64,
        opening_time: u32,
        closing_time: u32,
    ) -> Result<Self, AttractionError> {
        if visit_time < 0.0 {
            return Err(AttractionError::NegativeVisitTime(visit_time));
        }
        if cost < 0.0 {
            return Err(AttractionError::NegativeCost(cost));
        }
        if opening_time >= MINUTES_PER_DAY {
            return Err(AttractionError::InvalidOpeningTime(opening_time));
        }
        if closing_time >= MINUTES_PER_DAY {
            return Err(AttractionError::InvalidClosingTime(closing_time));
        }
        Ok(Self {
            name: name.into(),
            neighborhood: neighborhood.into(),
            latitude,
            longitude,
            visit_time,
            cost,
            opening_time,
            closing_time,
        })
    }

    /// Attraction name, unique within a catalog.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Neighborhood tag (may be empty when the input had no such column).
    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    /// Geographic coordinates as `(latitude, longitude)`.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Visit duration in minutes.
    pub fn visit_time(&self) -> f64 {
        self.visit_time
    }

    /// Entrance fee in R$.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Opening minute-of-day.
    pub fn opening_time(&self) -> u32 {
        self.opening_time
    }

    /// Closing minute-of-day.
    pub fn closing_time(&self) -> u32 {
        self.closing_time
    }

    /// Whether the attraction is open at the given minute-of-day.
    ///
    /// Minutes outside the day are closed; `[0, 1439]` means always open.
    pub fn is_open_at(&self, minute: f64) -> bool {
        if minute < 0.0 || minute >= f64::from(MINUTES_PER_DAY) {
            return false;
        }
        if self.opening_time == 0 && self.closing_time == MINUTES_PER_DAY - 1 {
            return true;
        }
        minute >= f64::from(self.opening_time) && minute <= f64::from(self.closing_time)
    }
}
