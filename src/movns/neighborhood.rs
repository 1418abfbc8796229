//! Neighborhood operators.
//!
//! Each operator perturbs one solution in O(k) work on a k-stop route
//! and hands back a new, valid solution — or the original unchanged when
//! no valid neighbor turns up within its retry budget. Transport modes
//! on rebuilt segments are always re-derived from the mode preference,
//! which keeps the walking cap respected by construction; the only
//! operator that sets a mode directly checks the cap itself.

use rand::Rng;

use crate::constants::{MAX_ROUTE_LEN, WALK_TIME_PREFERENCE};
use crate::model::{Catalog, Route, Solution};
use crate::transport::TransportMode;

/// Internal retries before an operator gives up and returns the
/// original solution.
const OPERATOR_RETRIES: usize = 10;

/// The six neighborhood structures of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Flip one segment's transport mode.
    TransportModeChange,
    /// Remove one attraction and reinsert it elsewhere.
    LocationReallocation,
    /// Swap two non-adjacent positions.
    LocationExchange,
    /// Reverse a subsequence of length at least two.
    SubsequenceInversion,
    /// Add an unseen attraction, or substitute one into an existing slot.
    LocationReplacement,
    /// Drop a random position, keeping at least one stop.
    AttractionRemoval,
}

impl Operator {
    /// Every operator, in a fixed order; selection draws a uniform index.
    pub const ALL: [Operator; 6] = [
        Operator::TransportModeChange,
        Operator::LocationReallocation,
        Operator::LocationExchange,
        Operator::SubsequenceInversion,
        Operator::LocationReplacement,
        Operator::AttractionRemoval,
    ];

    /// Stable name used by the exploration-state bookkeeping.
    pub fn name(self) -> &'static str {
        match self {
            Operator::TransportModeChange => "transport-mode-change",
            Operator::LocationReallocation => "location-reallocation",
            Operator::LocationExchange => "location-exchange",
            Operator::SubsequenceInversion => "subsequence-inversion",
            Operator::LocationReplacement => "location-replacement",
            Operator::AttractionRemoval => "attraction-removal",
        }
    }

    /// Produces a random valid neighbor, or a clone of `solution` when
    /// none is found.
    ///
    /// Degenerate route lengths fall through where the structure demands
    /// it: exchanging on a 2-stop route and inverting on fewer than 3
    /// stops both degrade to replacement.
    pub fn apply<R: Rng>(self, solution: &Solution, catalog: &Catalog, rng: &mut R) -> Solution {
        for _ in 0..OPERATOR_RETRIES {
            let candidate = self.candidate(solution.route(), catalog, rng);
            if let Some(route) = candidate {
                if !route.is_empty()
                    && route.is_valid(catalog)
                    && route != *solution.route()
                {
                    return Solution::evaluate(route, catalog);
                }
            }
        }
        solution.clone()
    }

    fn candidate<R: Rng>(self, route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
        match self {
            Operator::TransportModeChange => transport_mode_change(route, catalog, rng),
            Operator::LocationReallocation => location_reallocation(route, catalog, rng),
            Operator::LocationExchange => {
                if route.len() <= 2 {
                    location_replacement(route, catalog, rng)
                } else {
                    location_exchange(route, catalog, rng)
                }
            }
            Operator::SubsequenceInversion => {
                if route.len() < 3 {
                    location_replacement(route, catalog, rng)
                } else {
                    subsequence_inversion(route, catalog, rng)
                }
            }
            Operator::LocationReplacement => location_replacement(route, catalog, rng),
            Operator::AttractionRemoval => attraction_removal(route, catalog, rng),
        }
    }
}

/// Flips one segment's mode, rejecting walks over the cap.
fn transport_mode_change<R: Rng>(route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
    if route.len() < 2 {
        return None;
    }
    let seg = rng.random_range(0..route.modes().len());
    let new_mode = route.modes()[seg].other();
    if new_mode == TransportMode::Walk {
        let (from, to) = (route.stops()[seg], route.stops()[seg + 1]);
        if catalog.travel_time(from, to, TransportMode::Walk) > WALK_TIME_PREFERENCE {
            return None;
        }
    }
    let mut neighbor = route.clone();
    neighbor.set_mode(catalog, seg, new_mode);
    Some(neighbor)
}

/// Moves one stop to a different position.
fn location_reallocation<R: Rng>(route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
    if route.len() < 2 {
        return None;
    }
    let src = rng.random_range(0..route.len());
    let mut dest = rng.random_range(0..route.len());
    while dest == src {
        dest = rng.random_range(0..route.len());
    }
    let mut neighbor = route.clone();
    let stop = neighbor.stops()[src];
    neighbor.remove(catalog, src);
    neighbor.insert(catalog, stop, dest.min(neighbor.len()), None);
    Some(neighbor)
}

/// Swaps two non-adjacent stops. Requires at least three stops.
fn location_exchange<R: Rng>(route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
    let k = route.len();
    let i = rng.random_range(0..k);
    let mut j = rng.random_range(0..k);
    let mut guard = 0;
    while j == i || i.abs_diff(j) == 1 {
        j = rng.random_range(0..k);
        guard += 1;
        if guard > 32 {
            return None;
        }
    }
    let mut neighbor = route.clone();
    neighbor.swap(catalog, i, j);
    Some(neighbor)
}

/// Reverses a random subsequence of length at least two, re-deriving
/// every mode in the rebuilt order.
fn subsequence_inversion<R: Rng>(route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
    let k = route.len();
    let start = rng.random_range(0..k - 1);
    let end = rng.random_range(start + 1..k);
    let mut stops = route.stops().to_vec();
    stops[start..=end].reverse();
    Some(Route::from_stops(catalog, &stops))
}

/// Adds an unseen attraction at a random position — preferred while the
/// route is under the cap — or substitutes one into an existing slot.
fn location_replacement<R: Rng>(route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
    let unseen: Vec<usize> = (0..catalog.len())
        .filter(|idx| !route.stops().contains(idx))
        .collect();
    if unseen.is_empty() {
        return None;
    }
    let incoming = unseen[rng.random_range(0..unseen.len())];

    let mut neighbor = route.clone();
    if route.len() < MAX_ROUTE_LEN {
        let pos = rng.random_range(0..=route.len());
        neighbor.insert(catalog, incoming, pos, None);
    } else {
        let pos = rng.random_range(0..route.len());
        let mut stops = route.stops().to_vec();
        stops[pos] = incoming;
        neighbor = Route::from_stops(catalog, &stops);
    }
    Some(neighbor)
}

/// Drops a random stop, preserving at least one.
fn attraction_removal<R: Rng>(route: &Route, catalog: &Catalog, rng: &mut R) -> Option<Route> {
    if route.len() < 2 {
        return None;
    }
    let pos = rng.random_range(0..route.len());
    let mut neighbor = route.clone();
    neighbor.remove(catalog, pos);
    Some(neighbor)
}

// ============================================================================
// Tests
// ============================================================================
