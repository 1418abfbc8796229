//! Itinerary routes and their time bookkeeping.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use crate::constants::{DAILY_TIME_LIMIT, DAY_START, WALK_TIME_PREFERENCE};
use crate::model::Catalog;
use crate::transport::TransportMode;

/// Computed timing for one stop of a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeInfo {
    /// Minute-of-day the tourist arrives (after any wait).
    pub arrival: f64,
    /// Minute-of-day the tourist leaves (`arrival + visit_time`).
    pub departure: f64,
    /// Minutes spent waiting for the attraction to open.
    pub wait: f64,
}

/// An ordered day itinerary: attraction indices, one transport mode per
/// segment, and per-stop timing rebuilt after every structural change.
///
/// Stops are catalog indices (see [`Catalog`]); every operation that needs
/// travel data takes the catalog it was built against.
///
/// Mode handling: passing `None` to [`push`](Route::push) or
/// [`insert`](Route::insert) picks the preferred mode for the segment, and
/// an explicit `Walk` request whose walking time exceeds
/// [`WALK_TIME_PREFERENCE`] is upgraded to `Car` — a route cannot be built
/// with an illegal walk through these operations. [`set_mode`](Route::set_mode)
/// is the raw knob and leaves legality to [`is_valid`](Route::is_valid).
///
/// # Examples
///
/// ```
/// use roteiro::model::{Attraction, Catalog, Route};
/// use roteiro::transport::TravelMatrices;
///
/// let matrices = TravelMatrices::from_tables(
///     vec!["A".into(), "B".into()],
///     vec![vec![0.0, 500.0], vec![500.0, 0.0]],
///     vec![vec![0.0, 700.0], vec![700.0, 0.0]],
///     vec![vec![0.0, 5.0], vec![5.0, 0.0]],
///     vec![vec![0.0, 10.0], vec![10.0, 0.0]],
/// )
/// .unwrap();
/// let catalog = Catalog::new(
///     vec![
///         Attraction::new("A", "Centro", 0.0, 0.0, 60.0, 10.0, 0, 1439).unwrap(),
///         Attraction::new("B", "Centro", 0.0, 0.0, 30.0, 20.0, 540, 900).unwrap(),
///     ],
///     matrices,
/// )
/// .unwrap();
///
/// let mut route = Route::new();
/// route.push(&catalog, 0, None);
/// route.push(&catalog, 1, None);
/// assert_eq!(route.len(), 2);
/// assert!(route.is_valid(&catalog));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Route {
    stops: Vec<usize>,
    modes: Vec<TransportMode>,
    times: Vec<TimeInfo>,
}

impl Route {
    /// Creates an empty route.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a route from a stop sequence, deriving every mode.
    pub fn from_stops(catalog: &Catalog, stops: &[usize]) -> Self {
        let mut route = Self::new();
        for &idx in stops {
            route.push(catalog, idx, None);
        }
        route
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the route has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Catalog indices of the stops, in visit order.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Transport mode of each segment (`len() - 1` entries).
    pub fn modes(&self) -> &[TransportMode] {
        &self.modes
    }

    /// Timing for each stop, parallel to [`stops`](Route::stops).
    pub fn times(&self) -> &[TimeInfo] {
        &self.times
    }

    /// Appends a stop.
    pub fn push(&mut self, catalog: &Catalog, idx: usize, mode: Option<TransportMode>) {
        if let Some(&prev) = self.stops.last() {
            self.modes.push(resolve_mode(catalog, prev, idx, mode));
        }
        self.stops.push(idx);
        self.recalculate(catalog);
    }

    /// Inserts a stop at `pos` (`pos <= len`).
    ///
    /// The `mode` applies to the segment arriving at the new stop; the
    /// segment leaving it (and, at the front, the segment into the old
    /// first stop) is re-derived from the mode preference.
    pub fn insert(
        &mut self,
        catalog: &Catalog,
        idx: usize,
        pos: usize,
        mode: Option<TransportMode>,
    ) {
        assert!(pos <= self.stops.len(), "insert position out of range");
        if self.stops.is_empty() {
            self.stops.push(idx);
            self.recalculate(catalog);
            return;
        }
        self.stops.insert(pos, idx);
        if pos == 0 {
            let next = self.stops[1];
            self.modes.insert(0, resolve_mode(catalog, idx, next, mode));
        } else if pos == self.stops.len() - 1 {
            let prev = self.stops[pos - 1];
            self.modes.push(resolve_mode(catalog, prev, idx, mode));
        } else {
            let prev = self.stops[pos - 1];
            let next = self.stops[pos + 1];
            self.modes[pos - 1] = resolve_mode(catalog, prev, idx, mode);
            self.modes
                .insert(pos, resolve_mode(catalog, idx, next, None));
        }
        self.recalculate(catalog);
    }

    /// Removes the stop at `i`, re-deriving the bridging segment's mode.
    pub fn remove(&mut self, catalog: &Catalog, i: usize) {
        assert!(i < self.stops.len(), "remove index out of range");
        self.stops.remove(i);
        if self.stops.is_empty() {
            self.modes.clear();
        } else if i == 0 {
            self.modes.remove(0);
        } else if i == self.stops.len() {
            self.modes.pop();
        } else {
            self.modes.remove(i);
            let (prev, next) = (self.stops[i - 1], self.stops[i]);
            self.modes[i - 1] = resolve_mode(catalog, prev, next, None);
        }
        self.recalculate(catalog);
    }

    /// Swaps the stops at `i` and `j`, re-deriving the touched segments.
    pub fn swap(&mut self, catalog: &Catalog, i: usize, j: usize) {
        assert!(
            i < self.stops.len() && j < self.stops.len(),
            "swap index out of range"
        );
        self.stops.swap(i, j);
        let mut touched: Vec<usize> = Vec::with_capacity(4);
        for p in [i, j] {
            if p > 0 {
                touched.push(p - 1);
            }
            if p < self.modes.len() {
                touched.push(p);
            }
        }
        touched.sort_unstable();
        touched.dedup();
        for seg in touched {
            let (from, to) = (self.stops[seg], self.stops[seg + 1]);
            self.modes[seg] = resolve_mode(catalog, from, to, None);
        }
        self.recalculate(catalog);
    }

    /// Overwrites the mode of segment `seg` without the walk-cap upgrade.
    ///
    /// Used by neighborhood operators probing mode flips; validity must be
    /// re-checked by the caller.
    pub fn set_mode(&mut self, catalog: &Catalog, seg: usize, mode: TransportMode) {
        assert!(seg < self.modes.len(), "segment index out of range");
        self.modes[seg] = mode;
        self.recalculate(catalog);
    }

    /// Removes every stop.
    pub fn clear(&mut self) {
        self.stops.clear();
        self.modes.clear();
        self.times.clear();
    }

    /// Rebuilds the time-info array from scratch.
    ///
    /// Single forward pass: start the clock at [`DAY_START`], pad with a
    /// wait whenever the clock is before an opening time, visit, then
    /// travel to the next stop.
    fn recalculate(&mut self, catalog: &Catalog) {
        self.times.clear();
        self.times.reserve(self.stops.len());
        let mut t = DAY_START;
        for (i, &stop) in self.stops.iter().enumerate() {
            let attraction = catalog.attraction(stop);
            let opening = f64::from(attraction.opening_time());
            let wait = if t < opening { opening - t } else { 0.0 };
            t += wait;
            let arrival = t;
            t += attraction.visit_time();
            self.times.push(TimeInfo {
                arrival,
                departure: t,
                wait,
            });
            if i + 1 < self.stops.len() {
                t += catalog.travel_time(stop, self.stops[i + 1], self.modes[i]);
            }
        }
    }

    /// Total monetary cost: entrance fees plus segment costs.
    pub fn total_cost(&self, catalog: &Catalog) -> f64 {
        let entrances: f64 = self
            .stops
            .iter()
            .map(|&s| catalog.attraction(s).cost())
            .sum();
        let travel: f64 = self
            .segments()
            .map(|(from, to, mode)| catalog.travel_cost(from, to, mode))
            .sum();
        entrances + travel
    }

    /// Total elapsed time: visits plus waits plus travels.
    pub fn total_time(&self, catalog: &Catalog) -> f64 {
        let visits: f64 = self
            .stops
            .iter()
            .map(|&s| catalog.attraction(s).visit_time())
            .sum();
        let waits: f64 = self.times.iter().map(|t| t.wait).sum();
        let travel: f64 = self
            .segments()
            .map(|(from, to, mode)| catalog.travel_time(from, to, mode))
            .sum();
        visits + waits + travel
    }

    /// Number of distinct neighborhood tags visited.
    pub fn distinct_neighborhoods(&self, catalog: &Catalog) -> usize {
        self.stops
            .iter()
            .map(|&s| catalog.attraction(s).neighborhood())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Whether every stop is visited inside its opening window, the day
    /// fits the time budget, and no walk segment exceeds the cap.
    pub fn is_valid(&self, catalog: &Catalog) -> bool {
        self.windows_respected(catalog)
            && self.total_time(catalog) <= DAILY_TIME_LIMIT
            && self.walking_capped(catalog)
    }

    /// Every arrival and departure lies inside its opening window.
    pub fn windows_respected(&self, catalog: &Catalog) -> bool {
        self.stops.iter().zip(&self.times).all(|(&s, info)| {
            let a = catalog.attraction(s);
            a.is_open_at(info.arrival) && a.is_open_at(info.departure)
        })
    }

    /// No walk segment takes longer than [`WALK_TIME_PREFERENCE`].
    pub fn walking_capped(&self, catalog: &Catalog) -> bool {
        self.segments().all(|(from, to, mode)| {
            mode != TransportMode::Walk
                || catalog.travel_time(from, to, TransportMode::Walk) <= WALK_TIME_PREFERENCE
        })
    }

    /// Iterates `(from, to, mode)` over the route's segments.
    fn segments(&self) -> impl Iterator<Item = (usize, usize, TransportMode)> + '_ {
        self.stops
            .windows(2)
            .zip(&self.modes)
            .map(|(pair, &mode)| (pair[0], pair[1], mode))
    }
}

/// Routes compare by structure (stops + modes); timing is derived.
impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.stops == other.stops && self.modes == other.modes
    }
}

impl Eq for Route {}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.stops.hash(state);
        self.modes.hash(state);
    }
}

/// Applies mode defaulting and the mandatory walk→car upgrade.
fn resolve_mode(
    catalog: &Catalog,
    from: usize,
    to: usize,
    mode: Option<TransportMode>,
) -> TransportMode {
    match mode {
        None => catalog.preferred_mode(from, to),
        Some(TransportMode::Walk)
            if catalog.travel_time(from, to, TransportMode::Walk) > WALK_TIME_PREFERENCE =>
        {
            TransportMode::Car
        }
        Some(m) => m,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attraction;
    use crate::transport::TravelMatrices;

    /// Catalog of three attractions where A↔B is walkable (10 min) and C
    /// is far from everything.
    fn catalog() -> Catalog {
        let matrices = TravelMatrices::from_tables(
            vec!["A".into(), "B".into(), "C".into()],
            vec![
                vec![0.0, 500.0, 8000.0],
                vec![500.0, 0.0, 7000.0],
                vec![8000.0, 7000.0, 0.0],
            ],
            vec![
                vec![0.0, 800.0, 9000.0],
                vec![800.0, 0.0, 8000.0],
                vec![9000.0, 8000.0, 0.0],
            ],
            vec![
                vec![0.0, 5.0, 18.0],
                vec![5.0, 0.0, 16.0],
                vec![18.0, 16.0, 0.0],
            ],
            vec![
                vec![0.0, 10.0, 90.0],
                vec![10.0, 0.0, 80.0],
                vec![90.0, 80.0, 0.0],
            ],
        )
        .unwrap();
        Catalog::new(
            vec![
                Attraction::new("A", "Centro", 0.0, 0.0, 60.0, 10.0, 0, 1439).unwrap(),
                Attraction::new("B", "Savassi", 0.0, 0.0, 30.0, 20.0, 540, 900).unwrap(),
                Attraction::new("C", "Pampulha", 0.0, 0.0, 45.0, 15.0, 600, 1080).unwrap(),
            ],
            matrices,
        )
        .unwrap()
    }

    // ---- Timing ----

    #[test]
    fn test_two_stop_walk_itinerary_timing_and_cost() {
        let cat = catalog();
        let route = Route::from_stops(&cat, &[0, 1]);

        assert_eq!(route.modes(), &[TransportMode::Walk]);
        let times = route.times();
        assert_eq!(times[0].arrival, 540.0);
        assert_eq!(times[0].departure, 600.0);
        assert_eq!(times[1].arrival, 610.0);
        assert_eq!(times[1].departure, 640.0);
        assert_eq!(route.total_time(&cat), 100.0);
        // Walking is free: entrance fees only.
        assert_eq!(route.total_cost(&cat), 30.0);
        assert!(route.is_valid(&cat));
    }

    #[test]
    fn test_two_stop_car_itinerary_timing_and_cost() {
        let cat = catalog();
        let mut route = Route::new();
        route.push(&cat, 0, None);
        route.push(&cat, 1, Some(TransportMode::Car));

        let times = route.times();
        assert_eq!(times[1].arrival, 605.0);
        assert_eq!(route.total_time(&cat), 95.0);
        // 500 m by car at R$6/km on top of the entrance fees.
        assert!((route.total_cost(&cat) - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_wait_pads_early_arrival() {
        let cat = catalog();
        // C opens at 600; arriving from A by car at 540 + 60 + 18 = 618, no
        // wait. Starting the day at C directly means waiting 600 - 540 = 60.
        let route = Route::from_stops(&cat, &[2]);
        let info = route.times()[0];
        assert_eq!(info.wait, 60.0);
        assert_eq!(info.arrival, 600.0);
        assert_eq!(info.departure, 645.0);
        assert_eq!(route.total_time(&cat), 105.0);
    }

    #[test]
    fn test_departure_minus_arrival_is_visit_time_after_mutations() {
        let cat = catalog();
        let mut route = Route::from_stops(&cat, &[0, 1, 2]);
        route.swap(&cat, 0, 2);
        route.remove(&cat, 1);
        route.insert(&cat, 1, 1, None);
        route.push(&cat, 2, None);

        for (&stop, info) in route.stops().iter().zip(route.times()) {
            let visit = cat.attraction(stop).visit_time();
            assert!(
                (info.departure - info.arrival - visit).abs() < 1e-9,
                "stop {stop}: departure - arrival = {}, visit = {visit}",
                info.departure - info.arrival
            );
        }
    }

    #[test]
    fn test_consecutive_arrivals_account_for_travel() {
        let cat = catalog();
        let route = Route::from_stops(&cat, &[0, 1, 2]);
        for i in 0..route.len() - 1 {
            let travel = cat.travel_time(route.stops()[i], route.stops()[i + 1], route.modes()[i]);
            let lhs = route.times()[i + 1].arrival;
            let rhs = route.times()[i].departure + travel;
            assert!(
                lhs >= rhs - 1e-9,
                "arrival {lhs} must be at least departure + travel = {rhs}"
            );
        }
    }

    // ---- Mode handling ----

    #[test]
    fn test_forced_walk_beyond_cap_is_upgraded_to_car() {
        let cat = catalog();
        let mut route = Route::new();
        route.push(&cat, 0, None);
        // A→C walking takes 90 min, far over the cap.
        route.push(&cat, 2, Some(TransportMode::Walk));
        assert_eq!(route.modes(), &[TransportMode::Car]);
        assert!(route.is_valid(&cat));
    }

    #[test]
    fn test_raw_walk_segment_over_cap_fails_validation() {
        let cat = catalog();
        let mut route = Route::from_stops(&cat, &[0, 2]);
        route.set_mode(&cat, 0, TransportMode::Walk);
        assert!(!route.walking_capped(&cat));
        assert!(!route.is_valid(&cat));
    }

    #[test]
    fn test_default_mode_is_preferred_mode() {
        let cat = catalog();
        let route = Route::from_stops(&cat, &[0, 1, 2]);
        assert_eq!(
            route.modes(),
            &[TransportMode::Walk, TransportMode::Car],
            "A→B walkable, B→C not"
        );
    }

    // ---- Structural operations ----

    #[test]
    fn test_insert_front_and_middle_fix_modes() {
        let cat = catalog();
        let mut route = Route::from_stops(&cat, &[0, 1]);
        route.insert(&cat, 2, 1, None);
        assert_eq!(route.stops(), &[0, 2, 1]);
        assert_eq!(route.modes().len(), 2);
        assert_eq!(route.modes()[0], TransportMode::Car);

        route.insert(&cat, 1, 0, None);
        assert_eq!(route.stops(), &[1, 0, 2, 1]);
        assert_eq!(route.modes()[0], TransportMode::Walk);
    }

    #[test]
    fn test_remove_bridges_with_preferred_mode() {
        let cat = catalog();
        let mut route = Route::from_stops(&cat, &[0, 2, 1]);
        route.remove(&cat, 1);
        assert_eq!(route.stops(), &[0, 1]);
        assert_eq!(route.modes(), &[TransportMode::Walk]);
    }

    #[test]
    fn test_remove_last_and_first() {
        let cat = catalog();
        let mut route = Route::from_stops(&cat, &[0, 1, 2]);
        route.remove(&cat, 2);
        assert_eq!(route.stops(), &[0, 1]);
        assert_eq!(route.modes().len(), 1);
        route.remove(&cat, 0);
        assert_eq!(route.stops(), &[1]);
        assert!(route.modes().is_empty());
        route.remove(&cat, 0);
        assert!(route.is_empty());
        assert!(route.modes().is_empty());
    }

    #[test]
    fn test_clear() {
        let cat = catalog();
        let mut route = Route::from_stops(&cat, &[0, 1, 2]);
        route.clear();
        assert!(route.is_empty());
        assert!(route.times().is_empty());
        assert_eq!(route.total_time(&cat), 0.0);
        assert!(route.is_valid(&cat));
    }

    // ---- Validity ----

    #[test]
    fn test_window_violation_detected() {
        let cat = catalog();
        // B closes at 900. Visiting A then C then B arrives at B well
        // before closing; shrink the day instead by a late-opening stop.
        let matrices = cat.matrices().clone();
        let late = Catalog::new(
            vec![
                Attraction::new("A", "Centro", 0.0, 0.0, 60.0, 10.0, 0, 1439).unwrap(),
                Attraction::new("B", "Savassi", 0.0, 0.0, 30.0, 20.0, 540, 615).unwrap(),
                Attraction::new("C", "Pampulha", 0.0, 0.0, 45.0, 15.0, 600, 1080).unwrap(),
            ],
            matrices,
        )
        .unwrap();
        // Arrive at B at 610, depart 640 — after its 615 close.
        let route = Route::from_stops(&late, &[0, 1]);
        assert!(!route.windows_respected(&late));
        assert!(!route.is_valid(&late));
    }

    #[test]
    fn test_daily_budget_violation_detected() {
        let cat = catalog();
        let matrices = cat.matrices().clone();
        let long = Catalog::new(
            vec![
                Attraction::new("A", "Centro", 0.0, 0.0, 500.0, 10.0, 0, 1439).unwrap(),
                Attraction::new("B", "Savassi", 0.0, 0.0, 400.0, 20.0, 0, 1439).unwrap(),
                Attraction::new("C", "Pampulha", 0.0, 0.0, 45.0, 15.0, 600, 1080).unwrap(),
            ],
            matrices,
        )
        .unwrap();
        let route = Route::from_stops(&long, &[0, 1]);
        assert!(route.total_time(&long) > DAILY_TIME_LIMIT);
        assert!(!route.is_valid(&long));
    }

    #[test]
    fn test_empty_route_is_valid() {
        let cat = catalog();
        let route = Route::new();
        assert!(route.is_valid(&cat));
        assert_eq!(route.total_cost(&cat), 0.0);
        assert_eq!(route.distinct_neighborhoods(&cat), 0);
    }

    // ---- Identity ----

    #[test]
    fn test_equality_ignores_derived_timing() {
        let cat = catalog();
        let a = Route::from_stops(&cat, &[0, 1]);
        let b = Route::from_stops(&cat, &[0, 1]);
        assert_eq!(a, b);

        let mut c = Route::from_stops(&cat, &[0, 1]);
        c.set_mode(&cat, 0, TransportMode::Car);
        assert_ne!(a, c, "same stops, different modes");
    }

    #[test]
    fn test_distinct_neighborhoods() {
        let cat = catalog();
        let route = Route::from_stops(&cat, &[0, 1, 2]);
        assert_eq!(route.distinct_neighborhoods(&cat), 3);
        let route = Route::from_stops(&cat, &[0]);
        assert_eq!(route.distinct_neighborhoods(&cat), 1);
    }
}
