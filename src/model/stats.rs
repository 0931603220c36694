//! Aggregate price statistics used by the heuristic engines.

use super::types::{City, Day, Flight, Money};

/// Count and sum of a group of prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceStats {
    pub count: u64,
    pub total: Money,
}

impl PriceStats {
    fn add(&mut self, cost: Money) {
        self.count += 1;
        self.total = self.total.saturating_add(cost);
    }

    /// Mean price, or `0.0` for an empty group.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f64 / self.count as f64
        }
    }
}

/// Historical prices grouped by route and by departure day.
///
/// - `route(from, to)`: every flight `from -> to` regardless of day.
/// - `departures(city, day)`: every flight leaving `city` on `day`.
/// - `overall()`: the whole catalog.
#[derive(Debug, Clone)]
pub struct FlightStatistics {
    size: usize,
    by_route: Vec<PriceStats>,
    by_departure: Vec<PriceStats>,
    overall: PriceStats,
}

impl FlightStatistics {
    pub fn new(size: usize, flights: &[Flight]) -> Self {
        let mut by_route = vec![PriceStats::default(); size * size];
        let mut by_departure = vec![PriceStats::default(); size * size];
        let mut overall = PriceStats::default();
        for f in flights {
            by_route[f.from * size + f.to].add(f.cost);
            by_departure[f.from * size + f.day].add(f.cost);
            overall.add(f.cost);
        }
        Self {
            size,
            by_route,
            by_departure,
            overall,
        }
    }

    pub fn route(&self, from: City, to: City) -> PriceStats {
        if from >= self.size || to >= self.size {
            return PriceStats::default();
        }
        self.by_route[from * self.size + to]
    }

    pub fn departures(&self, city: City, day: Day) -> PriceStats {
        if city >= self.size || day >= self.size {
            return PriceStats::default();
        }
        self.by_departure[city * self.size + day]
    }

    pub fn overall(&self) -> PriceStats {
        self.overall
    }
}
