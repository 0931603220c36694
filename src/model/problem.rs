//! The immutable problem snapshot shared by all engines.

use super::graph::Graph;
use super::stats::FlightStatistics;
use super::types::{City, Flight, HOME};
use crate::error::{Error, Result};

/// A built problem instance: route length, flight graph and price statistics.
///
/// Constructed once before the race starts and never mutated afterwards;
/// engines receive it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Problem {
    graph: Graph,
    stats: FlightStatistics,
}

impl Problem {
    /// Builds a problem with `n` cities (and `n` days) from a flight catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFlight`] when a flight references a city or
    /// day outside `[0, n)` or carries a negative cost.
    pub fn new(n: usize, flights: Vec<Flight>) -> Result<Self> {
        for flight in &flights {
            let reason = if flight.from >= n || flight.to >= n {
                Some(format!("city out of range for {n} cities"))
            } else if flight.day >= n {
                Some(format!("day out of range for {n} days"))
            } else if flight.cost < 0 {
                Some("negative cost".to_string())
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(Error::InvalidFlight {
                    flight: *flight,
                    reason,
                });
            }
        }

        let stats = FlightStatistics::new(n, &flights);
        let graph = Graph::new(n, flights);
        Ok(Self { graph, stats })
    }

    /// Number of cities, days, and flights in a complete route.
    #[inline]
    pub fn size(&self) -> usize {
        self.graph.size()
    }

    #[inline]
    pub fn home(&self) -> City {
        HOME
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn stats(&self) -> &FlightStatistics {
        &self.stats
    }

    #[inline]
    pub fn flights(&self) -> &[Flight] {
        self.graph.flights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_city() {
        let err = Problem::new(2, vec![Flight::new(0, 2, 0, 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidFlight { .. }));
    }

    #[test]
    fn test_rejects_out_of_range_day() {
        assert!(Problem::new(2, vec![Flight::new(0, 1, 2, 1)]).is_err());
    }

    #[test]
    fn test_rejects_negative_cost() {
        assert!(Problem::new(2, vec![Flight::new(0, 1, 0, -5)]).is_err());
    }

    #[test]
    fn test_builds_graph_and_stats() {
        let p = Problem::new(
            2,
            vec![Flight::new(0, 1, 0, 4), Flight::new(1, 0, 1, 6)],
        )
        .unwrap();
        assert_eq!(p.size(), 2);
        assert_eq!(p.home(), 0);
        assert_eq!(p.flights().len(), 2);
        assert_eq!(p.graph().departures(1, 1).count(), 1);
        assert!((p.stats().overall().average() - 5.0).abs() < 1e-10);
    }
}
