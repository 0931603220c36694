//! Time-expanded adjacency over the flight catalog.

use super::types::{City, Day, Flight, FlightIndex};

/// Immutable per-city-per-day adjacency.
///
/// For every `(city, day)` pair, holds the indices of the flights departing
/// `city` on `day`, sorted ascending by cost. Built once and shared
/// read-only by every engine.
#[derive(Debug, Clone)]
pub struct Graph {
    size: usize,
    flights: Vec<Flight>,
    // Flattened `city * size + day`.
    departures: Vec<Vec<FlightIndex>>,
}

impl Graph {
    /// Builds the adjacency for a route of `size` days over `size` cities.
    ///
    /// Flights are assumed to be in range; [`Problem::new`](super::Problem::new)
    /// checks that before calling.
    pub fn new(size: usize, flights: Vec<Flight>) -> Self {
        let mut departures = vec![Vec::new(); size * size];
        for (index, flight) in flights.iter().enumerate() {
            departures[flight.from * size + flight.day].push(index);
        }

        let by_cost = |list: &mut Vec<FlightIndex>| {
            list.sort_by_key(|&i| (flights[i].cost, flights[i].to));
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            departures.par_iter_mut().for_each(by_cost);
        }
        #[cfg(not(feature = "parallel"))]
        departures.iter_mut().for_each(by_cost);

        Self {
            size,
            flights,
            departures,
        }
    }

    /// Route length (number of cities and of days).
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The full catalog, indexed by [`FlightIndex`].
    #[inline]
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    #[inline]
    pub fn flight(&self, index: FlightIndex) -> &Flight {
        &self.flights[index]
    }

    /// Indices of flights leaving `city` on `day`, cheapest first.
    ///
    /// Empty when either argument is out of range.
    #[inline]
    pub fn departure_indices(&self, city: City, day: Day) -> &[FlightIndex] {
        if city >= self.size || day >= self.size {
            return &[];
        }
        &self.departures[city * self.size + day]
    }

    /// Flights leaving `city` on `day`, cheapest first.
    pub fn departures(&self, city: City, day: Day) -> impl Iterator<Item = &Flight> + '_ {
        self.departure_indices(city, day)
            .iter()
            .map(move |&i| &self.flights[i])
    }

    /// The cheapest flight `from -> to` on `day`, if any.
    pub fn find(&self, from: City, to: City, day: Day) -> Option<&Flight> {
        self.departures(from, day).find(|f| f.to == to)
    }

    /// Whether this exact flight (all four fields) exists in the catalog.
    pub fn contains(&self, flight: &Flight) -> bool {
        self.departures(flight.from, flight.day)
            .any(|f| f == flight)
    }
}
