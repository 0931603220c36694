//! Stack accumulator for partial tours.

use crate::model::{City, Flight, Money};
use fixedbitset::FixedBitSet;

/// A contiguous chain of flights grown and shrunk at its end.
///
/// [`fly`](Partial::fly) and [`backtrack`](Partial::backtrack) are exact
/// inverses: after a `fly` followed by a `backtrack` the visited set, the
/// flight list and the cost are what they were before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial {
    flights: Vec<Flight>,
    visited: FixedBitSet,
    cost: Money,
}

impl Partial {
    /// An empty chain for a problem of `n` cities.
    pub fn new(n: usize) -> Self {
        Self {
            flights: Vec::with_capacity(n),
            visited: FixedBitSet::with_capacity(n),
            cost: 0,
        }
    }

    /// Appends `flight`, marking its destination visited.
    ///
    /// The destination must not be visited already.
    pub fn fly(&mut self, flight: Flight) {
        debug_assert!(!self.visited.contains(flight.to));
        self.visited.insert(flight.to);
        self.cost += flight.cost;
        self.flights.push(flight);
    }

    /// Removes the last flight, if any, undoing its [`fly`](Partial::fly).
    pub fn backtrack(&mut self) -> Option<Flight> {
        let flight = self.flights.pop()?;
        self.visited.set(flight.to, false);
        self.cost -= flight.cost;
        Some(flight)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    #[inline]
    pub fn cost(&self) -> Money {
        self.cost
    }

    #[inline]
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    #[inline]
    pub fn last(&self) -> Option<&Flight> {
        self.flights.last()
    }

    /// City the chain departs from.
    pub fn start(&self) -> Option<City> {
        self.flights.first().map(|f| f.from)
    }

    #[inline]
    pub fn has_visited(&self, city: City) -> bool {
        self.visited.contains(city)
    }

    /// Whether the chain is a closed tour over `n` cities.
    pub fn is_closed(&self, n: usize) -> bool {
        self.len() == n && self.last().map(|f| f.to) == self.start()
    }
}
