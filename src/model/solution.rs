//! Complete tours and their integrity check.

use super::problem::Problem;
use super::types::{City, Day, Flight, Money, HOME, NO_COST};
use fixedbitset::FixedBitSet;
use thiserror::Error as ThisError;

/// An ordered sequence of flights with its total cost.
///
/// A valid solution has exactly `n` flights, flight `i` flies on day `i`,
/// consecutive flights connect, the tour starts and ends at [`HOME`], and
/// every other city is entered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    pub flights: Vec<Flight>,
    pub total_cost: Money,
}

/// Why a submitted solution was refused.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum InvalidSolution {
    #[error("expected {expected} flights, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("flight {index} flies on day {day}")]
    DayOutOfOrder { index: usize, day: Day },
    #[error("flight {0} is not in the catalog")]
    UnknownFlight(Flight),
    #[error("tour does not start at home (starts at {0})")]
    NotFromHome(City),
    #[error("flights on day {day} and {next} do not connect")]
    Disconnected { day: Day, next: Day },
    #[error("city {0} visited twice")]
    CityRevisited(City),
    #[error("tour does not end at home (ends at {0})")]
    NotBackHome(City),
    #[error("declared cost {declared} but flights sum to {actual}")]
    CostMismatch { declared: Money, actual: Money },
}

impl Solution {
    /// Creates a solution, summing the flight costs.
    pub fn new(flights: Vec<Flight>) -> Self {
        let total_cost = flights
            .iter()
            .fold(0, |acc: Money, f| acc.saturating_add(f.cost));
        Self {
            flights,
            total_cost,
        }
    }

    /// The "nothing found" placeholder carrying the [`NO_COST`] sentinel.
    pub fn none() -> Self {
        Self {
            flights: Vec::new(),
            total_cost: NO_COST,
        }
    }

    /// The trivial zero-cost tour of a problem with fewer than two cities.
    pub fn empty() -> Self {
        Self {
            flights: Vec::new(),
            total_cost: 0,
        }
    }

    /// Whether this is a real solution rather than the sentinel.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.total_cost != NO_COST
    }

    /// A copy with flights ordered by day.
    pub fn sorted_by_day(&self) -> Self {
        let mut flights = self.flights.clone();
        flights.sort_by_key(|f| f.day);
        Self {
            flights,
            total_cost: self.total_cost,
        }
    }

    /// The visited cities in order, starting (and not repeating) home.
    pub fn route(&self) -> Vec<City> {
        self.flights.iter().map(|f| f.from).collect()
    }

    /// Checks the full structure of this solution against `problem`.
    pub fn validate(&self, problem: &Problem) -> Result<(), InvalidSolution> {
        let n = problem.size();
        if n < 2 {
            if !self.flights.is_empty() {
                return Err(InvalidSolution::WrongLength {
                    expected: 0,
                    actual: self.flights.len(),
                });
            }
            return self.check_cost();
        }
        if self.flights.len() != n {
            return Err(InvalidSolution::WrongLength {
                expected: n,
                actual: self.flights.len(),
            });
        }

        let graph = problem.graph();
        let mut entered = FixedBitSet::with_capacity(n);
        let mut at = HOME;
        for (index, flight) in self.flights.iter().enumerate() {
            if flight.day != index {
                return Err(InvalidSolution::DayOutOfOrder {
                    index,
                    day: flight.day,
                });
            }
            if !graph.contains(flight) {
                return Err(InvalidSolution::UnknownFlight(*flight));
            }
            if flight.from != at {
                return Err(if index == 0 {
                    InvalidSolution::NotFromHome(flight.from)
                } else {
                    InvalidSolution::Disconnected {
                        day: index - 1,
                        next: index,
                    }
                });
            }
            if entered.put(flight.to) {
                return Err(InvalidSolution::CityRevisited(flight.to));
            }
            at = flight.to;
        }
        if at != HOME {
            return Err(InvalidSolution::NotBackHome(at));
        }
        self.check_cost()
    }

    fn check_cost(&self) -> Result<(), InvalidSolution> {
        let actual = Self::new(self.flights.clone()).total_cost;
        if actual != self.total_cost {
            return Err(InvalidSolution::CostMismatch {
                declared: self.total_cost,
                actual,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.is_found() {
            return write!(f, "Solution(none)");
        }
        write!(f, "Solution(cost: {}, route: ", self.total_cost)?;
        for flight in &self.flights {
            write!(f, "{}->", flight.from)?;
        }
        write!(f, "{HOME})")
    }
}
