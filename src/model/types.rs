//! Primitive identifiers and the flight record.

/// City identifier in `[0, n)`.
pub type City = usize;

/// Day index in `[0, n)`. Route length equals city count equals day count.
pub type Day = usize;

/// Currency amount.
pub type Money = i64;

/// Position of a flight in the problem catalog.
///
/// Stable for the lifetime of a [`Problem`](super::Problem), so it can key
/// per-flight engine state such as pheromone trails.
pub type FlightIndex = usize;

/// The fixed start and end of every tour.
pub const HOME: City = 0;

/// Sentinel cost meaning "no solution known yet".
pub const NO_COST: Money = Money::MAX;

/// A directed edge usable only on its specific day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flight {
    /// Departure city.
    pub from: City,
    /// Arrival city.
    pub to: City,
    /// The only day this flight operates.
    pub day: Day,
    /// Ticket price.
    pub cost: Money,
}

impl Flight {
    pub fn new(from: City, to: City, day: Day, cost: Money) -> Self {
        Self {
            from,
            to,
            day,
            cost,
        }
    }

    /// The same leg flown backwards, re-indexed from the end of a route of
    /// `days` days.
    pub fn reversed(&self, days: usize) -> Self {
        Self {
            from: self.to,
            to: self.from,
            day: days - 1 - self.day,
            cost: self.cost,
        }
    }
}

impl std::fmt::Display for Flight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}->{} (day {}, {})",
            self.from, self.to, self.day, self.cost
        )
    }
}
