//! Problem data: flights, the time-expanded graph, price statistics,
//! and solutions.
//!
//! Everything here is built once before a race starts and then shared
//! read-only by all engines.

mod graph;
mod problem;
mod solution;
mod stats;
mod types;

pub use graph::Graph;
pub use problem::Problem;
pub use solution::{InvalidSolution, Solution};
pub use stats::{FlightStatistics, PriceStats};
pub use types::{City, Day, Flight, FlightIndex, Money, HOME, NO_COST};
