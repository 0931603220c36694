//! Depth+Cheapest-First Search (DCFS).
//!
//! A heuristic branch-and-bound: at each day the candidate flights are
//! ranked by a deal value combining price, historical discount and a
//! one-day look-ahead, and only the best few are explored.

mod config;
mod runner;

pub use config::DcfsConfig;
pub use runner::Dcfs;
