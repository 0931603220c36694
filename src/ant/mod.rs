//! Ant Colony engine.
//!
//! A pool of ants walks the day-indexed flight graph, biased by per-flight
//! pheromone trails and by price attractiveness. Completed laps reinforce
//! the flights they used; trails evaporate periodically.
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a
//!   Colony of Cooperating Agents"

mod config;
mod runner;

pub use config::AntConfig;
pub use runner::AntEngine;
