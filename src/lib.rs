//! Concurrent multi-engine search for the Flight Scheduling Problem.
//!
//! Given `n` cities and a catalog of flights, each usable on one day only,
//! find a tour of exactly `n` flights, one per day, that leaves home city
//! `0` on day 0, enters every other city exactly once and lands back home on
//! day `n - 1`, at minimum total price.
//!
//! Several independent engines race on the same read-only [`model::Problem`]:
//!
//! - **Ant Colony** ([`ant`]): pheromone-guided random walks.
//! - **Bottleneck** ([`bottleneck`]): branch-and-bound anchored on the
//!   scarcest flights.
//! - **DCFS** ([`dcfs`]): depth-first search over the best-scoring deals.
//! - **Meet-in-the-Middle** ([`mitm`]): exhaustive enumeration of both
//!   route halves, joined at the meeting city.
//!
//! The [`race`] module runs them on separate threads and arbitrates their
//! submissions through a single coordinator.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use u_fsp::model::{Flight, Problem};
//! use u_fsp::race::{Race, RaceConfig};
//!
//! let problem = Problem::new(3, vec![
//!     Flight::new(0, 1, 0, 10),
//!     Flight::new(0, 2, 0, 50),
//!     Flight::new(1, 2, 1, 5),
//!     Flight::new(2, 1, 1, 5),
//!     Flight::new(1, 0, 2, 10),
//!     Flight::new(2, 0, 2, 20),
//! ])?;
//! let result = Race::new(RaceConfig::from_env()?)?.run(Arc::new(problem))?;
//! println!("{}", result.best);
//! # Ok::<(), u_fsp::error::Error>(())
//! ```

pub mod ant;
pub mod bottleneck;
pub mod dcfs;
pub mod error;
pub mod logging;
pub mod mitm;
pub mod model;
pub mod race;
