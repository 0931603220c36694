//! Bottleneck-first branch-and-bound.
//!
//! Exact within the tours it explores: every tour through one of the scarce
//! flights it anchors on. Ordering the anchors scarcest first is a fail-first
//! heuristic that finds good bounds early.
//!
//! # Examples
//!
//! ```ignore
//! use u_fsp::bottleneck::Bottleneck;
//! use u_fsp::race::{Race, RaceConfig};
//!
//! let result = Race::with_engines(vec![Box::new(Bottleneck::new())], RaceConfig::default())
//!     .run(problem)?;
//! ```

mod partial;
mod runner;

pub use partial::Partial;
pub use runner::Bottleneck;
