//! Concurrent multi-engine search.
//!
//! A [`Race`] starts every [`Engine`] on its own thread. Engines never share
//! search state; they only exchange messages with the coordinator loop,
//! which is the single writer of the best solution:
//!
//! - [`Comm::send`] first asks for the current best and only forwards a
//!   candidate that beats it;
//! - the [`Coordinator`] re-checks cost and structure before accepting, so
//!   the recorded best never increases and broken tours never win.
//!
//! The race stops on timeout, when an engine reports exhaustion, or when all
//! search engines have returned, and then raises a cancellation flag that
//! every engine polls.

mod channel;
mod config;
mod coordinator;
mod polisher;
mod runner;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{Comm, SolutionComm};
pub use config::{EngineKind, RaceConfig};
pub use coordinator::Coordinator;
pub use polisher::{Polisher, PolisherInbox, SwapPolisher};
pub use runner::Race;
pub use types::{Engine, EngineId, RaceResult, Termination, Update};
