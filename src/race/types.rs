//! Engine contract and the messages exchanged with the coordinator.

use super::channel::Comm;
use crate::model::{Problem, Solution};

/// Position of an engine in the race roster.
pub type EngineId = usize;

/// A search algorithm taking part in a race.
///
/// Each engine runs on its own thread. It pushes candidate solutions through
/// the [`Comm`] it is handed, and should return once it has exhausted its
/// search space or observed [`Comm::is_cancelled`].
///
/// # Examples
///
/// ```ignore
/// struct Lazy;
///
/// impl Engine for Lazy {
///     fn name(&self) -> String {
///         "Lazy".into()
///     }
///
///     fn solve(&mut self, comm: &dyn Comm, problem: &Problem) {
///         if let Some(tour) = cheapest_known_tour(problem) {
///             comm.send_solution(&tour);
///         }
///     }
/// }
/// ```
pub trait Engine: Send {
    /// Display name, used for logging and update labels.
    fn name(&self) -> String;

    /// Runs the search until exhaustion or cancellation.
    fn solve(&mut self, comm: &dyn Comm, problem: &Problem);
}

/// A candidate forwarded to the coordinator.
#[derive(Debug, Clone)]
pub struct Update {
    /// Day-sorted copy of the submitted solution.
    pub solution: Solution,
    /// The engine that submitted it.
    pub engine: EngineId,
    /// The engine that originally found it. Differs from `engine` when a
    /// candidate is relayed, e.g. by the polisher.
    pub origin: EngineId,
}

impl Update {
    #[inline]
    pub fn is_relayed(&self) -> bool {
        self.engine != self.origin
    }
}

/// How a race ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The problem has fewer than two cities; no engine was started.
    Trivial,
    /// An engine reported that it searched its whole space.
    Exhausted { engine: String },
    /// The timeout fired.
    Timeout,
    /// Every search engine returned without declaring exhaustion.
    EnginesExited,
}

/// Outcome of a race.
#[derive(Debug, Clone)]
pub struct RaceResult {
    /// Best solution accepted, or [`Solution::none`].
    pub best: Solution,

    /// Why the race stopped.
    pub termination: Termination,

    /// Number of accepted improvements.
    pub accepted_updates: usize,

    /// Recorded best cost after every accepted update, oldest first.
    pub cost_history: Vec<crate::model::Money>,
}

impl RaceResult {
    /// Whether any solution was found. A best cost equal to
    /// [`NO_COST`](crate::model::NO_COST) means infeasible within budget.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.best.is_found()
    }

    pub(crate) fn trivial() -> Self {
        Self {
            best: Solution::empty(),
            termination: Termination::Trivial,
            accepted_updates: 0,
            cost_history: Vec::new(),
        }
    }
}
