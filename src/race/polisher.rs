//! Post-processing of accepted solutions.
//!
//! The coordinator hands every accepted update to a [`Polisher`]. The
//! bundled [`SwapPolisher`] runs as an extra engine: it picks accepted tours
//! off its inbox, tries to improve them by swapping the visiting order of two
//! cities, and relays improvements under the original finder's identity.

use super::channel::Comm;
use super::types::{Engine, Update};
use crate::model::{City, Flight, Graph, Money, Problem, Solution};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::debug;
use std::time::Duration;

/// Inbound hook for accepted updates. Must not block.
pub trait Polisher {
    fn offer(&self, update: &Update);
}

/// Coordinator-side handle feeding a [`SwapPolisher`].
#[derive(Debug, Clone)]
pub struct PolisherInbox {
    tx: Sender<Update>,
}

impl Polisher for PolisherInbox {
    fn offer(&self, update: &Update) {
        // A full inbox means the polisher is busy; it will pick up a newer
        // update soon enough.
        let _ = self.tx.try_send(update.clone());
    }
}

/// Swap-two-cities local search over accepted solutions.
#[derive(Debug)]
pub struct SwapPolisher {
    rx: Receiver<Update>,
    poll: Duration,
}

impl SwapPolisher {
    /// Creates the polisher engine and the inbox the coordinator writes to.
    pub fn new() -> (Self, PolisherInbox) {
        let (tx, rx) = bounded(4);
        let polisher = Self {
            rx,
            poll: Duration::from_millis(20),
        };
        (polisher, PolisherInbox { tx })
    }
}

impl Engine for SwapPolisher {
    fn name(&self) -> String {
        "Polisher".to_string()
    }

    fn solve(&mut self, comm: &dyn Comm, problem: &Problem) {
        while !comm.is_cancelled() {
            let mut update = match self.rx.recv_timeout(self.poll) {
                Ok(update) => update,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return,
            };
            // Only the freshest best is worth polishing.
            while let Ok(newer) = self.rx.try_recv() {
                update = newer;
            }

            if let Some(better) = polish(problem.graph(), &update.solution, comm) {
                debug!(
                    "Polished {} down to {}",
                    update.solution.total_cost, better.total_cost
                );
                comm.send(&better, update.origin);
            }
        }
    }
}

/// First-improvement swap search. Returns `None` when nothing improved.
pub(crate) fn polish(graph: &Graph, solution: &Solution, comm: &dyn Comm) -> Option<Solution> {
    let n = solution.flights.len();
    if n < 3 {
        return None;
    }
    let mut legs = solution.flights.clone();
    let mut route: Vec<City> = legs.iter().map(|f| f.from).collect();
    let mut improved = false;

    'restart: loop {
        if comm.is_cancelled() {
            break;
        }
        for i in 1..n - 1 {
            for j in i + 1..n {
                route.swap(i, j);
                if let Some((delta, fresh)) = swap_delta(graph, &route, &legs, i, j) {
                    if delta < 0 {
                        for f in fresh {
                            legs[f.day] = f;
                        }
                        improved = true;
                        continue 'restart;
                    }
                }
                route.swap(i, j);
            }
        }
        break;
    }

    improved.then(|| Solution::new(legs))
}

/// Cost change of the legs touched by swapping positions `i < j` (already
/// applied to `route`), with the replacement flights. `None` if a touched leg
/// has no flight.
fn swap_delta(
    graph: &Graph,
    route: &[City],
    legs: &[Flight],
    i: usize,
    j: usize,
) -> Option<(Money, Vec<Flight>)> {
    let n = route.len();
    let mut days = vec![i - 1, i, j - 1, j];
    days.dedup();

    let mut delta = 0;
    let mut fresh = Vec::with_capacity(days.len());
    for day in days {
        let flight = graph.find(route[day], route[(day + 1) % n], day)?;
        delta += flight.cost - legs[day].cost;
        fresh.push(*flight);
    }
    Some((delta, fresh))
}
