//! Meet-in-the-Middle engine.

use super::half::{explore, HalfRoute, HalfTree, Side};
use super::matcher::{to_solution, Matcher};
use crate::model::{Money, Problem, Solution, NO_COST};
use crate::race::{Comm, Engine};
use crossbeam_channel::{bounded, never, select, Receiver};
use log::{debug, info};
use std::thread;

/// Capacity of each half-route stream.
const STREAM_CAPACITY: usize = 256;

/// Splits the route at its middle day and searches both halves at once.
///
/// Each half is enumerated exhaustively by its own thread. Half routes are
/// matched as they arrive, so the engine is exact once both streams close,
/// at which point it reports completion.
#[derive(Debug, Clone, Default)]
pub struct Mitm;

impl Mitm {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for Mitm {
    fn name(&self) -> String {
        "MeetInTheMiddle".to_string()
    }

    fn solve(&mut self, comm: &dyn Comm, problem: &Problem) {
        let n = problem.size();
        if n < 2 {
            comm.send_solution(&Solution::empty());
            return;
        }

        let forward = HalfTree::forward(problem);
        let backward = HalfTree::backward(problem);
        let (forward_tx, forward_rx) = bounded(STREAM_CAPACITY);
        let (backward_tx, backward_rx) = bounded(STREAM_CAPACITY);

        let exhausted = thread::scope(|s| {
            s.spawn(|| explore(&forward, comm, forward_tx));
            s.spawn(|| explore(&backward, comm, backward_tx));
            collect(comm, problem, forward_rx, backward_rx)
        });

        if exhausted && !comm.is_cancelled() {
            info!("MeetInTheMiddle searched both halves");
            comm.done();
        }
    }
}

/// Matches both streams until they close. Returns `true` if both ran dry.
///
/// Takes the receivers by value so that returning early unblocks the
/// producers.
fn collect(
    comm: &dyn Comm,
    problem: &Problem,
    mut forward: Receiver<HalfRoute>,
    mut backward: Receiver<HalfRoute>,
) -> bool {
    let mut matcher = Matcher::new(problem.size());
    let mut best: Money = NO_COST;
    let mut open = 2;
    let mut received = 0u64;

    while open > 0 {
        if comm.is_cancelled() {
            return false;
        }
        let (side, arrival) = select! {
            recv(forward) -> msg => (Side::Forward, msg.ok()),
            recv(backward) -> msg => (Side::Backward, msg.ok()),
        };
        let Some(half) = arrival else {
            match side {
                Side::Forward => forward = never(),
                Side::Backward => backward = never(),
            }
            open -= 1;
            continue;
        };

        received += 1;
        let Some(route) = matcher.add(side, half) else {
            continue;
        };
        if let Some(tour) = to_solution(problem.graph(), &route) {
            if tour.total_cost < best {
                best = tour.total_cost;
                comm.send_solution(&tour);
            }
        }
    }
    debug!("MeetInTheMiddle matched {} half routes", received);
    true
}
