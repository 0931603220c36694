//! Arbitration protocol between engines and the coordinator.
//!
//! Engines never touch the recorded best directly. They talk to the
//! coordinator through a [`Comm`]: query the best cost, forward candidates,
//! report exhaustion. The coordinator thread is the only writer.

use super::types::{EngineId, Update};
use crate::model::{Money, Solution};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The engine-side view of the coordinator.
///
/// One thread at a time per engine may use a `Comm`: a best-cost query and
/// its reply share a per-engine slot.
pub trait Comm: Sync {
    /// This engine's roster position.
    fn id(&self) -> EngineId;

    /// Submits a candidate found by this engine.
    ///
    /// Returns the new provisional bound: the candidate's own cost if it was
    /// forwarded, otherwise the (lower or equal) best already recorded.
    fn send_solution(&self, candidate: &Solution) -> Money {
        self.send(candidate, self.id())
    }

    /// Submits a candidate originally found by `origin`.
    fn send(&self, candidate: &Solution, origin: EngineId) -> Money;

    /// Current best cost known to the coordinator.
    fn best_cost(&self) -> Money;

    /// Reports that this engine searched its whole space.
    fn done(&self);

    /// Whether the race is over and the engine should return.
    fn is_cancelled(&self) -> bool;
}

/// Coordinator-side endpoints.
pub(crate) struct Hub {
    pub updates: Receiver<Update>,
    pub queries: Receiver<EngineId>,
    pub done: Receiver<EngineId>,
    replies: Vec<Sender<Money>>,
}

impl Hub {
    /// Answers a best-cost query. The reply slot is empty because every
    /// engine waits for its answer before asking again.
    pub fn reply(&self, engine: EngineId, best: Money) {
        if let Some(tx) = self.replies.get(engine) {
            let _ = tx.try_send(best);
        }
    }
}

/// Channel-backed [`Comm`] handed to every engine by the race.
#[derive(Debug)]
pub struct SolutionComm {
    id: EngineId,
    updates: Sender<Update>,
    queries: Sender<EngineId>,
    reply: Receiver<Money>,
    done: Sender<EngineId>,
    cancel: Arc<AtomicBool>,
}

/// Creates the hub and one [`SolutionComm`] per engine.
pub(crate) fn connect(engines: usize, cancel: &Arc<AtomicBool>) -> (Hub, Vec<SolutionComm>) {
    let (updates_tx, updates_rx) = bounded(engines.max(1));
    let (queries_tx, queries_rx) = unbounded();
    let (done_tx, done_rx) = unbounded();

    let mut replies = Vec::with_capacity(engines);
    let mut comms = Vec::with_capacity(engines);
    for id in 0..engines {
        let (reply_tx, reply_rx) = bounded(1);
        replies.push(reply_tx);
        comms.push(SolutionComm {
            id,
            updates: updates_tx.clone(),
            queries: queries_tx.clone(),
            reply: reply_rx,
            done: done_tx.clone(),
            cancel: Arc::clone(cancel),
        });
    }

    let hub = Hub {
        updates: updates_rx,
        queries: queries_rx,
        done: done_rx,
        replies,
    };
    (hub, comms)
}

impl Comm for SolutionComm {
    fn id(&self) -> EngineId {
        self.id
    }

    fn send(&self, candidate: &Solution, origin: EngineId) -> Money {
        // Cheap rejection before copying anything.
        let best = self.best_cost();
        if best <= candidate.total_cost {
            return best;
        }

        let update = Update {
            solution: candidate.sorted_by_day(),
            engine: self.id,
            origin,
        };
        if self.updates.send(update).is_err() {
            return Money::MIN;
        }
        candidate.total_cost
    }

    fn best_cost(&self) -> Money {
        if self.queries.send(self.id).is_err() {
            return Money::MIN;
        }
        self.reply.recv().unwrap_or(Money::MIN)
    }

    fn done(&self) {
        let _ = self.done.send(self.id);
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}
