//! In-process [`Comm`] and fixtures shared by unit tests.

use super::channel::Comm;
use super::types::EngineId;
use crate::model::{Flight, Money, Problem, Solution, NO_COST};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Plays the coordinator for a single engine, without threads.
///
/// Applies the same pre-check as the real protocol, records forwarded
/// candidates, and raises cancellation once a query or send budget runs out.
pub(crate) struct RecordingComm {
    pub best: Mutex<Money>,
    pub sent: Mutex<Vec<Solution>>,
    pub queries: AtomicUsize,
    pub done: AtomicBool,
    query_budget: usize,
    send_budget: usize,
    cancelled: AtomicBool,
}

impl RecordingComm {
    pub fn new() -> Self {
        Self {
            best: Mutex::new(NO_COST),
            sent: Mutex::new(Vec::new()),
            queries: AtomicUsize::new(0),
            done: AtomicBool::new(false),
            query_budget: usize::MAX,
            send_budget: usize::MAX,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn with_query_budget(mut self, n: usize) -> Self {
        self.query_budget = n;
        self
    }

    pub fn with_send_budget(mut self, n: usize) -> Self {
        self.send_budget = n;
        self
    }

    pub fn with_best(self, best: Money) -> Self {
        *self.best.lock().unwrap() = best;
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn sent(&self) -> Vec<Solution> {
        self.sent.lock().unwrap().clone()
    }

    pub fn best(&self) -> Money {
        *self.best.lock().unwrap()
    }
}

impl Comm for RecordingComm {
    fn id(&self) -> EngineId {
        0
    }

    fn send(&self, candidate: &Solution, _origin: EngineId) -> Money {
        let best = self.best_cost();
        if best <= candidate.total_cost {
            return best;
        }
        *self.best.lock().unwrap() = candidate.total_cost;
        let mut sent = self.sent.lock().unwrap();
        sent.push(candidate.sorted_by_day());
        if sent.len() >= self.send_budget {
            self.cancel();
        }
        candidate.total_cost
    }

    fn best_cost(&self) -> Money {
        if self.queries.fetch_add(1, Ordering::Relaxed) + 1 >= self.query_budget {
            self.cancel();
        }
        self.best()
    }

    fn done(&self) {
        self.done.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Three cities; the only cheapest tour is 0 -> 1 -> 2 -> 0 at 35.
pub(crate) fn scenario() -> Problem {
    Problem::new(
        3,
        vec![
            Flight::new(0, 1, 0, 10),
            Flight::new(0, 2, 0, 50),
            Flight::new(1, 2, 1, 5),
            Flight::new(2, 1, 1, 5),
            Flight::new(1, 0, 2, 10),
            Flight::new(2, 0, 2, 20),
        ],
    )
    .unwrap()
}

/// Every city connected to every other city on every day, with
/// deterministic pseudo-random prices in `1..=50`.
pub(crate) fn complete(n: usize) -> Problem {
    let mut flights = Vec::with_capacity(n * n * n);
    for day in 0..n {
        for from in 0..n {
            for to in 0..n {
                if from != to {
                    let cost = ((from * 7 + to * 13 + day * 3) % 50 + 1) as Money;
                    flights.push(Flight::new(from, to, day, cost));
                }
            }
        }
    }
    Problem::new(n, flights).unwrap()
}

/// Cheapest valid tour by exhaustive search. Only for tiny instances.
pub(crate) fn brute_force(problem: &Problem) -> Money {
    fn walk(problem: &Problem, day: usize, city: usize, seen: &mut Vec<bool>, cost: Money) -> Money {
        let n = problem.size();
        if day == n {
            return cost;
        }
        let mut best = NO_COST;
        for f in problem.graph().departures(city, day) {
            let last = day == n - 1;
            if (f.to == 0) != last || seen[f.to] {
                continue;
            }
            seen[f.to] = true;
            best = best.min(walk(problem, day + 1, f.to, seen, cost + f.cost));
            seen[f.to] = false;
        }
        best
    }
    let mut seen = vec![false; problem.size()];
    walk(problem, 0, 0, &mut seen, 0)
}

/// Four cities and a day-ordered tour over existing flights that enters
/// city 1 twice and never reaches city 3.
pub(crate) fn revisiting_tour() -> (Problem, Solution) {
    let flights = vec![
        Flight::new(0, 1, 0, 10),
        Flight::new(1, 2, 1, 10),
        Flight::new(2, 1, 2, 10),
        Flight::new(1, 0, 3, 10),
    ];
    let problem = Problem::new(4, flights.clone()).unwrap();
    (problem, Solution::new(flights))
}
