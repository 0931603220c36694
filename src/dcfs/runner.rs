//! DCFS search.

use super::config::DcfsConfig;
use crate::model::{City, Day, Flight, Money, Problem, Solution, HOME, NO_COST};
use crate::race::{Comm, Engine};
use fixedbitset::FixedBitSet;
use log::{debug, info};

/// Depth+Cheapest-First Search engine.
///
/// A depth-first branch-and-bound that explores, at every day, only the
/// best-scoring few flights (see [`DcfsConfig`] for the scoring). Several
/// instances can run side by side: an instance with `skip = k` ignores the
/// first `k` opening flights so that it explores different first moves.
#[derive(Debug, Clone)]
pub struct Dcfs {
    config: DcfsConfig,
    skip: usize,
}

impl Dcfs {
    pub fn new(config: DcfsConfig) -> Self {
        Self { config, skip: 0 }
    }

    /// Skips the first `skip` day-0 branches.
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
}

impl Engine for Dcfs {
    fn name(&self) -> String {
        format!("Dcfs({})", self.skip)
    }

    fn solve(&mut self, comm: &dyn Comm, problem: &Problem) {
        let n = problem.size();
        if n < 2 {
            comm.send_solution(&Solution::empty());
            return;
        }
        // Small problems are covered by the first instance alone.
        if self.skip > 0 && n < 20 {
            debug!("{} idle on a problem with {} cities", self.name(), n);
            return;
        }

        let threshold = self
            .config
            .discount_threshold
            .unwrap_or_else(|| problem.stats().overall().average() as Money);
        let mut search = Search {
            problem,
            config: &self.config,
            comm,
            threshold,
            branches: self.config.branches_for(n),
            skip: self.skip,
            bound: NO_COST,
            route: Vec::with_capacity(n),
            visited: FixedBitSet::with_capacity(n),
            nodes: 0,
        };
        info!("Starting {} with {} branches", self.name(), search.branches);
        search.iterate(0, HOME, 0);
        info!("{} finished after {} nodes", self.name(), search.nodes);
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    flight: Flight,
    score: f64,
}

struct Search<'a> {
    problem: &'a Problem,
    config: &'a DcfsConfig,
    comm: &'a dyn Comm,
    threshold: Money,
    branches: usize,
    skip: usize,
    bound: Money,
    route: Vec<Flight>,
    visited: FixedBitSet,
    nodes: u64,
}

impl Search<'_> {
    /// Returns `false` once cancelled, unwinding the whole recursion.
    fn iterate(&mut self, day: Day, city: City, price: Money) -> bool {
        self.nodes += 1;
        if self.comm.is_cancelled() {
            return false;
        }
        if price >= self.bound {
            return true;
        }
        if day == self.problem.size() {
            self.bound = self
                .comm
                .send_solution(&Solution::new(self.route.clone()));
            return true;
        }

        let mut candidates = self.candidates(day, city);
        if candidates.is_empty() {
            return true;
        }
        if day > 0 {
            candidates.truncate(self.branches);
        }
        let best_score = candidates[0].score;
        let skip = if day == 0 { self.skip } else { 0 };

        for candidate in candidates.into_iter().skip(skip) {
            if candidate.score - best_score > self.config.beam_margin {
                break;
            }
            let flight = candidate.flight;
            self.route.push(flight);
            self.visited.insert(flight.to);
            let go_on = self.iterate(day + 1, flight.to, price.saturating_add(flight.cost));
            self.visited.set(flight.to, false);
            self.route.pop();
            if !go_on {
                return false;
            }
        }
        true
    }

    /// Feasible flights from `city` on `day`, best deal first.
    fn candidates(&self, day: Day, city: City) -> Vec<Candidate> {
        let n = self.problem.size();
        let last_day = n - 1;
        let stats = self.problem.stats();
        let mut candidates: Vec<Candidate> = self
            .problem
            .graph()
            .departures(city, day)
            .filter(|f| !self.visited.contains(f.to) && (f.to == HOME) == (day == last_day))
            .filter_map(|f| {
                let cost = f.cost as f64;
                let discount = stats.route(city, f.to).average() - cost;
                let rate = if f.cost > 0 { discount / cost } else { f64::INFINITY };
                if f.cost > self.threshold && rate < self.config.min_discount_rate {
                    // no real deal
                    return None;
                }
                let next_avg = if day + 1 < n {
                    stats.departures(f.to, day + 1).average()
                } else {
                    0.0
                };
                Some(Candidate {
                    flight: *f,
                    score: score(self.config, cost, discount, next_avg),
                })
            })
            .collect();
        candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
        candidates
    }
}

/// Deal value of a flight; lower is better.
fn score(config: &DcfsConfig, cost: f64, discount: f64, next_avg: f64) -> f64 {
    cost - config.discount_weight * discount + config.next_avg_weight * next_avg
}
