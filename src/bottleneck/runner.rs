//! Bottleneck-first branch-and-bound.

use super::partial::Partial;
use crate::model::{Flight, Money, Problem, Solution, HOME, NO_COST};
use crate::race::{Comm, Engine};
use log::{debug, info};

/// Branch-and-bound anchored on scarce flights.
///
/// A city with very few incoming or outgoing flights (a *bottleneck*) pins
/// down any tour: one of those flights must be taken. The engine collects
/// such groups, scarcest first, and for each flight in a group runs a
/// depth-first search for closed tours through it. Flights touching home are
/// not considered, and a group larger than `max(n / 4, 1)` is dropped.
#[derive(Debug, Clone, Default)]
pub struct Bottleneck;

impl Bottleneck {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for Bottleneck {
    fn name(&self) -> String {
        "Bottleneck".to_string()
    }

    fn solve(&mut self, comm: &dyn Comm, problem: &Problem) {
        let n = problem.size();
        if n < 2 {
            comm.send_solution(&Solution::empty());
            return;
        }

        let buckets = bottlenecks(problem);
        info!("Bottleneck found {} scarce groups", buckets.len());
        let mut search = Search {
            problem,
            comm,
            partial: Partial::new(n),
            bound: NO_COST,
        };
        for bucket in buckets {
            for flight in bucket {
                if !search.admits(&flight) {
                    continue;
                }
                debug!("Bottleneck starting with {}", flight);
                search.partial.fly(flight);
                let go_on = search.dfs();
                search.partial.backtrack();
                if !go_on {
                    return;
                }
            }
        }
        info!("Bottleneck finished");
    }
}

/// Per-city groups of scarce flights, smallest group first, each sorted by
/// cost.
pub(crate) fn bottlenecks(problem: &Problem) -> Vec<Vec<Flight>> {
    let n = problem.size();
    let cutoff = (n / 4).max(1);
    let mut outgoing = Buckets::new(n, cutoff);
    let mut incoming = Buckets::new(n, cutoff);
    for f in problem.flights() {
        if f.from == HOME || f.to == HOME {
            continue;
        }
        outgoing.add(f.from, *f);
        incoming.add(f.to, *f);
    }

    let mut all: Vec<Vec<Flight>> = outgoing
        .groups
        .into_iter()
        .chain(incoming.groups)
        .flatten()
        .filter(|group| !group.is_empty())
        .collect();
    all.sort_by_key(Vec::len);
    for group in &mut all {
        group.sort_by_key(|f| f.cost);
    }
    all
}

/// Flight groups keyed by city; a group is dropped for good once it grows
/// past the cutoff.
struct Buckets {
    groups: Vec<Option<Vec<Flight>>>,
    cutoff: usize,
}

impl Buckets {
    fn new(n: usize, cutoff: usize) -> Self {
        Self {
            groups: vec![Some(Vec::new()); n],
            cutoff,
        }
    }

    fn add(&mut self, city: usize, flight: Flight) {
        let slot = &mut self.groups[city];
        if let Some(group) = slot {
            group.push(flight);
            if group.len() > self.cutoff {
                *slot = None;
            }
        }
    }
}

struct Search<'a> {
    problem: &'a Problem,
    comm: &'a dyn Comm,
    partial: Partial,
    bound: Money,
}

impl Search<'_> {
    /// Whether `flight` may extend the current chain.
    fn admits(&self, flight: &Flight) -> bool {
        let n = self.problem.size();
        if flight.day == 0 && flight.from != HOME {
            return false;
        }
        if flight.to == HOME && flight.day != n - 1 {
            return false;
        }
        match self.partial.start() {
            Some(start) if flight.to == start => self.partial.len() == n - 1,
            _ => !self.partial.has_visited(flight.to),
        }
    }

    /// Returns `false` once cancelled.
    fn dfs(&mut self) -> bool {
        if self.comm.is_cancelled() {
            return false;
        }
        if self.partial.cost() >= self.bound {
            return true;
        }
        let n = self.problem.size();
        if self.partial.is_closed(n) {
            let tour = Solution::new(self.partial.flights().to_vec());
            self.bound = self.comm.send_solution(&tour);
            return true;
        }
        let Some(last) = self.partial.last().copied() else {
            return true;
        };

        let next_day = (last.day + 1) % n;
        let problem = self.problem;
        let graph = problem.graph();
        for &index in graph.departure_indices(last.to, next_day) {
            let flight = *graph.flight(index);
            if !self.admits(&flight) {
                continue;
            }
            self.partial.fly(flight);
            let go_on = self.dfs();
            self.partial.backtrack();
            if !go_on {
                return false;
            }
        }
        true
    }
}
