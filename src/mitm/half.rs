//! Half problems and their exhaustive producers.

use crate::model::{City, Day, Flight, Money, Problem, HOME};
use crate::race::Comm;
use crossbeam_channel::Sender;
use fixedbitset::FixedBitSet;

/// Which half of the route a [`HalfRoute`] covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    /// Days `0..meet`, flown from home.
    Forward,
    /// Days `meet..n`, flown backwards from home.
    Backward,
}

/// The flights of one half, re-indexed so that both halves are searched
/// forward from home starting on day 0.
#[derive(Debug, Clone)]
pub(crate) struct HalfTree {
    size: usize,
    days: usize,
    // Flattened `day * size + city`, cheapest first.
    departures: Vec<Vec<Flight>>,
}

impl HalfTree {
    /// Day on which the two halves meet.
    pub fn meet_day(n: usize) -> Day {
        n / 2
    }

    /// Flights before the meeting day.
    pub fn forward(problem: &Problem) -> Self {
        let n = problem.size();
        let meet = Self::meet_day(n);
        let flights = problem.flights().iter().filter(|f| f.day < meet).copied();
        Self::build(n, meet, flights)
    }

    /// Flights from the meeting day on, reversed.
    pub fn backward(problem: &Problem) -> Self {
        let n = problem.size();
        let meet = Self::meet_day(n);
        let flights = problem
            .flights()
            .iter()
            .filter(|f| f.day >= meet)
            .map(|f| f.reversed(n));
        Self::build(n, n - meet, flights)
    }

    fn build(size: usize, days: usize, flights: impl Iterator<Item = Flight>) -> Self {
        let mut departures = vec![Vec::new(); size * days];
        for f in flights {
            departures[f.day * size + f.from].push(f);
        }
        for list in &mut departures {
            list.sort_by_key(|f| f.cost);
        }
        Self {
            size,
            days,
            departures,
        }
    }

    /// Number of days in this half.
    #[inline]
    pub fn days(&self) -> usize {
        self.days
    }

    pub fn departures(&self, day: Day, city: City) -> &[Flight] {
        if day >= self.days || city >= self.size {
            return &[];
        }
        &self.departures[day * self.size + city]
    }
}

/// A complete assignment of one half: the cities from home to the meeting
/// city, the set of cities they cover, and the price paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HalfRoute {
    pub visited: FixedBitSet,
    pub route: Vec<City>,
    pub cost: Money,
}

impl HalfRoute {
    /// The city this half ends in.
    pub fn meet_city(&self) -> City {
        self.route.last().copied().unwrap_or(HOME)
    }
}

/// Streams every half route of `tree` into `output`, depth-first.
///
/// Stops early once the race is cancelled or the receiving end is gone.
pub(crate) fn explore(tree: &HalfTree, comm: &dyn Comm, output: Sender<HalfRoute>) {
    let mut walk = Walk {
        tree,
        comm,
        output,
        route: vec![HOME],
        visited: FixedBitSet::with_capacity(tree.size),
    };
    walk.visited.insert(HOME);
    walk.step(0, 0);
}

struct Walk<'a> {
    tree: &'a HalfTree,
    comm: &'a dyn Comm,
    output: Sender<HalfRoute>,
    route: Vec<City>,
    visited: FixedBitSet,
}

impl Walk<'_> {
    /// Returns `false` when the search should stop.
    fn step(&mut self, day: Day, cost: Money) -> bool {
        if self.comm.is_cancelled() {
            return false;
        }
        if day == self.tree.days() {
            let half = HalfRoute {
                visited: self.visited.clone(),
                route: self.route.clone(),
                cost,
            };
            return self.output.send(half).is_ok();
        }

        let city = self.route[self.route.len() - 1];
        let tree = self.tree;
        for flight in tree.departures(day, city) {
            if self.visited.contains(flight.to) {
                continue;
            }
            self.visited.insert(flight.to);
            self.route.push(flight.to);
            let go_on = self.step(day + 1, cost.saturating_add(flight.cost));
            self.route.pop();
            self.visited.set(flight.to, false);
            if !go_on {
                return false;
            }
        }
        true
    }
}
