//! Ant Colony execution loop.

use super::config::AntConfig;
use crate::model::{City, Day, Flight, FlightIndex, Money, Problem, Solution, HOME, NO_COST};
use crate::race::{Comm, Engine};
use fixedbitset::FixedBitSet;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Stochastic reinforcement search with pheromone trails.
///
/// A pool of ants walks the time-expanded graph one flight at a time. The
/// ant with the lowest accumulated cost always moves next, sampling its
/// flight with probability proportional to pheromone and price
/// attractiveness. Completed laps reinforce the flights they used; every
/// `decay_interval * pool_size` laps the trails evaporate and a follow pass
/// tries to turn them into a tour cheaper than the global best.
///
/// Never reports exhaustion; runs until cancelled.
#[derive(Debug, Clone)]
pub struct AntEngine {
    config: AntConfig,
    instance: usize,
}

impl AntEngine {
    pub fn new(config: AntConfig) -> Self {
        Self {
            config,
            instance: 0,
        }
    }

    /// Distinguishes several colonies in one roster (name and seed offset).
    pub fn with_instance(mut self, instance: usize) -> Self {
        self.instance = instance;
        self
    }
}

impl Engine for AntEngine {
    fn name(&self) -> String {
        format!("AntEngine({})", self.instance)
    }

    fn solve(&mut self, comm: &dyn Comm, problem: &Problem) {
        if problem.size() < 2 {
            comm.send_solution(&Solution::empty());
            return;
        }
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.instance as u64)),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let mut colony = Colony::new(problem, &self.config, rng);
        while !comm.is_cancelled() {
            colony.step(comm);
        }
        debug!(
            "{} stopped after {} laps",
            self.name(),
            colony.completed_laps
        );
    }
}

/// Per-flight reinforcement values. Owned by one colony.
#[derive(Debug, Clone)]
pub(crate) struct Trails {
    values: Vec<f64>,
    pool_size: f64,
    avg_cost: f64,
}

impl Trails {
    pub(crate) fn new(problem: &Problem, pool_size: usize) -> Self {
        let avg = problem.stats().overall().average();
        Self {
            values: vec![0.0; problem.flights().len()],
            pool_size: pool_size as f64,
            avg_cost: if avg > 0.0 { avg } else { 1.0 },
        }
    }

    #[cfg(test)]
    pub(crate) fn value(&self, flight: FlightIndex) -> f64 {
        self.values[flight]
    }

    #[cfg(test)]
    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sampling weight: pheromone influence times price attractiveness.
    pub(crate) fn weight(&self, flight: &Flight, index: FlightIndex) -> f64 {
        let pheromone = (self.values[index] + 1.0) / self.pool_size;
        let price = self.avg_cost / flight.cost.max(1) as f64;
        pheromone * price
    }

    pub(crate) fn deposit(&mut self, flights: &[FlightIndex], amount: f64) {
        for &index in flights {
            self.values[index] += amount;
        }
    }

    /// Evaporates every trail by `factor`. Returns the strongest trail left.
    pub(crate) fn decay(&mut self, factor: f64) -> f64 {
        let mut max = 0.0f64;
        for value in &mut self.values {
            *value *= factor;
            max = max.max(*value);
        }
        max
    }

    /// Picks the next flight from `city` on `day`, or `None` if stuck.
    ///
    /// Feasible flights land on an unvisited city, and land home exactly on
    /// the last day.
    pub(crate) fn choose<R: Rng>(
        &self,
        problem: &Problem,
        visited: &FixedBitSet,
        day: Day,
        city: City,
        rng: &mut R,
    ) -> Option<FlightIndex> {
        let graph = problem.graph();
        let last_day = problem.size() - 1;
        let mut candidates = Vec::new();
        let mut thresholds = Vec::new();
        let mut sum = 0.0;
        for &index in graph.departure_indices(city, day) {
            let flight = graph.flight(index);
            if visited.contains(flight.to) || (flight.to == HOME) != (day == last_day) {
                continue;
            }
            sum += self.weight(flight, index);
            candidates.push(index);
            thresholds.push(sum);
        }
        if candidates.is_empty() {
            return None;
        }

        let r = rng.random::<f64>() * sum;
        let pick = thresholds
            .iter()
            .position(|&t| r < t)
            .unwrap_or(candidates.len() - 1);
        Some(candidates[pick])
    }
}

#[derive(Debug, Clone)]
struct Ant {
    day: Day,
    city: City,
    total: Money,
    lap_cost: Money,
    visited: FixedBitSet,
    taken: Vec<FlightIndex>,
}

impl Ant {
    fn new(n: usize) -> Self {
        Self {
            day: 0,
            city: HOME,
            total: 0,
            lap_cost: 0,
            visited: FixedBitSet::with_capacity(n),
            taken: Vec::with_capacity(n),
        }
    }

    /// Back to the start. Accumulated cost is kept as a scheduling penalty.
    fn restart(&mut self) {
        self.day = 0;
        self.city = HOME;
        self.lap_cost = 0;
        self.visited.clear();
        self.taken.clear();
    }
}

pub(crate) struct Colony<'a> {
    problem: &'a Problem,
    config: &'a AntConfig,
    trails: Trails,
    ants: Vec<Ant>,
    rng: StdRng,
    laps_since_decay: usize,
    completed_laps: usize,
    best: Money,
}

impl<'a> Colony<'a> {
    pub(crate) fn new(problem: &'a Problem, config: &'a AntConfig, rng: StdRng) -> Self {
        let n = problem.size();
        Self {
            problem,
            config,
            trails: Trails::new(problem, config.pool_size),
            ants: (0..config.pool_size).map(|_| Ant::new(n)).collect(),
            rng,
            laps_since_decay: 0,
            completed_laps: 0,
            best: NO_COST,
        }
    }

    /// Advances the cheapest ant by one flight.
    pub(crate) fn step(&mut self, comm: &dyn Comm) {
        let chosen = self
            .ants
            .iter()
            .enumerate()
            .min_by_key(|(_, ant)| ant.total)
            .map(|(i, _)| i)
            .unwrap_or(0);

        let ant = &self.ants[chosen];
        let next = self
            .trails
            .choose(self.problem, &ant.visited, ant.day, ant.city, &mut self.rng);
        let Some(index) = next else {
            self.ants[chosen].restart();
            return;
        };

        let flight = *self.problem.graph().flight(index);
        let ant = &mut self.ants[chosen];
        ant.total = ant.total.saturating_add(flight.cost);
        ant.lap_cost = ant.lap_cost.saturating_add(flight.cost);
        ant.day += 1;
        ant.city = flight.to;
        ant.visited.insert(flight.to);
        ant.taken.push(index);

        if ant.day == self.problem.size() {
            self.complete_lap(chosen, comm);
        }
    }

    fn complete_lap(&mut self, chosen: usize, comm: &dyn Comm) {
        let ant = &mut self.ants[chosen];
        self.trails.deposit(&ant.taken, self.config.deposit);
        let lap = if ant.lap_cost < self.best {
            let graph = self.problem.graph();
            Some(Solution::new(
                ant.taken.iter().map(|&i| *graph.flight(i)).collect(),
            ))
        } else {
            None
        };
        ant.restart();
        self.completed_laps += 1;
        self.laps_since_decay += 1;

        if let Some(solution) = lap {
            self.best = comm.send_solution(&solution);
        }

        if self.laps_since_decay >= self.config.laps_per_decay() {
            self.laps_since_decay = 0;
            let strongest = self.trails.decay(self.config.decay);
            debug!("Max pheromone after decay: {strongest:.3}");
            self.follow(comm);
        }
    }

    /// Builds tours along the trails until one beats the global best.
    ///
    /// Gives up on a dead end, after `max_follow_attempts` tours, or when
    /// cancelled.
    pub(crate) fn follow(&mut self, comm: &dyn Comm) {
        let problem = self.problem;
        let n = problem.size();
        let graph = problem.graph();
        let mut visited = FixedBitSet::with_capacity(n);
        let mut tour = Vec::with_capacity(n);

        'attempt: for _ in 0..self.config.max_follow_attempts {
            if comm.is_cancelled() {
                return;
            }
            let bound = comm.best_cost();
            visited.clear();
            tour.clear();
            let mut city = HOME;
            let mut price: Money = 0;
            for day in 0..n {
                let Some(index) = self
                    .trails
                    .choose(problem, &visited, day, city, &mut self.rng)
                else {
                    return;
                };
                let flight = *graph.flight(index);
                price = price.saturating_add(flight.cost);
                if price >= bound {
                    continue 'attempt;
                }
                city = flight.to;
                visited.insert(city);
                tour.push(flight);
            }
            info!("Ants followed a trail to price {price}");
            self.best = comm.send_solution(&Solution::new(tour.clone()));
            return;
        }
    }
}
