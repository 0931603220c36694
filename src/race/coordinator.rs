//! The single writer of the recorded best solution.

use super::polisher::Polisher;
use super::types::Update;
use crate::model::{Money, Problem, Solution};
use log::{info, trace, warn};
use std::fmt;
use std::sync::Arc;

/// Owns the authoritative best solution of a race.
///
/// Every accepted update goes through [`Coordinator::offer`], which re-checks
/// the candidate against the current best and against the problem
/// structure. Because only the coordinator loop calls it, accepted updates
/// are totally ordered and the recorded cost never increases.
pub struct Coordinator {
    problem: Arc<Problem>,
    labels: Vec<String>,
    best: Solution,
    accepted: usize,
    history: Vec<Money>,
    polisher: Option<Box<dyn Polisher>>,
}

impl Coordinator {
    /// Creates a coordinator for engines named `labels` (indexed by
    /// [`EngineId`](super::EngineId)).
    pub fn new(problem: Arc<Problem>, labels: Vec<String>) -> Self {
        Self {
            problem,
            labels,
            best: Solution::none(),
            accepted: 0,
            history: Vec::new(),
            polisher: None,
        }
    }

    /// Forwards every accepted update to `polisher`.
    pub fn with_polisher(mut self, polisher: Box<dyn Polisher>) -> Self {
        self.polisher = Some(polisher);
        self
    }

    #[inline]
    pub fn best_cost(&self) -> Money {
        self.best.total_cost
    }

    #[inline]
    pub fn best(&self) -> &Solution {
        &self.best
    }

    #[inline]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Best cost after each accepted update, oldest first.
    #[inline]
    pub fn history(&self) -> &[Money] {
        &self.history
    }

    /// Offers a candidate. Returns `true` if it became the new best.
    ///
    /// Rejected when its cost is not strictly below the recorded best, or
    /// when it fails [`Solution::validate`].
    pub fn offer(&mut self, update: Update) -> bool {
        if update.solution.total_cost >= self.best.total_cost {
            trace!(
                "Stale solution from {} with price {} (best {})",
                self.label(&update),
                update.solution.total_cost,
                self.best.total_cost
            );
            return false;
        }
        if let Err(reason) = update.solution.validate(&self.problem) {
            warn!("{} sent a broken solution: {}", self.label(&update), reason);
            return false;
        }

        self.best = update.solution.clone();
        self.accepted += 1;
        self.history.push(self.best.total_cost);
        info!(
            "New best solution found by {} with price {}",
            self.label(&update),
            self.best.total_cost
        );

        if let Some(polisher) = &self.polisher {
            polisher.offer(&update);
        }
        true
    }

    /// Consumes the coordinator, yielding the best solution and history.
    pub fn into_parts(self) -> (Solution, usize, Vec<Money>) {
        (self.best, self.accepted, self.history)
    }

    pub(crate) fn name(&self, engine: usize) -> &str {
        self.labels.get(engine).map(String::as_str).unwrap_or("?")
    }

    fn label(&self, update: &Update) -> Label<'_> {
        Label {
            engine: self.name(update.engine),
            origin: update.is_relayed().then(|| self.name(update.origin)),
        }
    }
}

/// Display name of an update's sender, formatted only when logged.
struct Label<'a> {
    engine: &'a str,
    origin: Option<&'a str>,
}

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(f, "{}({})", self.engine, origin),
            None => f.write_str(self.engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Flight, InvalidSolution};
    use crate::race::testing::revisiting_tour;
    use std::sync::Mutex;

    fn problem() -> Arc<Problem> {
        Arc::new(
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
            .unwrap(),
        )
    }

    fn update(flights: Vec<Flight>) -> Update {
        Update {
            solution: Solution::new(flights),
            engine: 0,
            origin: 0,
        }
    }

    fn cheap() -> Update {
        update(vec![
            Flight::new(0, 1, 0, 10),
            Flight::new(1, 2, 1, 5),
            Flight::new(2, 0, 2, 20),
        ])
    }

    fn pricey() -> Update {
        update(vec![
            Flight::new(0, 2, 0, 50),
            Flight::new(2, 1, 1, 5),
            Flight::new(1, 0, 2, 10),
        ])
    }

    #[test]
    fn test_accepts_improvements_only() {
        let mut c = Coordinator::new(problem(), vec!["a".into()]);
        assert!(c.offer(pricey()));
        assert_eq!(c.best_cost(), 65);
        assert!(c.offer(cheap()));
        assert_eq!(c.best_cost(), 35);
        assert!(!c.offer(pricey()));
        assert!(!c.offer(cheap()));
        assert_eq!(c.history(), &[65, 35]);
        assert_eq!(c.accepted(), 2);
    }

    #[test]
    fn test_rejects_days_out_of_order() {
        let mut c = Coordinator::new(problem(), vec!["a".into()]);
        let broken = update(vec![
            Flight::new(0, 1, 0, 10),
            Flight::new(1, 0, 2, 10),
            Flight::new(1, 0, 2, 10),
        ]);
        assert!(!c.offer(broken));
        assert!(!c.best().is_found());
        assert!(c.history().is_empty());
    }

    #[test]
    fn test_rejects_duplicate_destination() {
        let (problem, tour) = revisiting_tour();
        assert_eq!(tour.validate(&problem), Err(InvalidSolution::CityRevisited(1)));

        let mut c = Coordinator::new(Arc::new(problem), vec!["a".into()]);
        assert!(!c.offer(update(tour.flights)));
        assert!(!c.best().is_found());
        assert_eq!(c.accepted(), 0);
        assert!(c.history().is_empty());
    }

    struct Recorder(Arc<Mutex<Vec<Money>>>);

    impl Polisher for Recorder {
        fn offer(&self, update: &Update) {
            self.0.lock().unwrap().push(update.solution.total_cost);
        }
    }

    #[test]
    fn test_forwards_accepted_to_polisher() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut c = Coordinator::new(problem(), vec!["a".into()])
            .with_polisher(Box::new(Recorder(Arc::clone(&seen))));
        c.offer(pricey());
        c.offer(pricey());
        c.offer(cheap());
        assert_eq!(*seen.lock().unwrap(), vec![65, 35]);
    }

    #[test]
    fn test_relayed_label() {
        let c = Coordinator::new(problem(), vec!["Polisher".into(), "Dcfs(0)".into()]);
        let mut u = cheap();
        u.engine = 0;
        u.origin = 1;
        assert_eq!(c.label(&u).to_string(), "Polisher(Dcfs(0))");
        u.origin = 0;
        assert_eq!(c.label(&u).to_string(), "Polisher");
        assert_eq!(c.name(9), "?");
    }
}
