//! The race loop.

use super::channel::{connect, Hub, SolutionComm};
use super::config::RaceConfig;
use super::coordinator::Coordinator;
use super::polisher::{Polisher, SwapPolisher};
use super::types::{Engine, EngineId, RaceResult, Termination};
use crate::error::{Error, Result};
use crate::model::Problem;
use crossbeam_channel::{after, never, select, unbounded, Receiver, Sender};
use log::{error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Engine threads recurse once per day of the route.
const STACK_SIZE: usize = 16 * 1024 * 1024;

/// Runs several engines against one problem and keeps the best tour.
///
/// Every engine gets its own thread and talks to the calling thread, which
/// plays the coordinator, through a [`SolutionComm`]. The race ends when an
/// engine reports that it exhausted its search, when the timeout fires, or
/// when every search engine has returned. Engines are then told to stop
/// through the shared cancellation flag; they are not joined.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use u_fsp::model::{Flight, Problem};
/// use u_fsp::race::{Race, RaceConfig};
///
/// let problem = Problem::new(2, vec![Flight::new(0, 1, 0, 10), Flight::new(1, 0, 1, 20)])?;
/// let config = RaceConfig::default().with_timeout(Duration::from_secs(1));
/// let result = Race::new(config)?.run(Arc::new(problem))?;
/// assert_eq!(result.best.total_cost, 30);
/// # Ok::<(), u_fsp::error::Error>(())
/// ```
pub struct Race {
    engines: Vec<Box<dyn Engine>>,
    polisher: Option<(Box<dyn Engine>, Box<dyn Polisher>)>,
    config: RaceConfig,
}

impl Race {
    /// The roster described by `config`, with the swap polisher if enabled.
    pub fn new(config: RaceConfig) -> Result<Self> {
        config.validate()?;
        let race = Self::with_engines(config.roster(), config);
        if !race.config.polish {
            return Ok(race);
        }
        let (polisher, inbox) = SwapPolisher::new();
        Ok(race.with_polisher(Box::new(polisher), Box::new(inbox)))
    }

    /// A race between exactly `engines`. Only `config.timeout` is used.
    pub fn with_engines(engines: Vec<Box<dyn Engine>>, config: RaceConfig) -> Self {
        Self {
            engines,
            polisher: None,
            config,
        }
    }

    /// Adds an auxiliary engine fed with every accepted update through
    /// `inbox`. It runs until cancelled and does not count as a search
    /// engine for [`Termination::EnginesExited`].
    pub fn with_polisher(mut self, engine: Box<dyn Engine>, inbox: Box<dyn Polisher>) -> Self {
        self.polisher = Some((engine, inbox));
        self
    }

    /// Runs the race with the configured timeout, if any.
    pub fn run(self, problem: Arc<Problem>) -> Result<RaceResult> {
        let timeout = match self.config.timeout {
            Some(duration) => after(duration),
            None => never(),
        };
        self.run_until(problem, timeout)
    }

    /// Runs the race until `timeout` delivers, or another end condition.
    pub fn run_until(self, problem: Arc<Problem>, timeout: Receiver<Instant>) -> Result<RaceResult> {
        if problem.size() < 2 {
            info!("Trivial problem with {} cities", problem.size());
            return Ok(RaceResult::trivial());
        }
        if self.engines.is_empty() {
            return Err(Error::EmptyRoster);
        }

        let searchers = self.engines.len();
        let mut workers = self.engines;
        let mut inbox = None;
        if let Some((engine, polisher)) = self.polisher {
            workers.push(engine);
            inbox = Some(polisher);
        }

        let labels: Vec<String> = workers.iter().map(|e| e.name()).collect();
        let cancel = Arc::new(AtomicBool::new(false));
        let (hub, comms) = connect(workers.len(), &cancel);
        let (exit_tx, exits) = unbounded();
        info!(
            "Racing {} on {} cities",
            labels.join(", "),
            problem.size()
        );
        for ((id, engine), comm) in workers.into_iter().enumerate().zip(comms) {
            spawn(id, engine, comm, Arc::clone(&problem), exit_tx.clone());
        }
        drop(exit_tx);

        let mut coordinator = Coordinator::new(problem, labels);
        if let Some(polisher) = inbox {
            coordinator = coordinator.with_polisher(polisher);
        }

        let termination = arbitrate(&mut coordinator, &hub, exits, timeout, searchers);
        cancel.store(true, Ordering::Relaxed);
        // Candidates queued before the end still count.
        while let Ok(update) = hub.updates.try_recv() {
            coordinator.offer(update);
        }
        drop(hub);

        let (best, accepted_updates, cost_history) = coordinator.into_parts();
        info!(
            "Race over ({:?}), best price {}",
            termination, best.total_cost
        );
        Ok(RaceResult {
            best,
            termination,
            accepted_updates,
            cost_history,
        })
    }
}

/// The coordinator loop. Serves queries and updates until an end condition.
///
/// `select!` picks uniformly among ready operations, so no source has
/// priority over another.
fn arbitrate(
    coordinator: &mut Coordinator,
    hub: &Hub,
    exits: Receiver<EngineId>,
    timeout: Receiver<Instant>,
    searchers: usize,
) -> Termination {
    let mut exited = 0;
    loop {
        select! {
            recv(hub.updates) -> msg => {
                if let Ok(update) = msg {
                    coordinator.offer(update);
                }
            }
            recv(hub.queries) -> msg => {
                if let Ok(engine) = msg {
                    hub.reply(engine, coordinator.best_cost());
                }
            }
            recv(hub.done) -> msg => {
                if let Ok(engine) = msg {
                    return exhausted(coordinator, engine);
                }
            }
            recv(exits) -> msg => {
                if let Ok(engine) = msg {
                    if engine < searchers {
                        exited += 1;
                    }
                }
                if exited >= searchers {
                    // An engine signals completion before it returns.
                    if let Ok(engine) = hub.done.try_recv() {
                        return exhausted(coordinator, engine);
                    }
                    info!("All engines returned");
                    return Termination::EnginesExited;
                }
            }
            recv(timeout) -> _ => {
                info!("Timeout");
                return Termination::Timeout;
            }
        }
    }
}

fn exhausted(coordinator: &Coordinator, engine: EngineId) -> Termination {
    let engine = coordinator.name(engine).to_string();
    info!("{} searched its whole space", engine);
    Termination::Exhausted { engine }
}

/// Starts `engine` on its own named thread. The thread reports on `exits`
/// when the engine returns or panics.
fn spawn(
    id: EngineId,
    mut engine: Box<dyn Engine>,
    comm: SolutionComm,
    problem: Arc<Problem>,
    exits: Sender<EngineId>,
) {
    let name = engine.name();
    let notify = exits.clone();
    let spawned = thread::Builder::new()
        .name(format!("fsp-{name}"))
        .stack_size(STACK_SIZE)
        .spawn(move || {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| engine.solve(&comm, &problem)));
            if let Err(payload) = outcome {
                error!("{} crashed: {}", name, panic_message(payload.as_ref()));
            }
            let _ = exits.send(id);
        });
    if let Err(e) = spawned {
        error!("Cannot start engine thread: {}", e);
        let _ = notify.send(id);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bottleneck::Bottleneck;
    use crate::dcfs::{Dcfs, DcfsConfig};
    use crate::mitm::Mitm;
    use crate::model::{Flight, InvalidSolution, Money, Solution, NO_COST};
    use crate::race::testing::{brute_force, revisiting_tour, scenario};
    use crate::race::{Comm, EngineKind};
    use proptest::prelude::*;
    use std::time::Duration;

    struct Panicker;

    impl Engine for Panicker {
        fn name(&self) -> String {
            "Panicker".into()
        }

        fn solve(&mut self, _comm: &dyn Comm, _problem: &Problem) {
            panic!("boom");
        }
    }

    /// Runs until cancelled without finding anything.
    struct Idle;

    impl Engine for Idle {
        fn name(&self) -> String {
            "Idle".into()
        }

        fn solve(&mut self, comm: &dyn Comm, _problem: &Problem) {
            while !comm.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
        }
    }

    /// Submits a fixed solution, then reports exhaustion.
    struct Submitter(Solution);

    impl Engine for Submitter {
        fn name(&self) -> String {
            "Submitter".into()
        }

        fn solve(&mut self, comm: &dyn Comm, _problem: &Problem) {
            comm.send_solution(&self.0);
            comm.done();
        }
    }

    fn config() -> RaceConfig {
        RaceConfig::default().with_timeout(Duration::from_secs(10))
    }

    #[test]
    fn test_full_roster_converges_on_scenario() {
        let result = Race::new(config()).unwrap().run(Arc::new(scenario())).unwrap();
        assert_eq!(result.best.total_cost, 35);
        assert_eq!(result.best.validate(&scenario()), Ok(()));
        assert_ne!(result.termination, Termination::Timeout);
    }

    #[test]
    fn test_every_engine_alone_finds_scenario_optimum() {
        for kind in [EngineKind::Bottleneck, EngineKind::Dcfs, EngineKind::Mitm] {
            let config = config().with_engine(kind).with_polish(false);
            let result = Race::new(config).unwrap().run(Arc::new(scenario())).unwrap();
            assert_eq!(result.best.total_cost, 35, "{kind}");
        }
    }

    #[test]
    fn test_ant_finds_scenario_optimum_before_timeout() {
        let config = RaceConfig::default()
            .with_engine(EngineKind::Ant)
            .with_ant(crate::ant::AntConfig::default().with_seed(7))
            .with_timeout(Duration::from_millis(300));
        let result = Race::new(config).unwrap().run(Arc::new(scenario())).unwrap();
        assert_eq!(result.best.total_cost, 35);
        assert_eq!(result.termination, Termination::Timeout);
    }

    #[test]
    fn test_trivial_problem() {
        let problem = Arc::new(Problem::new(1, vec![]).unwrap());
        let result = Race::new(config()).unwrap().run(problem).unwrap();
        assert_eq!(result.termination, Termination::Trivial);
        assert_eq!(result.best, Solution::empty());
        assert!(result.is_found());
        assert_eq!(result.accepted_updates, 0);
    }

    #[test]
    fn test_bottleneck_alone_ends_when_engines_exit() {
        let race = Race::with_engines(vec![Box::new(Bottleneck::new())], config());
        let result = race.run(Arc::new(scenario())).unwrap();
        assert_eq!(result.termination, Termination::EnginesExited);
        assert_eq!(result.best.total_cost, 35);
    }

    #[test]
    fn test_panicking_engine_does_not_stop_the_race() {
        let engines: Vec<Box<dyn Engine>> = vec![Box::new(Panicker), Box::new(Bottleneck::new())];
        let result = Race::with_engines(engines, config())
            .run(Arc::new(scenario()))
            .unwrap();
        assert_eq!(result.best.total_cost, 35);
        assert_eq!(result.termination, Termination::EnginesExited);
    }

    #[test]
    fn test_timeout_without_solution() {
        let config = RaceConfig::default().with_timeout(Duration::from_millis(50));
        let result = Race::with_engines(vec![Box::new(Idle)], config)
            .run(Arc::new(scenario()))
            .unwrap();
        assert_eq!(result.termination, Termination::Timeout);
        assert!(!result.is_found());
        assert_eq!(result.best.total_cost, NO_COST);
    }

    #[test]
    fn test_external_timer() {
        let result = Race::with_engines(vec![Box::new(Idle)], RaceConfig::default())
            .run_until(Arc::new(scenario()), after(Duration::from_millis(20)))
            .unwrap();
        assert_eq!(result.termination, Termination::Timeout);
    }

    #[test]
    fn test_malformed_candidate_rejected() {
        let broken = Solution::new(vec![
            Flight::new(0, 1, 0, 10),
            Flight::new(1, 0, 2, 10),
            Flight::new(1, 0, 2, 10),
        ]);
        let result = Race::with_engines(vec![Box::new(Submitter(broken))], config())
            .run(Arc::new(scenario()))
            .unwrap();
        assert!(!result.is_found());
        assert_eq!(result.accepted_updates, 0);
        assert_eq!(
            result.termination,
            Termination::Exhausted {
                engine: "Submitter".into()
            }
        );
    }

    #[test]
    fn test_revisiting_candidate_rejected() {
        let (problem, tour) = revisiting_tour();
        assert_eq!(tour.validate(&problem), Err(InvalidSolution::CityRevisited(1)));
        let result = Race::with_engines(vec![Box::new(Submitter(tour))], config())
            .run(Arc::new(problem))
            .unwrap();
        assert!(!result.is_found());
        assert_eq!(result.accepted_updates, 0);
        assert!(result.cost_history.is_empty());
        assert_eq!(
            result.termination,
            Termination::Exhausted {
                engine: "Submitter".into()
            }
        );
    }

    #[test]
    fn test_update_before_done_is_kept() {
        let tour = Solution::new(vec![
            Flight::new(0, 2, 0, 50),
            Flight::new(2, 1, 1, 5),
            Flight::new(1, 0, 2, 10),
        ]);
        let result = Race::with_engines(vec![Box::new(Submitter(tour))], config())
            .run(Arc::new(scenario()))
            .unwrap();
        assert_eq!(result.best.total_cost, 65);
        assert_eq!(result.cost_history, vec![65]);
    }

    #[test]
    fn test_empty_roster() {
        let race = Race::with_engines(Vec::new(), config());
        assert!(matches!(
            race.run(Arc::new(scenario())),
            Err(Error::EmptyRoster)
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = config().with_dcfs(DcfsConfig::default().with_max_branches(0));
        assert!(Race::new(config).is_err());
    }

    fn instance() -> impl Strategy<Value = Problem> {
        (2usize..=5).prop_flat_map(|n| {
            prop::collection::vec((prop::bool::weighted(0.6), 1i64..100), n * n * n).prop_map(
                move |cells| {
                    let mut flights = Vec::new();
                    for (i, (present, cost)) in cells.into_iter().enumerate() {
                        let (from, to, day) = (i / (n * n), (i / n) % n, i % n);
                        if present && from != to {
                            flights.push(Flight::new(from, to, day, cost));
                        }
                    }
                    Problem::new(n, flights).unwrap()
                },
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_race_is_exact_on_small_instances(problem in instance()) {
            let problem = Arc::new(problem);
            let engines: Vec<Box<dyn Engine>> = vec![
                Box::new(Bottleneck::new()),
                Box::new(Dcfs::new(DcfsConfig::default())),
                Box::new(Mitm::new()),
            ];
            let (polisher, inbox) = SwapPolisher::new();
            let result = Race::with_engines(engines, config())
                .with_polisher(Box::new(polisher), Box::new(inbox))
                .run(Arc::clone(&problem))
                .unwrap();

            prop_assert_ne!(&result.termination, &Termination::Timeout);
            prop_assert_eq!(result.best.total_cost, brute_force(&problem));
            if result.is_found() {
                prop_assert_eq!(result.best.validate(&problem), Ok(()));
            }
            let history: &[Money] = &result.cost_history;
            prop_assert!(history.windows(2).all(|w| w[1] < w[0]));
            prop_assert_eq!(history.len(), result.accepted_updates);
        }
    }
}
