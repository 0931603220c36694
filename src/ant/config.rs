//! Ant Colony configuration.

use crate::error::{Error, Result};

/// Configuration for the Ant Colony engine.
///
/// # Examples
///
/// ```
/// use u_fsp::ant::AntConfig;
///
/// let config = AntConfig::default()
///     .with_pool_size(10)
///     .with_decay(0.9)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AntConfig {
    /// Number of ants moving concurrently (in turn) through the graph.
    pub pool_size: usize,

    /// Pheromone added to every flight of a completed lap.
    pub deposit: f64,

    /// Multiplicative evaporation factor in (0, 1].
    pub decay: f64,

    /// Evaporate and follow the trails every `decay_interval * pool_size`
    /// completed laps.
    pub decay_interval: usize,

    /// Maximum tours the follow pass constructs before giving up.
    pub max_follow_attempts: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AntConfig {
    fn default() -> Self {
        Self {
            pool_size: 20,
            deposit: 1.0,
            decay: 0.85,
            decay_interval: 10,
            max_follow_attempts: 1000,
            seed: None,
        }
    }
}

impl AntConfig {
    pub fn with_pool_size(mut self, n: usize) -> Self {
        self.pool_size = n;
        self
    }

    pub fn with_deposit(mut self, deposit: f64) -> Self {
        self.deposit = deposit;
        self
    }

    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_decay_interval(mut self, n: usize) -> Self {
        self.decay_interval = n.max(1);
        self
    }

    pub fn with_max_follow_attempts(mut self, n: usize) -> Self {
        self.max_follow_attempts = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Completed laps between two evaporation passes.
    pub fn laps_per_decay(&self) -> usize {
        self.decay_interval * self.pool_size
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::invalid_config("ant pool_size must be positive"));
        }
        if !(self.deposit >= 0.0) || !self.deposit.is_finite() {
            return Err(Error::invalid_config(format!(
                "ant deposit must be non-negative, got {}",
                self.deposit
            )));
        }
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(Error::invalid_config(format!(
                "ant decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        Ok(())
    }
}
