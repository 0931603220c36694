//! DCFS configuration.

use crate::error::{Error, Result};
use crate::model::Money;

/// Tuning knobs for Depth+Cheapest-First Search.
///
/// # Scoring
///
/// Each candidate flight gets a deal value
///
/// ```text
/// score = cost - discount_weight * discount + next_avg_weight * next_day_avg
/// discount = route_average(from, to) - cost
/// ```
///
/// where `next_day_avg` is the average price of flights leaving the
/// destination on the following day. Lower is better.
///
/// # Examples
///
/// ```
/// use u_fsp::dcfs::DcfsConfig;
///
/// let config = DcfsConfig::default()
///     .with_discount_weight(0.9)
///     .with_max_branches(3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DcfsConfig {
    /// Weight of the historical discount in the score.
    pub discount_weight: f64,

    /// Weight of the next-day average departure price (look-ahead).
    pub next_avg_weight: f64,

    /// A flight priced above `discount_threshold` must have at least this
    /// discount rate (`discount / cost`) to be considered at all.
    pub min_discount_rate: f64,

    /// Price above which the discount-rate filter applies.
    /// `None` uses the average price of the whole catalog.
    pub discount_threshold: Option<Money>,

    /// Maximum branches explored per level after the first day.
    /// `None` adapts to problem size: 2 above 20 cities, else `n / 2`.
    pub max_branches: Option<usize>,

    /// A candidate whose score exceeds the level's best score by more than
    /// this margin is not explored.
    pub beam_margin: f64,
}

impl Default for DcfsConfig {
    fn default() -> Self {
        Self {
            discount_weight: 0.6,
            next_avg_weight: -0.2,
            min_discount_rate: -0.5,
            discount_threshold: None,
            max_branches: None,
            beam_margin: 30.0,
        }
    }
}

impl DcfsConfig {
    pub fn with_discount_weight(mut self, w: f64) -> Self {
        self.discount_weight = w;
        self
    }

    pub fn with_next_avg_weight(mut self, w: f64) -> Self {
        self.next_avg_weight = w;
        self
    }

    pub fn with_min_discount_rate(mut self, rate: f64) -> Self {
        self.min_discount_rate = rate;
        self
    }

    pub fn with_discount_threshold(mut self, threshold: Money) -> Self {
        self.discount_threshold = Some(threshold);
        self
    }

    pub fn with_max_branches(mut self, n: usize) -> Self {
        self.max_branches = Some(n);
        self
    }

    pub fn with_beam_margin(mut self, margin: f64) -> Self {
        self.beam_margin = margin;
        self
    }

    /// Branch cap for a problem with `n` cities.
    pub fn branches_for(&self, n: usize) -> usize {
        self.max_branches
            .unwrap_or(if n > 20 { 2 } else { n / 2 })
            .max(1)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("discount_weight", self.discount_weight),
            ("next_avg_weight", self.next_avg_weight),
            ("min_discount_rate", self.min_discount_rate),
        ] {
            if !value.is_finite() {
                return Err(Error::invalid_config(format!(
                    "dcfs {name} must be finite, got {value}"
                )));
            }
        }
        if !(self.beam_margin >= 0.0) {
            return Err(Error::invalid_config(format!(
                "dcfs beam_margin must be non-negative, got {}",
                self.beam_margin
            )));
        }
        if self.max_branches == Some(0) {
            return Err(Error::invalid_config("dcfs max_branches must be positive"));
        }
        Ok(())
    }
}
