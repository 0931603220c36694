//! Race configuration and engine roster.

use super::types::Engine;
use crate::ant::{AntConfig, AntEngine};
use crate::bottleneck::Bottleneck;
use crate::dcfs::{Dcfs, DcfsConfig};
use crate::error::{Error, Result};
use crate::mitm::Mitm;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Engines that can take part in a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Ant,
    Bottleneck,
    Dcfs,
    Mitm,
}

/// Engine names recognized but not built into this crate.
const UNSUPPORTED: &[&str] = &["GREEDY", "ROUNDS", "RANDOM", "SITM", "BHDFS"];

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_uppercase();
        match name.as_str() {
            "ANT" => Ok(Self::Ant),
            "BN" | "BOTTLENECK" => Ok(Self::Bottleneck),
            "DCFS" => Ok(Self::Dcfs),
            "MITM" => Ok(Self::Mitm),
            _ if UNSUPPORTED.contains(&name.as_str()) => Err(Error::UnsupportedEngine(name)),
            _ => Err(Error::UnknownEngine(s.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ant => "ANT",
            Self::Bottleneck => "BN",
            Self::Dcfs => "DCFS",
            Self::Mitm => "MITM",
        };
        f.write_str(name)
    }
}

/// Configuration for a [`Race`](super::Race).
///
/// # Environment
///
/// [`RaceConfig::from_env`] reads the following variables; unset or blank
/// ones keep their defaults, malformed ones are an error.
///
/// | variable | field |
/// |---|---|
/// | `FSP_ENGINE` | `engine` |
/// | `FSP_TIMEOUT_MS` | `timeout` |
/// | `DCFS_MAX_BRANCHES` | `dcfs.max_branches` |
/// | `DCFS_DISC_W` | `dcfs.discount_weight` |
/// | `DCFS_NEXT_AVG_W` | `dcfs.next_avg_weight` |
/// | `DCFS_MIN_DISC` | `dcfs.min_discount_rate` |
/// | `DCFS_DISC_THRESH` | `dcfs.discount_threshold` |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fsp::race::{EngineKind, RaceConfig};
///
/// let config = RaceConfig::default()
///     .with_engine(EngineKind::Dcfs)
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(config.roster().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RaceConfig {
    /// Run only this engine instead of the full roster.
    pub engine: Option<EngineKind>,

    /// Wall-clock budget. `None` runs until the engines finish.
    pub timeout: Option<Duration>,

    pub dcfs: DcfsConfig,

    pub ant: AntConfig,

    /// Run the swap polisher alongside the search engines.
    pub polish: bool,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            engine: None,
            timeout: None,
            dcfs: DcfsConfig::default(),
            ant: AntConfig::default(),
            polish: true,
        }
    }
}

impl RaceConfig {
    pub fn with_engine(mut self, engine: EngineKind) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_dcfs(mut self, dcfs: DcfsConfig) -> Self {
        self.dcfs = dcfs;
        self
    }

    pub fn with_ant(mut self, ant: AntConfig) -> Self {
        self.ant = ant;
        self
    }

    pub fn with_polish(mut self, polish: bool) -> Self {
        self.polish = polish;
        self
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(engine) = value(&lookup, "FSP_ENGINE") {
            config.engine = Some(engine.parse()?);
        }
        if let Some(ms) = parse::<u64>(&lookup, "FSP_TIMEOUT_MS")? {
            config.timeout = Some(Duration::from_millis(ms));
        }

        let dcfs = &mut config.dcfs;
        if let Some(n) = parse(&lookup, "DCFS_MAX_BRANCHES")? {
            dcfs.max_branches = Some(n);
        }
        if let Some(w) = parse(&lookup, "DCFS_DISC_W")? {
            dcfs.discount_weight = w;
        }
        if let Some(w) = parse(&lookup, "DCFS_NEXT_AVG_W")? {
            dcfs.next_avg_weight = w;
        }
        if let Some(rate) = parse(&lookup, "DCFS_MIN_DISC")? {
            dcfs.min_discount_rate = rate;
        }
        if let Some(threshold) = parse(&lookup, "DCFS_DISC_THRESH")? {
            dcfs.discount_threshold = Some(threshold);
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.dcfs.validate()?;
        self.ant.validate()?;
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::invalid_config("timeout must be positive"));
        }
        Ok(())
    }

    /// The search engines to race, without the polisher.
    pub fn roster(&self) -> Vec<Box<dyn Engine>> {
        match self.engine {
            Some(kind) => vec![self.build(kind)],
            None => vec![
                self.build(EngineKind::Bottleneck),
                Box::new(Dcfs::new(self.dcfs.clone())),
                Box::new(Dcfs::new(self.dcfs.clone()).with_skip(1)),
                self.build(EngineKind::Ant),
                self.build(EngineKind::Mitm),
            ],
        }
    }

    fn build(&self, kind: EngineKind) -> Box<dyn Engine> {
        match kind {
            EngineKind::Ant => Box::new(AntEngine::new(self.ant.clone())),
            EngineKind::Bottleneck => Box::new(Bottleneck::new()),
            EngineKind::Dcfs => Box::new(Dcfs::new(self.dcfs.clone())),
            EngineKind::Mitm => Box::new(Mitm::new()),
        }
    }
}

/// The trimmed value of `key`, or `None` when unset or blank.
fn value(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match value(lookup, key) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| Error::config(key, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_engine_names() {
        assert_eq!("ant".parse::<EngineKind>().unwrap(), EngineKind::Ant);
        assert_eq!("BN".parse::<EngineKind>().unwrap(), EngineKind::Bottleneck);
        assert_eq!("Bottleneck".parse::<EngineKind>().unwrap(), EngineKind::Bottleneck);
        assert_eq!(" dcfs ".parse::<EngineKind>().unwrap(), EngineKind::Dcfs);
        assert_eq!("MITM".parse::<EngineKind>().unwrap(), EngineKind::Mitm);
        assert!(matches!(
            "greedy".parse::<EngineKind>(),
            Err(Error::UnsupportedEngine(name)) if name == "GREEDY"
        ));
        assert!(matches!(
            "quantum".parse::<EngineKind>(),
            Err(Error::UnknownEngine(_))
        ));
    }

    #[test]
    fn test_display_parses_back() {
        for kind in [
            EngineKind::Ant,
            EngineKind::Bottleneck,
            EngineKind::Dcfs,
            EngineKind::Mitm,
        ] {
            assert_eq!(kind.to_string().parse::<EngineKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_roster() {
        let names: Vec<_> = RaceConfig::default()
            .roster()
            .iter()
            .map(|e| e.name())
            .collect();
        assert_eq!(
            names,
            vec!["Bottleneck", "Dcfs(0)", "Dcfs(1)", "AntEngine(0)", "MeetInTheMiddle"]
        );
    }

    #[test]
    fn test_single_engine_roster() {
        let config = RaceConfig::default().with_engine(EngineKind::Mitm);
        let roster = config.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name(), "MeetInTheMiddle");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = RaceConfig::from_lookup(lookup(&[
            ("FSP_ENGINE", "dcfs"),
            ("FSP_TIMEOUT_MS", "1500"),
            ("DCFS_MAX_BRANCHES", "4"),
            ("DCFS_DISC_W", "0.9"),
            ("DCFS_NEXT_AVG_W", "-0.1"),
            ("DCFS_MIN_DISC", "-0.25"),
            ("DCFS_DISC_THRESH", "300"),
        ]))
        .unwrap();
        assert_eq!(config.engine, Some(EngineKind::Dcfs));
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.dcfs.max_branches, Some(4));
        assert!((config.dcfs.discount_weight - 0.9).abs() < 1e-10);
        assert!((config.dcfs.next_avg_weight + 0.1).abs() < 1e-10);
        assert!((config.dcfs.min_discount_rate + 0.25).abs() < 1e-10);
        assert_eq!(config.dcfs.discount_threshold, Some(300));
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        let config = RaceConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, RaceConfig::default());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = RaceConfig::from_lookup(lookup(&[
            ("FSP_ENGINE", ""),
            ("FSP_TIMEOUT_MS", "  "),
            ("DCFS_DISC_W", ""),
            ("DCFS_MAX_BRANCHES", "\t"),
        ]))
        .unwrap();
        assert_eq!(config, RaceConfig::default());
    }

    #[test]
    fn test_malformed_value() {
        let err = RaceConfig::from_lookup(lookup(&[("DCFS_DISC_W", "lots")])).unwrap_err();
        assert!(matches!(err, Error::Config { ref key, .. } if key == "DCFS_DISC_W"));
        assert!(RaceConfig::from_lookup(lookup(&[("FSP_TIMEOUT_MS", "-5")])).is_err());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = RaceConfig::from_lookup(lookup(&[("DCFS_MAX_BRANCHES", "0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = RaceConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
