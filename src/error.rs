//! Crate-wide error type.

use crate::model::Flight;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid flight {flight}: {reason}")]
    InvalidFlight { flight: Flight, reason: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot parse {key}={value:?}")]
    Config { key: String, value: String },
    #[error("unknown engine {0:?}")]
    UnknownEngine(String),
    #[error("engine {0:?} is not part of this build")]
    UnsupportedEngine(String),
    #[error("no engines to race")]
    EmptyRoster,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub fn config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            value: value.into(),
        }
    }
}
