//! Error types for the stick engine

use thiserror::Error;

/// Errors surfaced by the stick engine
///
/// Only construction, configuration updates and queries against a disposed
/// engine can fail. Input handling and emission ticks never return errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StickError {
    /// Invalid configuration or an unusable attach point
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The engine actor has shut down
    #[error("stick engine is no longer running")]
    ActorClosed,
}

impl StickError {
    pub(crate) fn configuration(err: impl std::fmt::Display) -> Self {
        StickError::Configuration(format!("{:#}", err))
    }
}
