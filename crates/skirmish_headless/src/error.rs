//! Error type for headless runs.

use skirmish_core::error::SimError;
use thiserror::Error;

use crate::scenario::ScenarioError;

/// Anything that can stop a headless command.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// Map or config could not be loaded.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// Simulation rejected the battle.
    #[error(transparent)]
    Simulation(#[from] SimError),
    /// Worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// Report could not be serialized.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    /// Report could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for headless operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;
