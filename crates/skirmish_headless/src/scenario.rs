//! Scenario loading and configuration.
//!
//! A scenario is a battlefield map plus the rules it is fought under. Maps
//! are plain text files; rules come from an optional RON file holding a
//! [`SimConfig`].

use std::path::Path;

use skirmish_core::config::SimConfig;
use skirmish_core::error::SimError;
use skirmish_core::parse::parse_battlefield;
use skirmish_core::simulation::Simulation;
use thiserror::Error;
use tracing::debug;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Map or rules rejected by the simulation.
    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// A battlefield and the rules to fight it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name, usually the map file stem.
    pub name: String,
    /// Battlefield text.
    pub map: String,
    /// Rules.
    pub config: SimConfig,
}

impl Scenario {
    /// Build a scenario from map text, checking that it parses.
    pub fn from_map(name: impl Into<String>, map: impl Into<String>) -> Result<Self, ScenarioError> {
        let map = map.into();
        parse_battlefield(&map).map_err(SimError::from)?;
        Ok(Self {
            name: name.into(),
            map,
            config: SimConfig::default(),
        })
    }

    /// Load a map file with default rules.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| "battle".to_string(), |s| s.to_string_lossy().into_owned());
        debug!(%name, bytes = contents.len(), "map loaded");
        Self::from_map(name, contents)
    }

    /// Replace the rules, validating them first.
    pub fn with_config(mut self, config: SimConfig) -> Result<Self, ScenarioError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// A fresh, unstarted simulation of this scenario.
    pub fn simulation(&self) -> Result<Simulation, ScenarioError> {
        Ok(Simulation::from_map(&self.map, &self.config)?)
    }
}

/// Load rules from a RON file. Missing fields take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimConfig, ScenarioError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScenarioError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config: SimConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}
