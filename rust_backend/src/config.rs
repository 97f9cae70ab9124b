//! Handover configuration file support.
//!
//! This module reads the tuning of every pipeline stage from a TOML file.
//! Every section is optional; missing values fall back to the defaults of
//! the stage they configure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::decision::{DecisionConfig, DecisionWeights};
use crate::error::{HandoverError, HandoverResult};
use crate::models::{Constellation, EventWeights};
use crate::selection::scoring::default_candidate_event_weights;
use crate::selection::{CandidatePoolConfig, CandidateWeights};
use crate::signal::{
    ConstellationParams, MeasurementSettings, SignalQualityCalculator, UserTerminal,
};
use crate::thresholds::{ControllerConfig, ThresholdSet};

/// Complete handover configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandoverConfig {
    #[serde(default)]
    pub candidates: CandidateSettings,
    #[serde(default)]
    pub decision: DecisionSettings,
    #[serde(default)]
    pub thresholds: ThresholdSet,
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub signal: MeasurementSettings,
    #[serde(default)]
    pub terminal: UserTerminal,
    /// Downlink overrides keyed by constellation tag.
    #[serde(default)]
    pub constellations: BTreeMap<String, ConstellationParams>,
}

/// Candidate pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSettings {
    #[serde(default = "default_min_candidates")]
    pub min_candidates: usize,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default)]
    pub weights: CandidateWeights,
    #[serde(default = "default_candidate_event_weights")]
    pub event_weights: EventWeights,
}

/// Decision engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSettings {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default)]
    pub weights: DecisionWeights,
    #[serde(default = "default_decision_event_weights")]
    pub event_weights: EventWeights,
}

/// Threshold controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSettings {
    #[serde(default = "default_momentum")]
    pub momentum: f64,
    #[serde(default = "default_min_adjustment_interval")]
    pub min_adjustment_interval_s: u64,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_min_candidates() -> usize {
    1
}

fn default_max_candidates() -> usize {
    5
}

fn default_history_capacity() -> usize {
    100
}

fn default_decision_event_weights() -> EventWeights {
    DecisionConfig::default().event_weights
}

fn default_momentum() -> f64 {
    0.8
}

fn default_min_adjustment_interval() -> u64 {
    300
}

impl Default for CandidateSettings {
    fn default() -> Self {
        Self {
            min_candidates: default_min_candidates(),
            max_candidates: default_max_candidates(),
            weights: CandidateWeights::default(),
            event_weights: default_candidate_event_weights(),
        }
    }
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            weights: DecisionWeights::default(),
            event_weights: default_decision_event_weights(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            momentum: default_momentum(),
            min_adjustment_interval_s: default_min_adjustment_interval(),
            history_capacity: default_history_capacity(),
        }
    }
}

impl HandoverConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(HandoverConfig)` if successful
    /// * `Err(HandoverError::Configuration)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> HandoverResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            HandoverError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> HandoverResult<Self> {
        let config: HandoverConfig = toml::from_str(content).map_err(|e| {
            HandoverError::Configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `handover.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(None)` if no config file exists in any of them
    /// * `Ok(Some(HandoverConfig))` for the first file found
    /// * `Err(HandoverError::Configuration)` if that file cannot be read, parsed or validated
    pub fn from_default_location() -> HandoverResult<Option<Self>> {
        Self::from_first_existing(&[
            PathBuf::from("handover.toml"),
            PathBuf::from("rust_backend/handover.toml"),
            PathBuf::from("../handover.toml"),
        ])
    }

    /// Load the first of `search_paths` that exists. A broken file is an
    /// error, never skipped in favour of a later one.
    pub fn from_first_existing(search_paths: &[PathBuf]) -> HandoverResult<Option<Self>> {
        match search_paths.iter().find(|path| path.exists()) {
            Some(path) => {
                log::info!("Loading handover configuration from {}", path.display());
                Self::from_file(path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Check every section. Called by the loaders and by the pipeline.
    pub fn validate(&self) -> HandoverResult<()> {
        self.pool_config().validate()?;
        self.decision_config().validate()?;
        self.controller_config().validate()?;
        self.thresholds.validate()?;

        if !(0.0..90.0).contains(&self.signal.min_elevation_deg) {
            return Err(HandoverError::Configuration(format!(
                "signal.min_elevation_deg must be in [0, 90), got {}",
                self.signal.min_elevation_deg
            )));
        }
        if self.signal.measurement_bandwidth_rb == 0 {
            return Err(HandoverError::Configuration(
                "signal.measurement_bandwidth_rb must be at least 1".to_string(),
            ));
        }

        for (tag, params) in &self.constellations {
            tag.parse::<Constellation>()?;
            if !params.eirp_dbw.is_finite() || !(params.frequency_ghz > 0.0) {
                return Err(HandoverError::Configuration(format!(
                    "constellations.{}: eirp_dbw must be finite and frequency_ghz positive",
                    tag
                )));
            }
        }

        Ok(())
    }

    pub fn pool_config(&self) -> CandidatePoolConfig {
        CandidatePoolConfig {
            min_candidates: self.candidates.min_candidates,
            max_candidates: self.candidates.max_candidates,
            weights: self.candidates.weights,
            event_weights: self.candidates.event_weights,
        }
    }

    pub fn decision_config(&self) -> DecisionConfig {
        DecisionConfig {
            weights: self.decision.weights,
            event_weights: self.decision.event_weights,
            history_capacity: self.decision.history_capacity,
        }
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            momentum: self.controller.momentum,
            min_adjustment_interval_s: self.controller.min_adjustment_interval_s,
            history_capacity: self.controller.history_capacity,
        }
    }

    /// Signal calculator with the configured terminal, settings and
    /// constellation overrides.
    pub fn calculator(&self) -> HandoverResult<SignalQualityCalculator> {
        let mut calculator = SignalQualityCalculator::new()
            .with_terminal(self.terminal)
            .with_settings(self.signal);

        for (tag, params) in &self.constellations {
            calculator = calculator.with_constellation(tag.parse()?, *params);
        }

        Ok(calculator)
    }
}
