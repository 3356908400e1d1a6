use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::sweep::{ConfigError, ParameterMap, SweepPlan};
use crate::synthesis::{default_algorithms, Algorithm};
use crate::topology::TopologyKind;

/// Complete experiment configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    pub sweep: SweepConfig,
    /// Absent for generate-only experiments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<SynthesisConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ExperimentConfig {
    /// Validate the configuration, including the sweep's parameter set
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.sweep.plan()?;

        if let Some(synthesis) = &self.synthesis {
            synthesis.validate()?;
        }

        if self.output.topology_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidOutput(
                "topology_dir cannot be empty".to_string(),
            ));
        }
        if self.output.results.as_os_str().is_empty() {
            return Err(ValidationError::InvalidOutput(
                "results path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Synthesis section, required for anything beyond topology generation
    pub fn synthesis(&self) -> Result<&SynthesisConfig, ValidationError> {
        self.synthesis.as_ref().ok_or_else(|| {
            ValidationError::InvalidSynthesis("a synthesis section is required".to_string())
        })
    }
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralConfig {
    /// Seed of the random source threaded through topology generation
    #[serde(default)]
    pub seed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Topology kind and the candidate values of each of its parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SweepConfig {
    pub topology: TopologyKind,
    #[serde(flatten)]
    pub parameters: ParameterMap,
}

impl SweepConfig {
    pub fn plan(&self) -> Result<SweepPlan, ConfigError> {
        SweepPlan::new(self.topology, &self.parameters)
    }
}

/// External synthesis tool settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SynthesisConfig {
    pub executable: String,
    /// Wall-clock limit per invocation, e.g. "10m"
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.executable.trim().is_empty() {
            return Err(ValidationError::InvalidSynthesis(
                "executable cannot be empty".to_string(),
            ));
        }
        if self.algorithms.is_empty() {
            return Err(ValidationError::InvalidSynthesis(
                "at least one algorithm is required".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ValidationError::InvalidSynthesis(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for algorithm in &self.algorithms {
            if algorithm.name.trim().is_empty() {
                return Err(ValidationError::InvalidSynthesis(
                    "algorithm name cannot be empty".to_string(),
                ));
            }
            if algorithm.attempts == 0 {
                return Err(ValidationError::InvalidSynthesis(format!(
                    "algorithm '{}' needs at least one attempt",
                    algorithm.name
                )));
            }
            if !names.insert(algorithm.name.as_str()) {
                return Err(ValidationError::InvalidSynthesis(format!(
                    "algorithm '{}' is listed more than once",
                    algorithm.name
                )));
            }
        }

        Ok(())
    }
}

/// Where topology files and the results table go
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_topology_dir")]
    pub topology_dir: PathBuf,
    #[serde(default = "default_results_path")]
    pub results: PathBuf,
}

fn default_topology_dir() -> PathBuf {
    PathBuf::from("topologies")
}

fn default_results_path() -> PathBuf {
    PathBuf::from("results.csv")
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid sweep configuration: {0}")]
    InvalidSweep(#[from] ConfigError),
    #[error("Invalid synthesis configuration: {0}")]
    InvalidSynthesis(String),
    #[error("Invalid output configuration: {0}")]
    InvalidOutput(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            log_level: Some("info".to_string()),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            topology_dir: default_topology_dir(),
            results: default_results_path(),
        }
    }
}
