//! Simulation parameter structures and YAML parsing.
//!
//! The harness driver describes a run in a small YAML file: which topology
//! shape to wire, how many switches and hosts, and optionally how patiently
//! to wait for convergence. Validation happens here, before any emulated
//! resources are built, so impossible parameter combinations fail fast.
//!
//! ```yaml
//! network:
//!   topology: star
//!   switches: 5
//!   hosts_per_switch: 2
//! readiness:
//!   min_rules_per_switch: 1
//!   max_wait: 90s
//!   poll_interval: 2s
//! ```

use crate::readiness::PollSettings;
use crate::topology::TopologyShape;
use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Topology shape and scale
    pub network: NetworkConfig,
    /// Optional overrides for readiness polling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessConfig>,
}

/// Topology shape and scale for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub topology: TopologyShape,
    pub switches: u32,
    pub hosts_per_switch: u32,
}

/// Readiness polling overrides; anything omitted uses the scale-sensitive
/// defaults from [`PollSettings::for_switch_count`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rules_per_switch: Option<usize>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub max_wait: Option<Duration>,
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<Duration>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
    #[error("Invalid readiness configuration: {0}")]
    InvalidReadiness(String),
}

impl SimulationConfig {
    /// Check parameter combinations that are structurally impossible
    pub fn validate(&self) -> Result<(), ValidationError> {
        let network = &self.network;
        if network.switches < 1 {
            return Err(ValidationError::InvalidNetwork(
                "switches must be at least 1".to_string(),
            ));
        }
        if network.hosts_per_switch < 1 {
            return Err(ValidationError::InvalidNetwork(
                "hosts_per_switch must be at least 1".to_string(),
            ));
        }
        if network.topology.requires_multiple_switches() && network.switches < 2 {
            return Err(ValidationError::InvalidNetwork(format!(
                "{} topology requires at least 2 switches",
                network.topology
            )));
        }

        if let Some(readiness) = &self.readiness {
            if readiness.min_rules_per_switch == Some(0) {
                return Err(ValidationError::InvalidReadiness(
                    "min_rules_per_switch must be at least 1".to_string(),
                ));
            }
            if readiness.max_wait == Some(Duration::ZERO) {
                return Err(ValidationError::InvalidReadiness(
                    "max_wait must be positive".to_string(),
                ));
            }
            if readiness.poll_interval == Some(Duration::ZERO) {
                return Err(ValidationError::InvalidReadiness(
                    "poll_interval must be positive".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Effective polling settings: explicit values over scale defaults
    pub fn poll_settings(&self) -> PollSettings {
        let mut settings = PollSettings::for_switch_count(self.network.switches);
        if let Some(readiness) = &self.readiness {
            if let Some(min_rules) = readiness.min_rules_per_switch {
                settings.min_rules_per_switch = min_rules;
            }
            if let Some(max_wait) = readiness.max_wait {
                settings.max_wait = max_wait;
            }
            if let Some(poll_interval) = readiness.poll_interval {
                settings.poll_interval = poll_interval;
            }
        }
        settings
    }
}

/// Load and validate simulation parameters from a YAML file
pub fn load_simulation_config(path: &Path) -> Result<SimulationConfig> {
    info!("Loading simulation parameters from: {:?}", path);

    let file = std::fs::File::open(path)?;
    let config: SimulationConfig = serde_yaml::from_reader(file)?;
    config.validate()?;

    Ok(config)
}
