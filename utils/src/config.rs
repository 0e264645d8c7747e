//! Protocol configuration with TOML file support.
//!
//! Module profiles describe durations relative to the moment a request is
//! configured; [`EscalationProfile::params_for`] turns one into the concrete
//! parameters a module stores for a request. Amounts are `u64` in TOML and
//! widened to `u128` on the way out.

use crate::logging::LogFormat;
use bond_types::{AssetId, BondEscalationParams, CommitRevealParams, Timestamp, VotingParams};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Bond escalation defaults for newly configured requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationProfile {
    pub bond_asset: String,
    pub bond_size: u64,
    pub max_pledges_per_side: u32,
    /// Primary pledging period, counted from the request's creation.
    pub escalation_period_secs: u64,
    #[serde(default)]
    pub tying_buffer_secs: u64,
    pub dispute_window_secs: u64,
}

impl EscalationProfile {
    pub fn params_for(&self, created_at: Timestamp) -> BondEscalationParams {
        BondEscalationParams {
            bond_asset: AssetId::new(self.bond_asset.clone()),
            bond_size: u128::from(self.bond_size),
            max_pledges_per_side: self.max_pledges_per_side,
            escalation_deadline: created_at.plus(self.escalation_period_secs),
            tying_buffer_secs: self.tying_buffer_secs,
            dispute_window_secs: self.dispute_window_secs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingProfile {
    pub vote_asset: String,
    pub min_votes_for_quorum: u64,
    pub voting_window_secs: u64,
}

impl VotingProfile {
    pub fn params(&self) -> VotingParams {
        VotingParams {
            vote_asset: AssetId::new(self.vote_asset.clone()),
            min_votes_for_quorum: u128::from(self.min_votes_for_quorum),
            voting_window_secs: self.voting_window_secs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRevealProfile {
    pub vote_asset: String,
    pub min_votes_for_quorum: u64,
    pub commit_window_secs: u64,
    pub reveal_window_secs: u64,
}

impl CommitRevealProfile {
    pub fn params(&self) -> CommitRevealParams {
        CommitRevealParams {
            vote_asset: AssetId::new(self.vote_asset.clone()),
            min_votes_for_quorum: u128::from(self.min_votes_for_quorum),
            commit_window_secs: self.commit_window_secs,
            reveal_window_secs: self.reveal_window_secs,
        }
    }
}

/// Configuration for a deployment of the protocol modules.
///
/// Can be loaded from a TOML file via [`ProtocolConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    #[serde(default)]
    pub log_format: LogFormat,

    /// Default filter when `RUST_LOG` is unset (e.g. `"info,bond_escalation=debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting: Option<VotingProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_reveal: Option<CommitRevealProfile>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ProtocolConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Reject profiles no module could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(p) = &self.escalation {
            if p.bond_asset.is_empty() {
                return Err(ConfigError::Invalid("escalation.bond_asset is empty".into()));
            }
            if p.bond_size == 0 {
                return Err(ConfigError::Invalid("escalation.bond_size must be non-zero".into()));
            }
            if p.max_pledges_per_side == 0 {
                return Err(ConfigError::Invalid(
                    "escalation.max_pledges_per_side must be non-zero".into(),
                ));
            }
            if p.escalation_period_secs == 0 || p.dispute_window_secs == 0 {
                return Err(ConfigError::Invalid("escalation windows must be non-empty".into()));
            }
        }
        if let Some(p) = &self.voting {
            if p.vote_asset.is_empty() || p.voting_window_secs == 0 {
                return Err(ConfigError::Invalid(
                    "voting needs an asset and a non-empty window".into(),
                ));
            }
        }
        if let Some(p) = &self.commit_reveal {
            if p.vote_asset.is_empty() || p.commit_window_secs == 0 || p.reveal_window_secs == 0 {
                return Err(ConfigError::Invalid(
                    "commit_reveal needs an asset and non-empty windows".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            escalation: None,
            voting: None,
            commit_reveal: None,
        }
    }
}
