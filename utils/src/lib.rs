//! Shared utilities for the bond escalation protocol.

pub mod config;
pub mod logging;

pub use config::{
    CommitRevealProfile, ConfigError, EscalationProfile, ProtocolConfig, VotingProfile,
};
pub use logging::{init_from_config, init_logging, LogFormat};
