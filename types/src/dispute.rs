//! Dispute and response records as supplied by the coordinator.

use crate::address::AccountId;
use crate::hash::{RequestId, ResponseId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a dispute, as tracked by the coordinator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Unknown dispute (default record).
    #[default]
    None,
    /// Raised and awaiting an outcome.
    Active,
    /// Handed to a resolution module.
    Escalated,
    /// The disputer was right: the response is rejected.
    Won,
    /// The disputer was wrong: the response stands.
    Lost,
    /// Resolution could not produce a verdict.
    NoResolution,
}

impl DisputeStatus {
    /// Whether the dispute already carries a final verdict.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::NoResolution)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Active => "active",
            Self::Escalated => "escalated",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::NoResolution => "no_resolution",
        }
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A challenge against a response.
///
/// `Dispute::default()` is what the coordinator hands back for an unknown id:
/// zero request id and zero creation time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub disputer: AccountId,
    pub proposer: AccountId,
    pub response_id: ResponseId,
    pub request_id: RequestId,
    pub status: DisputeStatus,
    pub created_at: Timestamp,
}

impl Dispute {
    /// Whether this record describes a dispute the coordinator knows about.
    pub fn exists(&self) -> bool {
        !self.created_at.is_epoch()
    }
}

/// A response proposed for a request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub created_at: Timestamp,
    pub request_id: RequestId,
    pub proposer: AccountId,
    pub content: Vec<u8>,
}
