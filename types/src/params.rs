//! Per-request module parameters and the registry that holds them.
//!
//! Parameters are decoded once, when a request's module is configured, and
//! are immutable afterwards. How they are encoded on the wire is owned by the
//! coordinator's configuration layer.

use crate::address::AssetId;
use crate::error::ParamsError;
use crate::hash::RequestId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters of the bond escalation module for one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondEscalationParams {
    /// Asset every bond and pledge is denominated in.
    pub bond_asset: AssetId,
    /// Size of the disputer's bond and of each pledge.
    pub bond_size: u128,
    /// Maximum number of pledges per side.
    pub max_pledges_per_side: u32,
    /// End of the primary pledging period.
    pub escalation_deadline: Timestamp,
    /// Grace window after the deadline during which pledges may only tie.
    pub tying_buffer_secs: u64,
    /// How long after a response it may still be disputed.
    pub dispute_window_secs: u64,
}

impl BondEscalationParams {
    /// Last instant at which pledging is still possible.
    pub fn tying_buffer_end(&self) -> Timestamp {
        self.escalation_deadline.plus(self.tying_buffer_secs)
    }
}

/// Parameters of the open token-weighted vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingParams {
    pub vote_asset: AssetId,
    pub min_votes_for_quorum: u128,
    pub voting_window_secs: u64,
}

/// Parameters of the commit-reveal vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRevealParams {
    pub vote_asset: AssetId,
    pub min_votes_for_quorum: u128,
    pub commit_window_secs: u64,
    pub reveal_window_secs: u64,
}

/// Request id → parameters store owned by a module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamRegistry<P> {
    params: HashMap<RequestId, P>,
}

impl<P> ParamRegistry<P> {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
        }
    }

    /// Store the parameters for a request. A request is configured once.
    pub fn configure(&mut self, request_id: RequestId, params: P) -> Result<(), ParamsError> {
        if self.params.contains_key(&request_id) {
            return Err(ParamsError::AlreadyConfigured(request_id));
        }
        self.params.insert(request_id, params);
        Ok(())
    }

    pub fn get(&self, request_id: &RequestId) -> Result<&P, ParamsError> {
        self.params
            .get(request_id)
            .ok_or(ParamsError::NotConfigured(*request_id))
    }

    pub fn is_configured(&self, request_id: &RequestId) -> bool {
        self.params.contains_key(request_id)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<P> Default for ParamRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}
