//! Open token-weighted vote.
//!
//! Votes are cast in the clear during `[start, start + voting_window)` and
//! move the voted amount into the module's custody straight away.

use crate::error::ResolutionError;
use crate::module::{
    ensure_custody, only_oracle, open_dispute, reclaim_refunds, refund_voters, verdict,
    ResolutionModule,
};
use bond_types::{
    AccountId, DisputeId, DisputeStatus, Oracle, ParamRegistry, RequestId, Timestamp,
    TokenTransfer, VotingParams,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The vote on one dispute.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub start_time: Timestamp,
    pub total_votes: u128,
    pub votes: HashMap<AccountId, u128>,
    /// Distinct voters in order of their first vote.
    pub voters: Vec<AccountId>,
    pub resolved: bool,
}

pub struct OpenVoteEngine {
    address: AccountId,
    oracle: AccountId,
    params: ParamRegistry<VotingParams>,
    records: HashMap<DisputeId, VoteRecord>,
}

impl OpenVoteEngine {
    pub fn new(address: AccountId, oracle: AccountId) -> Self {
        Self {
            address,
            oracle,
            params: ParamRegistry::new(),
            records: HashMap::new(),
        }
    }

    /// The module's account; it holds the vote tokens while a vote runs.
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    pub fn configure_request(
        &mut self,
        caller: &AccountId,
        request_id: RequestId,
        params: VotingParams,
    ) -> Result<(), ResolutionError> {
        only_oracle(&self.oracle, caller)?;
        self.params.configure(request_id, params)?;
        Ok(())
    }

    pub fn decode_request_data(
        &self,
        request_id: &RequestId,
    ) -> Result<&VotingParams, ResolutionError> {
        Ok(self.params.get(request_id)?)
    }

    /// Cast `amount` votes on `dispute_id`, locking them in custody.
    ///
    /// Repeated votes by the same voter add up.
    pub fn cast_vote(
        &mut self,
        voter: &AccountId,
        oracle: &dyn Oracle,
        tokens: &mut dyn TokenTransfer,
        dispute_id: &DisputeId,
        amount: u128,
        now: Timestamp,
    ) -> Result<(), ResolutionError> {
        let dispute = open_dispute(oracle, dispute_id)?;
        let record = self
            .records
            .get_mut(dispute_id)
            .ok_or(ResolutionError::DisputeNotEscalated)?;
        if record.resolved {
            return Err(ResolutionError::AlreadyResolved);
        }
        let params = self.params.get(&dispute.request_id)?;
        if now >= record.start_time.plus(params.voting_window_secs) {
            return Err(ResolutionError::VotingPhaseOver);
        }

        let previous = record.votes.get(voter).copied().unwrap_or(0);
        let voter_total = previous
            .checked_add(amount)
            .ok_or(ResolutionError::Overflow)?;
        let total = record
            .total_votes
            .checked_add(amount)
            .ok_or(ResolutionError::Overflow)?;
        let first_vote = !record.votes.contains_key(voter);

        record.votes.insert(voter.clone(), voter_total);
        record.total_votes = total;
        if first_vote {
            record.voters.push(voter.clone());
        }

        if let Err(e) = tokens.transfer(&params.vote_asset, voter, &self.address, amount) {
            tracing::warn!(
                %voter,
                dispute = %dispute_id,
                amount,
                error = %e,
                "vote transfer failed, rolling back"
            );
            record.total_votes -= amount;
            if first_vote {
                record.votes.remove(voter);
                record.voters.pop();
            } else {
                record.votes.insert(voter.clone(), previous);
            }
            return Err(e.into());
        }

        tracing::debug!(%voter, dispute = %dispute_id, amount, total, "vote cast");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn voting_record(&self, dispute_id: &DisputeId) -> Option<&VoteRecord> {
        self.records.get(dispute_id)
    }

    pub fn get_voters(&self, dispute_id: &DisputeId) -> &[AccountId] {
        self.records
            .get(dispute_id)
            .map_or(&[], |r| r.voters.as_slice())
    }

    pub fn votes_of(&self, dispute_id: &DisputeId, voter: &AccountId) -> u128 {
        self.records
            .get(dispute_id)
            .and_then(|r| r.votes.get(voter).copied())
            .unwrap_or(0)
    }

    pub fn total_votes(&self, dispute_id: &DisputeId) -> u128 {
        self.records.get(dispute_id).map_or(0, |r| r.total_votes)
    }
}

impl ResolutionModule for OpenVoteEngine {
    fn name(&self) -> &'static str {
        "open-vote"
    }

    fn start_resolution(
        &mut self,
        caller: &AccountId,
        oracle: &dyn Oracle,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<(), ResolutionError> {
        only_oracle(&self.oracle, caller)?;
        let dispute = open_dispute(oracle, dispute_id)?;
        self.params.get(&dispute.request_id)?;
        if self.records.contains_key(dispute_id) {
            return Err(ResolutionError::AlreadyStarted);
        }
        self.records.insert(
            *dispute_id,
            VoteRecord {
                start_time: now,
                ..VoteRecord::default()
            },
        );
        tracing::info!(dispute = %dispute_id, start = %now, "open vote started");
        Ok(())
    }

    fn resolve_dispute(
        &mut self,
        caller: &AccountId,
        oracle: &mut dyn Oracle,
        tokens: &mut dyn TokenTransfer,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<DisputeStatus, ResolutionError> {
        only_oracle(&self.oracle, caller)?;
        let dispute = open_dispute(&*oracle, dispute_id)?;
        let record = self
            .records
            .get_mut(dispute_id)
            .ok_or(ResolutionError::DisputeNotEscalated)?;
        if record.resolved {
            return Err(ResolutionError::AlreadyResolved);
        }
        let params = self.params.get(&dispute.request_id)?;
        if now < record.start_time.plus(params.voting_window_secs) {
            return Err(ResolutionError::OnGoingVotingPhase);
        }

        ensure_custody(&*tokens, &self.address, &params.vote_asset, record.total_votes)?;
        let status = verdict(record.total_votes, params.min_votes_for_quorum);
        let refunds: Vec<(AccountId, u128)> = record
            .voters
            .iter()
            .map(|v| (v.clone(), record.votes.get(v).copied().unwrap_or(0)))
            .collect();

        refund_voters(tokens, &self.address, &params.vote_asset, &refunds)?;
        if let Err(e) = oracle.update_dispute_status(&self.address, dispute_id, status) {
            tracing::warn!(dispute = %dispute_id, error = %e, "verdict rejected, reclaiming refunds");
            reclaim_refunds(tokens, &self.address, &params.vote_asset, &refunds);
            return Err(e.into());
        }
        record.resolved = true;

        tracing::info!(
            dispute = %dispute_id,
            %status,
            total_votes = record.total_votes,
            quorum = params.min_votes_for_quorum,
            voters = refunds.len(),
            "open vote resolved"
        );
        Ok(status)
    }
}
