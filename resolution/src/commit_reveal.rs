//! Commit-reveal vote.
//!
//! Voters first commit to `blake2b(voter, dispute, amount, salt)` during
//! `[start, start + commit_window)`, then reveal `(amount, salt)` during
//! `[start + commit_window, start + commit_window + reveal_window)`. Only the
//! reveal moves tokens into custody, so an unrevealed commitment costs and
//! counts nothing.

use crate::error::ResolutionError;
use crate::module::{
    ensure_custody, only_oracle, open_dispute, reclaim_refunds, refund_voters, verdict,
    ResolutionModule,
};
use bond_types::{
    AccountId, CommitRevealParams, DisputeId, DisputeStatus, Hash, Oracle, ParamRegistry,
    RequestId, Timestamp, TokenTransfer,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One voter's standing in a commit-reveal vote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCommitment {
    /// Pending commitment; [`Hash::ZERO`] once revealed.
    pub commitment: Hash,
    pub revealed_votes: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRevealRecord {
    pub start_time: Timestamp,
    pub total_votes: u128,
    pub voters: HashMap<AccountId, VoterCommitment>,
    /// Voters in order of their first commitment.
    pub order: Vec<AccountId>,
    /// Every commitment that has been revealed. Never accepted again.
    pub revealed: HashSet<Hash>,
    pub resolved: bool,
}

/// Phase boundaries of one vote.
struct Phases {
    commit_end: Timestamp,
    reveal_end: Timestamp,
}

impl Phases {
    fn of(start: Timestamp, params: &CommitRevealParams) -> Self {
        let commit_end = start.plus(params.commit_window_secs);
        Self {
            commit_end,
            reveal_end: commit_end.plus(params.reveal_window_secs),
        }
    }
}

pub struct CommitRevealEngine {
    address: AccountId,
    oracle: AccountId,
    params: ParamRegistry<CommitRevealParams>,
    records: HashMap<DisputeId, CommitRevealRecord>,
}

impl CommitRevealEngine {
    pub fn new(address: AccountId, oracle: AccountId) -> Self {
        Self {
            address,
            oracle,
            params: ParamRegistry::new(),
            records: HashMap::new(),
        }
    }

    pub fn address(&self) -> &AccountId {
        &self.address
    }

    pub fn configure_request(
        &mut self,
        caller: &AccountId,
        request_id: RequestId,
        params: CommitRevealParams,
    ) -> Result<(), ResolutionError> {
        only_oracle(&self.oracle, caller)?;
        self.params.configure(request_id, params)?;
        Ok(())
    }

    pub fn decode_request_data(
        &self,
        request_id: &RequestId,
    ) -> Result<&CommitRevealParams, ResolutionError> {
        Ok(self.params.get(request_id)?)
    }

    /// The commitment `voter` must submit to later reveal `amount` with `salt`.
    pub fn compute_commitment(
        &self,
        voter: &AccountId,
        dispute_id: &DisputeId,
        amount: u128,
        salt: &Hash,
    ) -> Hash {
        bond_crypto::compute_commitment(voter, dispute_id, amount, salt)
    }

    /// Store (or replace) `voter`'s commitment.
    pub fn commit_vote(
        &mut self,
        voter: &AccountId,
        oracle: &dyn Oracle,
        dispute_id: &DisputeId,
        commitment: Hash,
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
        if now >= Phases::of(record.start_time, params).commit_end {
            return Err(ResolutionError::CommittingPhaseOver);
        }
        if commitment.is_zero() {
            return Err(ResolutionError::EmptyCommitment);
        }

        if !record.voters.contains_key(voter) {
            record.order.push(voter.clone());
        }
        record.voters.entry(voter.clone()).or_default().commitment = commitment;
        tracing::debug!(%voter, dispute = %dispute_id, "vote committed");
        Ok(())
    }

    /// Reveal a committed vote, locking `amount` in custody.
    #[allow(clippy::too_many_arguments)]
    pub fn reveal_vote(
        &mut self,
        voter: &AccountId,
        oracle: &dyn Oracle,
        tokens: &mut dyn TokenTransfer,
        dispute_id: &DisputeId,
        amount: u128,
        salt: &Hash,
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
        let phases = Phases::of(record.start_time, params);
        if now < phases.commit_end {
            return Err(ResolutionError::OnGoingCommittingPhase);
        }
        if now >= phases.reveal_end {
            return Err(ResolutionError::RevealingPhaseOver);
        }

        let expected = bond_crypto::compute_commitment(voter, dispute_id, amount, salt);
        if record.revealed.contains(&expected) {
            return Err(ResolutionError::CommitmentReused);
        }
        let entry = record
            .voters
            .get_mut(voter)
            .filter(|v| !v.commitment.is_zero() && v.commitment == expected)
            .ok_or(ResolutionError::WrongRevealData)?;
        let revealed_votes = entry
            .revealed_votes
            .checked_add(amount)
            .ok_or(ResolutionError::Overflow)?;
        let total = record
            .total_votes
            .checked_add(amount)
            .ok_or(ResolutionError::Overflow)?;

        entry.commitment = Hash::ZERO;
        entry.revealed_votes = revealed_votes;
        record.total_votes = total;
        record.revealed.insert(expected);

        if let Err(e) = tokens.transfer(&params.vote_asset, voter, &self.address, amount) {
            tracing::warn!(
                %voter,
                dispute = %dispute_id,
                amount,
                error = %e,
                "reveal transfer failed, rolling back"
            );
            record.revealed.remove(&expected);
            record.total_votes -= amount;
            if let Some(entry) = record.voters.get_mut(voter) {
                entry.commitment = expected;
                entry.revealed_votes -= amount;
            }
            return Err(e.into());
        }

        tracing::debug!(%voter, dispute = %dispute_id, amount, total, "vote revealed");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn voting_record(&self, dispute_id: &DisputeId) -> Option<&CommitRevealRecord> {
        self.records.get(dispute_id)
    }

    /// Voters in order of their first commitment, revealed or not.
    pub fn get_voters(&self, dispute_id: &DisputeId) -> &[AccountId] {
        self.records
            .get(dispute_id)
            .map_or(&[], |r| r.order.as_slice())
    }

    /// Revealed votes of `voter`.
    pub fn votes_of(&self, dispute_id: &DisputeId, voter: &AccountId) -> u128 {
        self.records
            .get(dispute_id)
            .and_then(|r| r.voters.get(voter))
            .map_or(0, |v| v.revealed_votes)
    }

    pub fn total_votes(&self, dispute_id: &DisputeId) -> u128 {
        self.records.get(dispute_id).map_or(0, |r| r.total_votes)
    }
}

impl ResolutionModule for CommitRevealEngine {
    fn name(&self) -> &'static str {
        "commit-reveal"
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
            CommitRevealRecord {
                start_time: now,
                ..CommitRevealRecord::default()
            },
        );
        tracing::info!(dispute = %dispute_id, start = %now, "commit-reveal vote started");
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
        let phases = Phases::of(record.start_time, params);
        if now < phases.commit_end {
            return Err(ResolutionError::OnGoingCommittingPhase);
        }
        if now < phases.reveal_end {
            return Err(ResolutionError::OnGoingRevealingPhase);
        }

        ensure_custody(&*tokens, &self.address, &params.vote_asset, record.total_votes)?;
        let status = verdict(record.total_votes, params.min_votes_for_quorum);
        let refunds: Vec<(AccountId, u128)> = record
            .order
            .iter()
            .map(|v| {
                let amount = record.voters.get(v).map_or(0, |c| c.revealed_votes);
                (v.clone(), amount)
            })
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
            "commit-reveal vote resolved"
        );
        Ok(status)
    }
}
