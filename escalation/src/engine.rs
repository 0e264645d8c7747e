//! The bond escalation engine.
//!
//! One [`EscalationRecord`] per request. Hooks (`configure_request`,
//! `dispute_response`, `dispute_escalated`, `on_dispute_status_change`) are
//! callable by the coordinator only; pledging and settlement are open to
//! anyone. Every operation checks all of its preconditions before it moves
//! funds or touches a record.

use crate::error::EscalationError;
use crate::record::{winner_payout, EscalationRecord, EscalationStatus};
use bond_ledger::{Ledger, LedgerError};
use bond_types::{
    AccountId, AssetId, BondEscalationParams, Dispute, DisputeId, DisputeStatus, Oracle,
    ParamRegistry, RequestId, ResponseId, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which side of a dispute a pledge backs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    For,
    Against,
}

#[derive(Serialize, Deserialize)]
struct EngineState {
    params: ParamRegistry<BondEscalationParams>,
    records: Vec<(RequestId, EscalationRecord)>,
}

pub struct BondEscalationEngine {
    /// The module's own account, as registered with the coordinator.
    address: AccountId,
    /// The coordinator's account.
    oracle: AccountId,
    params: ParamRegistry<BondEscalationParams>,
    escalations: HashMap<RequestId, EscalationRecord>,
}

impl BondEscalationEngine {
    pub fn new(address: AccountId, oracle: AccountId) -> Self {
        Self {
            address,
            oracle,
            params: ParamRegistry::new(),
            escalations: HashMap::new(),
        }
    }

    pub fn address(&self) -> &AccountId {
        &self.address
    }

    fn only_oracle(&self, caller: &AccountId) -> Result<(), EscalationError> {
        if caller != &self.oracle {
            return Err(EscalationError::Unauthorized {
                caller: caller.to_string(),
            });
        }
        Ok(())
    }

    // ── Configuration ─────────────────────────────────────────────────

    pub fn configure_request(
        &mut self,
        caller: &AccountId,
        request_id: RequestId,
        params: BondEscalationParams,
    ) -> Result<(), EscalationError> {
        self.only_oracle(caller)?;
        self.params.configure(request_id, params)?;
        tracing::debug!(request = %request_id, "escalation parameters configured");
        Ok(())
    }

    pub fn decode_request_data(
        &self,
        request_id: &RequestId,
    ) -> Result<&BondEscalationParams, EscalationError> {
        Ok(self.params.get(request_id)?)
    }

    // ── Coordinator hooks ─────────────────────────────────────────────

    /// A response to `request_id` is being disputed.
    ///
    /// Bonds the disputer and returns the dispute record for the coordinator
    /// to store. The first dispute raised before the escalation deadline
    /// opens the escalation; later ones only carry the disputer's bond.
    #[allow(clippy::too_many_arguments)]
    pub fn dispute_response<O: Oracle + ?Sized>(
        &mut self,
        caller: &AccountId,
        oracle: &O,
        ledger: &mut Ledger,
        request_id: &RequestId,
        response_id: &ResponseId,
        disputer: &AccountId,
        proposer: &AccountId,
        now: Timestamp,
    ) -> Result<Dispute, EscalationError> {
        self.only_oracle(caller)?;
        let params = self.params.get(request_id)?;

        let response = oracle.get_response(response_id);
        if now > response.created_at.plus(params.dispute_window_secs) {
            return Err(EscalationError::DisputeWindowOver);
        }

        ledger.bond(
            oracle,
            &self.address,
            disputer,
            request_id,
            &params.bond_asset,
            params.bond_size,
        )?;

        let opens_escalation = now <= params.escalation_deadline
            && self
                .escalations
                .get(request_id)
                .map_or(true, |r| r.status == EscalationStatus::None);
        if opens_escalation {
            let dispute_id = bond_crypto::derive_dispute_id(disputer, request_id, response_id);
            let record = self.escalations.entry(*request_id).or_default();
            record.status = EscalationStatus::Active;
            record.dispute_id = dispute_id;
            tracing::info!(request = %request_id, dispute = %dispute_id, %disputer, "bond escalation opened");
        }

        Ok(Dispute {
            disputer: disputer.clone(),
            proposer: proposer.clone(),
            response_id: *response_id,
            request_id: *request_id,
            status: DisputeStatus::Active,
            created_at: now,
        })
    }

    /// The coordinator wants to hand the dispute to a resolution module.
    ///
    /// For the tracked dispute this is only allowed after the deadline and
    /// with tied pledges. Any other dispute of the request passes through.
    pub fn dispute_escalated<O: Oracle + ?Sized>(
        &mut self,
        caller: &AccountId,
        oracle: &O,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<(), EscalationError> {
        self.only_oracle(caller)?;
        let dispute = oracle.get_dispute(dispute_id);
        if !dispute.exists() {
            return Err(EscalationError::DisputeDoesNotExist);
        }
        let request_id = dispute.request_id;

        let Some(record) = self
            .escalations
            .get_mut(&request_id)
            .filter(|r| r.tracks(dispute_id))
        else {
            return Ok(());
        };

        let params = self.params.get(&request_id)?;
        if now <= params.escalation_deadline {
            return Err(EscalationError::BondEscalationNotOver);
        }
        if record.status != EscalationStatus::Active || !record.is_tied() {
            return Err(EscalationError::NotEscalatable);
        }

        record.status = EscalationStatus::Escalated;
        tracing::info!(
            request = %request_id,
            dispute = %dispute_id,
            pledges = record.pledges_for(),
            "bond escalation escalated"
        );
        Ok(())
    }

    /// The coordinator recorded a verdict for `dispute_id`.
    ///
    /// Settles the disputer and proposer bonds: the loser's bond is paid to
    /// the winner and the winner's own bond is released. If the dispute is
    /// the tracked one and was escalated, each winning pledger also receives
    /// twice the bond size from the pledge pool.
    pub fn on_dispute_status_change<O: Oracle + ?Sized>(
        &mut self,
        caller: &AccountId,
        oracle: &O,
        ledger: &mut Ledger,
        dispute_id: &DisputeId,
    ) -> Result<(), EscalationError> {
        self.only_oracle(caller)?;
        let dispute = oracle.get_dispute(dispute_id);
        if !dispute.exists() {
            return Err(EscalationError::DisputeDoesNotExist);
        }
        let won = match dispute.status {
            DisputeStatus::Won => true,
            DisputeStatus::Lost => false,
            other => return Err(EscalationError::InvalidDisputeStatus(other)),
        };
        let request_id = dispute.request_id;
        let params = self.params.get(&request_id)?;
        let asset = &params.bond_asset;
        let bond = params.bond_size;

        let (payer, receiver) = if won {
            (&dispute.proposer, &dispute.disputer)
        } else {
            (&dispute.disputer, &dispute.proposer)
        };

        // Pledge payout for an escalated contest, decided before any funds move.
        let payout = match self.escalations.get(&request_id) {
            Some(record)
                if record.tracks(dispute_id) && record.status == EscalationStatus::Escalated =>
            {
                let (winners, losers) = if won {
                    (&record.pledgers_for, &record.pledgers_against)
                } else {
                    (&record.pledgers_against, &record.pledgers_for)
                };
                let per_pledger = bond.checked_mul(2).ok_or(LedgerError::Overflow)?;
                Some((winners.clone(), per_pledger, !losers.is_empty()))
            }
            _ => None,
        };

        let payer_needs = if payer == receiver {
            bond.checked_mul(2).ok_or(LedgerError::Overflow)?
        } else {
            bond
        };
        ensure_bonded(ledger, payer, &request_id, asset, payer_needs)?;
        ensure_bonded(ledger, receiver, &request_id, asset, bond)?;
        if let Some((winners, per_pledger, true)) = &payout {
            ensure_pool(ledger, dispute_id, asset, winners.len(), *per_pledger)?;
        }

        ledger.pay(oracle, &self.address, &request_id, payer, receiver, asset, bond)?;
        ledger.release(oracle, &self.address, receiver, &request_id, asset, bond)?;
        tracing::debug!(dispute = %dispute_id, %payer, %receiver, bond, "dispute bonds settled");

        let Some((winners, per_pledger, has_losers)) = payout else {
            return Ok(());
        };
        let status = if won {
            EscalationStatus::DisputerWon
        } else {
            EscalationStatus::DisputerLost
        };
        if let Some(record) = self.escalations.get_mut(&request_id) {
            record.status = status;
        }
        if has_losers {
            ledger.pay_winning_pledgers(
                oracle,
                &self.address,
                &request_id,
                dispute_id,
                &winners,
                asset,
                per_pledger,
            )?;
        }
        tracing::info!(
            request = %request_id,
            dispute = %dispute_id,
            %status,
            winners = winners.len(),
            per_pledger,
            "escalated dispute resolved"
        );
        Ok(())
    }

    // ── User operations ───────────────────────────────────────────────

    /// Pledge one bond in favour of the dispute.
    pub fn pledge_for_dispute<O: Oracle + ?Sized>(
        &mut self,
        pledger: &AccountId,
        oracle: &O,
        ledger: &mut Ledger,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<(), EscalationError> {
        self.pledge(pledger, oracle, ledger, dispute_id, Side::For, now)
    }

    /// Pledge one bond against the dispute.
    pub fn pledge_against_dispute<O: Oracle + ?Sized>(
        &mut self,
        pledger: &AccountId,
        oracle: &O,
        ledger: &mut Ledger,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<(), EscalationError> {
        self.pledge(pledger, oracle, ledger, dispute_id, Side::Against, now)
    }

    fn pledge<O: Oracle + ?Sized>(
        &mut self,
        pledger: &AccountId,
        oracle: &O,
        ledger: &mut Ledger,
        dispute_id: &DisputeId,
        side: Side,
        now: Timestamp,
    ) -> Result<(), EscalationError> {
        let dispute = oracle.get_dispute(dispute_id);
        if !dispute.exists() {
            return Err(EscalationError::DisputeDoesNotExist);
        }
        let request_id = dispute.request_id;

        let record = self
            .escalations
            .get(&request_id)
            .filter(|r| r.tracks(dispute_id))
            .ok_or(EscalationError::DisputeNotEscalated)?;
        if record.status != EscalationStatus::Active {
            return Err(EscalationError::EscalationNotActive);
        }

        let params = self.params.get(&request_id)?;
        if now > params.tying_buffer_end() {
            return Err(EscalationError::BondEscalationOver);
        }

        let (own, other) = match side {
            Side::For => (record.pledges_for(), record.pledges_against()),
            Side::Against => (record.pledges_against(), record.pledges_for()),
        };
        if own as u64 >= u64::from(params.max_pledges_per_side) {
            return Err(EscalationError::MaxNumberOfEscalationsReached);
        }
        if own > other {
            return Err(EscalationError::CanOnlySurpassByOnePledge);
        }
        if now > params.escalation_deadline && own == other {
            return Err(EscalationError::CanOnlyTieDuringTyingBuffer);
        }

        ledger.pledge(
            oracle,
            &self.address,
            pledger,
            &request_id,
            dispute_id,
            &params.bond_asset,
            params.bond_size,
        )?;

        if let Some(record) = self.escalations.get_mut(&request_id) {
            match side {
                Side::For => record.pledgers_for.push(pledger.clone()),
                Side::Against => record.pledgers_against.push(pledger.clone()),
            }
            tracing::debug!(
                request = %request_id,
                dispute = %dispute_id,
                %pledger,
                side = ?side,
                pledges_for = record.pledges_for(),
                pledges_against = record.pledges_against(),
                "pledge"
            );
        }
        Ok(())
    }

    /// Close an untied escalation once the tying buffer has elapsed.
    ///
    /// The larger side wins. Each winning pledger receives their bond back
    /// plus `floor(losing × bond / winning)`; the rounding remainder stays in
    /// the pledge pool. The verdict is reported to the coordinator.
    pub fn settle_bond_escalation<O: Oracle + ?Sized>(
        &mut self,
        caller: &AccountId,
        oracle: &mut O,
        ledger: &mut Ledger,
        request_id: &RequestId,
        now: Timestamp,
    ) -> Result<(), EscalationError> {
        let params = self.params.get(request_id)?;
        if now <= params.tying_buffer_end() {
            return Err(EscalationError::BondEscalationNotOver);
        }
        let record = self
            .escalations
            .get(request_id)
            .filter(|r| r.status == EscalationStatus::Active)
            .ok_or(EscalationError::BondEscalationCantBeSettled)?;
        if record.is_tied() {
            return Err(EscalationError::ShouldBeEscalated);
        }

        let disputer_won = record.pledges_for() > record.pledges_against();
        let (winners, losing) = if disputer_won {
            (record.pledgers_for.clone(), record.pledges_against())
        } else {
            (record.pledgers_against.clone(), record.pledges_for())
        };
        let per_pledger = winner_payout(params.bond_size, winners.len() as u128, losing as u128)
            .ok_or(LedgerError::Overflow)?;
        let dispute_id = record.dispute_id;
        let asset = params.bond_asset.clone();

        ensure_pool(ledger, &dispute_id, &asset, winners.len(), per_pledger)?;
        if !oracle.is_allowed_module(request_id, &self.address) {
            return Err(LedgerError::Unauthorized {
                caller: self.address.to_string(),
                request_id: *request_id,
            }
            .into());
        }

        let (status, verdict) = if disputer_won {
            (EscalationStatus::DisputerWon, DisputeStatus::Won)
        } else {
            (EscalationStatus::DisputerLost, DisputeStatus::Lost)
        };
        oracle.update_dispute_status(&self.address, &dispute_id, verdict)?;
        if let Some(record) = self.escalations.get_mut(request_id) {
            record.status = status;
        }
        ledger.pay_winning_pledgers(
            &*oracle,
            &self.address,
            request_id,
            &dispute_id,
            &winners,
            &asset,
            per_pledger,
        )?;

        tracing::info!(
            request = %request_id,
            dispute = %dispute_id,
            %status,
            settled_by = %caller,
            winners = winners.len(),
            losing,
            per_pledger,
            "bond escalation settled"
        );
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    /// The escalation of `request_id`; a zero-valued record if none exists.
    pub fn get_escalation_data(&self, request_id: &RequestId) -> EscalationRecord {
        self.escalations.get(request_id).cloned().unwrap_or_default()
    }

    pub fn fetch_pledgers_for_dispute(&self, request_id: &RequestId) -> &[AccountId] {
        self.escalations
            .get(request_id)
            .map_or(&[], |r| r.pledgers_for.as_slice())
    }

    pub fn fetch_pledgers_against_dispute(&self, request_id: &RequestId) -> &[AccountId] {
        self.escalations
            .get(request_id)
            .map_or(&[], |r| r.pledgers_against.as_slice())
    }

    // ── Persistence ───────────────────────────────────────────────────

    /// Serialize configured parameters and escalation records (bincode).
    pub fn snapshot(&self) -> Result<Vec<u8>, EscalationError> {
        let mut records: Vec<(RequestId, EscalationRecord)> = self
            .escalations
            .iter()
            .map(|(id, r)| (*id, r.clone()))
            .collect();
        records.sort_by_key(|(id, _)| *id);
        let state = EngineState {
            params: self.params.clone(),
            records,
        };
        bincode::serialize(&state).map_err(|e| EscalationError::Serialization(e.to_string()))
    }

    /// Replace parameters and records with the contents of a snapshot.
    pub fn restore_records(&mut self, bytes: &[u8]) -> Result<(), EscalationError> {
        let state: EngineState = bincode::deserialize(bytes)
            .map_err(|e| EscalationError::Serialization(e.to_string()))?;
        self.params = state.params;
        self.escalations = state.records.into_iter().collect();
        tracing::debug!(records = self.escalations.len(), "escalation records restored");
        Ok(())
    }
}

fn ensure_bonded(
    ledger: &Ledger,
    account: &AccountId,
    request_id: &RequestId,
    asset: &AssetId,
    needed: u128,
) -> Result<(), EscalationError> {
    let available = ledger.bonded_of(account, request_id, asset);
    if available < needed {
        return Err(LedgerError::InsufficientFunds { needed, available }.into());
    }
    Ok(())
}

fn ensure_pool(
    ledger: &Ledger,
    dispute_id: &DisputeId,
    asset: &AssetId,
    winners: usize,
    per_pledger: u128,
) -> Result<(), EscalationError> {
    let needed = per_pledger
        .checked_mul(winners as u128)
        .ok_or(LedgerError::Overflow)?;
    let available = ledger.pledged(dispute_id, asset);
    if available < needed {
        return Err(LedgerError::InsufficientFunds { needed, available }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bond_nullables::{NullOracle, NullTokens};
    use bond_types::Hash;

    const BOND: u128 = 100;
    const DEADLINE: u64 = 1_000;
    const BUFFER: u64 = 100;

    struct Fixture {
        engine: BondEscalationEngine,
        oracle: NullOracle,
        ledger: Ledger,
        tokens: NullTokens,
        request: RequestId,
        response: ResponseId,
    }

    fn acct(name: &str) -> AccountId {
        AccountId::from(name)
    }

    fn usdc() -> AssetId {
        AssetId::from("USDC")
    }

    fn params() -> BondEscalationParams {
        BondEscalationParams {
            bond_asset: usdc(),
            bond_size: BOND,
            max_pledges_per_side: 3,
            escalation_deadline: Timestamp::new(DEADLINE),
            tying_buffer_secs: BUFFER,
            dispute_window_secs: 800,
        }
    }

    fn fixture() -> Fixture {
        let module = acct("escalation");
        let mut oracle = NullOracle::new(acct("oracle"));
        let request = Hash::new([7; 32]);
        oracle.allow_module(request, module.clone());
        let response = oracle.insert_response(request, acct("proposer"), Timestamp::new(500));

        let mut engine = BondEscalationEngine::new(module, acct("oracle"));
        engine
            .configure_request(&acct("oracle"), request, params())
            .unwrap();

        Fixture {
            engine,
            oracle,
            ledger: Ledger::new(acct("custody")),
            tokens: NullTokens::new(),
            request,
            response,
        }
    }

    impl Fixture {
        fn fund(&mut self, name: &str, amount: u128) {
            self.tokens.mint(&acct(name), &usdc(), amount);
            self.ledger
                .deposit(&mut self.tokens, &acct(name), &usdc(), amount)
                .unwrap();
        }

        fn dispute(&mut self, disputer: &str, now: u64) -> Result<DisputeId, EscalationError> {
            let dispute = self.engine.dispute_response(
                &acct("oracle"),
                &self.oracle,
                &mut self.ledger,
                &self.request,
                &self.response,
                &acct(disputer),
                &acct("proposer"),
                Timestamp::new(now),
            )?;
            Ok(self.oracle.record_dispute(dispute))
        }
    }

    #[test]
    fn hooks_reject_non_coordinator_callers() {
        let mut f = fixture();
        let err = f
            .engine
            .configure_request(&acct("mallory"), Hash::new([9; 32]), params())
            .unwrap_err();
        assert_eq!(
            err,
            EscalationError::Unauthorized {
                caller: "mallory".into()
            }
        );
    }

    #[test]
    fn request_is_configured_once() {
        let mut f = fixture();
        let err = f
            .engine
            .configure_request(&acct("oracle"), f.request, params())
            .unwrap_err();
        assert!(matches!(err, EscalationError::Params(_)));
        assert!(f.engine.decode_request_data(&Hash::new([9; 32])).is_err());
    }

    #[test]
    fn first_dispute_opens_escalation_and_bonds_disputer() {
        let mut f = fixture();
        f.fund("alice", 500);
        let id = f.dispute("alice", 900).unwrap();

        let data = f.engine.get_escalation_data(&f.request);
        assert_eq!(data.status, EscalationStatus::Active);
        assert_eq!(data.dispute_id, id);
        assert_eq!(f.ledger.bonded_of(&acct("alice"), &f.request, &usdc()), BOND);
    }

    #[test]
    fn later_disputes_only_bond() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("bob", 500);
        let first = f.dispute("alice", 900).unwrap();
        let _second = f.dispute("bob", 950).unwrap();

        assert_eq!(f.engine.get_escalation_data(&f.request).dispute_id, first);
        assert_eq!(f.ledger.bonded_of(&acct("bob"), &f.request, &usdc()), BOND);
    }

    #[test]
    fn dispute_after_deadline_does_not_open_escalation() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.dispute("alice", DEADLINE + 1).unwrap();
        assert_eq!(
            f.engine.get_escalation_data(&f.request).status,
            EscalationStatus::None
        );
    }

    #[test]
    fn dispute_window_is_enforced() {
        let mut f = fixture();
        f.fund("alice", 500);
        // response created at 500, window 800
        assert_eq!(
            f.dispute("alice", 1_301).unwrap_err(),
            EscalationError::DisputeWindowOver
        );
        assert_eq!(f.ledger.bonded_of(&acct("alice"), &f.request, &usdc()), 0);
    }

    #[test]
    fn unfunded_disputer_is_rejected_without_side_effects() {
        let mut f = fixture();
        let err = f.dispute("alice", 900).unwrap_err();
        assert!(matches!(
            err,
            EscalationError::Ledger(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(
            f.engine.get_escalation_data(&f.request).status,
            EscalationStatus::None
        );
    }

    #[test]
    fn pledging_an_unknown_dispute_fails() {
        let mut f = fixture();
        f.fund("carol", 500);
        let err = f
            .engine
            .pledge_for_dispute(
                &acct("carol"),
                &f.oracle,
                &mut f.ledger,
                &Hash::new([3; 32]),
                Timestamp::new(900),
            )
            .unwrap_err();
        assert_eq!(err, EscalationError::DisputeDoesNotExist);
    }

    #[test]
    fn record_without_creation_time_is_unknown() {
        let mut f = fixture();
        let id = f.oracle.record_dispute(Dispute {
            disputer: acct("alice"),
            proposer: acct("proposer"),
            response_id: f.response,
            request_id: f.request,
            status: DisputeStatus::Won,
            created_at: Timestamp::EPOCH,
        });
        let now = Timestamp::new(DEADLINE + 1);
        assert_eq!(
            f.engine.dispute_escalated(&acct("oracle"), &f.oracle, &id, now),
            Err(EscalationError::DisputeDoesNotExist)
        );
        assert_eq!(
            f.engine
                .on_dispute_status_change(&acct("oracle"), &f.oracle, &mut f.ledger, &id),
            Err(EscalationError::DisputeDoesNotExist)
        );
    }

    #[test]
    fn pledging_a_non_tracked_dispute_fails() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("bob", 500);
        f.dispute("alice", 900).unwrap();
        let second = f.dispute("bob", 950).unwrap();
        let err = f
            .engine
            .pledge_against_dispute(&acct("alice"), &f.oracle, &mut f.ledger, &second, Timestamp::new(960))
            .unwrap_err();
        assert_eq!(err, EscalationError::DisputeNotEscalated);
    }

    #[test]
    fn pledge_cap_is_per_side() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("p", 10_000);
        let id = f.dispute("alice", 900).unwrap();
        let now = Timestamp::new(910);
        let p = acct("p");
        for _ in 0..3 {
            f.engine.pledge_for_dispute(&p, &f.oracle, &mut f.ledger, &id, now).unwrap();
            f.engine.pledge_against_dispute(&p, &f.oracle, &mut f.ledger, &id, now).unwrap();
        }
        assert_eq!(
            f.engine
                .pledge_for_dispute(&p, &f.oracle, &mut f.ledger, &id, now)
                .unwrap_err(),
            EscalationError::MaxNumberOfEscalationsReached
        );
        assert_eq!(f.engine.fetch_pledgers_for_dispute(&f.request).len(), 3);
        assert_eq!(f.ledger.pledged(&id, &usdc()), 6 * BOND);
    }

    #[test]
    fn pledges_close_after_tying_buffer() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("p", 500);
        let id = f.dispute("alice", 900).unwrap();
        let err = f
            .engine
            .pledge_for_dispute(
                &acct("p"),
                &f.oracle,
                &mut f.ledger,
                &id,
                Timestamp::new(DEADLINE + BUFFER + 1),
            )
            .unwrap_err();
        assert_eq!(err, EscalationError::BondEscalationOver);
    }

    #[test]
    fn escalation_requires_deadline_and_tie() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("p", 500);
        let id = f.dispute("alice", 900).unwrap();
        let oracle_addr = acct("oracle");

        assert_eq!(
            f.engine
                .dispute_escalated(&oracle_addr, &f.oracle, &id, Timestamp::new(DEADLINE))
                .unwrap_err(),
            EscalationError::BondEscalationNotOver
        );

        f.engine
            .pledge_for_dispute(&acct("p"), &f.oracle, &mut f.ledger, &id, Timestamp::new(950))
            .unwrap();
        assert_eq!(
            f.engine
                .dispute_escalated(&oracle_addr, &f.oracle, &id, Timestamp::new(DEADLINE + 1))
                .unwrap_err(),
            EscalationError::NotEscalatable
        );
    }

    #[test]
    fn escalating_a_non_tracked_dispute_is_a_no_op() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("bob", 500);
        f.dispute("alice", 900).unwrap();
        let second = f.dispute("bob", 950).unwrap();
        f.engine
            .dispute_escalated(&acct("oracle"), &f.oracle, &second, Timestamp::new(960))
            .unwrap();
        assert_eq!(
            f.engine.get_escalation_data(&f.request).status,
            EscalationStatus::Active
        );
    }

    #[test]
    fn settle_rejects_inactive_or_early_calls() {
        let mut f = fixture();
        let anyone = acct("anyone");
        let err = f
            .engine
            .settle_bond_escalation(
                &anyone,
                &mut f.oracle,
                &mut f.ledger,
                &f.request,
                Timestamp::new(DEADLINE + BUFFER + 1),
            )
            .unwrap_err();
        assert_eq!(err, EscalationError::BondEscalationCantBeSettled);

        let err = f
            .engine
            .settle_bond_escalation(
                &anyone,
                &mut f.oracle,
                &mut f.ledger,
                &f.request,
                Timestamp::new(DEADLINE + BUFFER),
            )
            .unwrap_err();
        assert_eq!(err, EscalationError::BondEscalationNotOver);
    }

    #[test]
    fn status_change_requires_a_verdict() {
        let mut f = fixture();
        f.fund("alice", 500);
        let id = f.dispute("alice", 900).unwrap();
        let err = f
            .engine
            .on_dispute_status_change(&acct("oracle"), &f.oracle, &mut f.ledger, &id)
            .unwrap_err();
        assert_eq!(
            err,
            EscalationError::InvalidDisputeStatus(DisputeStatus::Active)
        );
    }

    #[test]
    fn escalated_payout_needs_a_losing_side() {
        let mut f = fixture();
        for name in ["alice", "proposer", "a"] {
            f.fund(name, 500);
        }
        f.ledger
            .bond(&f.oracle, &acct("escalation"), &acct("proposer"), &f.request, &usdc(), BOND)
            .unwrap();
        let id = f.dispute("alice", 900).unwrap();
        f.engine
            .pledge_against_dispute(&acct("a"), &f.oracle, &mut f.ledger, &id, Timestamp::new(950))
            .unwrap();
        // an untied escalated record can only come from restored state
        if let Some(record) = f.engine.escalations.get_mut(&f.request) {
            record.status = EscalationStatus::Escalated;
        }

        f.oracle.set_dispute_status(&id, DisputeStatus::Lost);
        f.engine
            .on_dispute_status_change(&acct("oracle"), &f.oracle, &mut f.ledger, &id)
            .unwrap();
        assert_eq!(
            f.engine.get_escalation_data(&f.request).status,
            EscalationStatus::DisputerLost
        );
        assert_eq!(f.ledger.pledged(&id, &usdc()), BOND);
        assert_eq!(f.ledger.balance_of(&acct("a"), &usdc()), 400);
        assert_eq!(f.ledger.balance_of(&acct("proposer"), &usdc()), 500 + BOND);
    }

    #[test]
    fn snapshot_restores_records() {
        let mut f = fixture();
        f.fund("alice", 500);
        f.fund("p", 500);
        let id = f.dispute("alice", 900).unwrap();
        f.engine
            .pledge_for_dispute(&acct("p"), &f.oracle, &mut f.ledger, &id, Timestamp::new(950))
            .unwrap();

        let bytes = f.engine.snapshot().unwrap();
        let mut restored = BondEscalationEngine::new(acct("escalation"), acct("oracle"));
        restored.restore_records(&bytes).unwrap();

        assert_eq!(
            restored.get_escalation_data(&f.request),
            f.engine.get_escalation_data(&f.request)
        );
        assert_eq!(restored.decode_request_data(&f.request).unwrap(), &params());
        assert!(matches!(
            restored.restore_records(&[1, 2, 3]),
            Err(EscalationError::Serialization(_))
        ));
    }
}
