//! The interface shared by resolution modules, and the helpers they share.

use crate::error::ResolutionError;
use bond_types::{
    AccountId, AssetId, Dispute, DisputeId, DisputeStatus, Oracle, Timestamp, TokenTransfer,
};

/// A module the coordinator can hand an escalated dispute to.
pub trait ResolutionModule {
    fn name(&self) -> &'static str;

    /// Open the vote on `dispute_id` at `now`. Coordinator only.
    fn start_resolution(
        &mut self,
        caller: &AccountId,
        oracle: &dyn Oracle,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<(), ResolutionError>;

    /// Close the vote, report the verdict to the coordinator and refund
    /// every voter. Coordinator only.
    fn resolve_dispute(
        &mut self,
        caller: &AccountId,
        oracle: &mut dyn Oracle,
        tokens: &mut dyn TokenTransfer,
        dispute_id: &DisputeId,
        now: Timestamp,
    ) -> Result<DisputeStatus, ResolutionError>;
}

pub(crate) fn only_oracle(oracle: &AccountId, caller: &AccountId) -> Result<(), ResolutionError> {
    if caller != oracle {
        return Err(ResolutionError::Unauthorized {
            caller: caller.to_string(),
        });
    }
    Ok(())
}

/// Fetch a dispute, failing if the coordinator does not know it or has
/// already decided it.
pub(crate) fn open_dispute(
    oracle: &dyn Oracle,
    dispute_id: &DisputeId,
) -> Result<Dispute, ResolutionError> {
    let dispute = oracle.get_dispute(dispute_id);
    if !dispute.exists() {
        return Err(ResolutionError::NonExistentDispute);
    }
    if dispute.status.is_resolved() {
        return Err(ResolutionError::AlreadyResolved);
    }
    Ok(dispute)
}

/// Quorum reached means the disputer wins.
pub(crate) fn verdict(total_votes: u128, quorum: u128) -> DisputeStatus {
    if total_votes >= quorum {
        DisputeStatus::Won
    } else {
        DisputeStatus::Lost
    }
}

/// Make sure custody can cover every refund before anything is reported.
pub(crate) fn ensure_custody(
    tokens: &dyn TokenTransfer,
    custody: &AccountId,
    asset: &AssetId,
    needed: u128,
) -> Result<(), ResolutionError> {
    let available = tokens.balance_of(custody, asset);
    if available < needed {
        return Err(ResolutionError::CustodyShortfall { needed, available });
    }
    Ok(())
}

/// Return each voter's stake from custody, in the order given.
///
/// Either every voter is refunded or none is: when a transfer fails, the
/// stakes already returned are pulled back into custody before the error
/// is reported.
pub(crate) fn refund_voters(
    tokens: &mut dyn TokenTransfer,
    custody: &AccountId,
    asset: &AssetId,
    refunds: &[(AccountId, u128)],
) -> Result<(), ResolutionError> {
    for (i, (voter, amount)) in refunds.iter().enumerate() {
        if *amount == 0 {
            continue;
        }
        if let Err(e) = tokens.transfer(asset, custody, voter, *amount) {
            tracing::warn!(
                %voter,
                %asset,
                amount,
                error = %e,
                "refund failed, reclaiming earlier refunds"
            );
            reclaim_refunds(tokens, custody, asset, &refunds[..i]);
            return Err(e.into());
        }
        tracing::debug!(%voter, %asset, amount, "vote stake refunded");
    }
    Ok(())
}

/// Move refunded stakes back into custody, newest first.
pub(crate) fn reclaim_refunds(
    tokens: &mut dyn TokenTransfer,
    custody: &AccountId,
    asset: &AssetId,
    refunded: &[(AccountId, u128)],
) {
    for (voter, amount) in refunded.iter().rev() {
        if *amount == 0 {
            continue;
        }
        if let Err(e) = tokens.transfer(asset, voter, custody, *amount) {
            tracing::error!(%voter, %asset, amount, error = %e, "could not reclaim refund");
        }
    }
}
