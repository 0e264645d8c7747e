//! Available/bonded bookkeeping shared by every module.
//!
//! Value only enters through [`Ledger::deposit`] and only leaves through
//! [`Ledger::withdraw`]. Everything in between (bond, pay, release, pledge,
//! pledge payouts) moves value between buckets, so per asset
//! `total_available + total_bonded + total_pledged` always equals deposits
//! minus withdrawals.

use crate::error::LedgerError;
use bond_types::{
    AccountId, AssetId, DisputeId, ModulePolicy, RequestId, TokenTransfer,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balances of one account in one asset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Freely withdrawable or bondable value.
    pub available: u128,
    /// Value locked against a specific request.
    pub bonded: HashMap<RequestId, u128>,
}

impl LedgerEntry {
    pub fn bonded_for(&self, request_id: &RequestId) -> u128 {
        self.bonded.get(request_id).copied().unwrap_or(0)
    }

    pub fn total_bonded(&self) -> u128 {
        self.bonded.values().sum()
    }
}

/// The accounting ledger.
///
/// Deposited tokens are held under `custody` on the token layer; the ledger
/// tracks who they belong to and what they are locked against.
#[derive(Clone, Debug)]
pub struct Ledger {
    custody: AccountId,
    pub(crate) entries: HashMap<(AccountId, AssetId), LedgerEntry>,
    /// Escalation pledges: (dispute, asset) → pooled amount.
    pub(crate) pledge_pools: HashMap<(DisputeId, AssetId), u128>,
}

fn authorize<P: ModulePolicy + ?Sized>(
    policy: &P,
    caller: &AccountId,
    request_id: &RequestId,
) -> Result<(), LedgerError> {
    if !policy.is_allowed_module(request_id, caller) {
        return Err(LedgerError::Unauthorized {
            caller: caller.to_string(),
            request_id: *request_id,
        });
    }
    Ok(())
}

impl Ledger {
    pub fn new(custody: AccountId) -> Self {
        Self {
            custody,
            entries: HashMap::new(),
            pledge_pools: HashMap::new(),
        }
    }

    /// The token-layer account holding all deposited value.
    pub fn custody(&self) -> &AccountId {
        &self.custody
    }

    fn entry_mut(&mut self, account: &AccountId, asset: &AssetId) -> &mut LedgerEntry {
        self.entries
            .entry((account.clone(), asset.clone()))
            .or_default()
    }

    // ── User-initiated ────────────────────────────────────────────────

    /// Move `amount` of external tokens from `account` into its available balance.
    pub fn deposit<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let entry = self.entry_mut(account, asset);
        entry.available = entry
            .available
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        let custody = self.custody.clone();
        if let Err(e) = tokens.transfer(asset, account, &custody, amount) {
            tracing::warn!(%account, %asset, amount, error = %e, "deposit transfer failed, rolling back");
            let entry = self.entry_mut(account, asset);
            entry.available -= amount;
            return Err(e.into());
        }

        tracing::debug!(%account, %asset, amount, "deposit");
        Ok(())
    }

    /// Move `amount` out of `account`'s available balance back to the token layer.
    pub fn withdraw<T: TokenTransfer + ?Sized>(
        &mut self,
        tokens: &mut T,
        account: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(account, asset);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        self.entry_mut(account, asset).available -= amount;

        let custody = self.custody.clone();
        if let Err(e) = tokens.transfer(asset, &custody, account, amount) {
            tracing::warn!(%account, %asset, amount, error = %e, "withdraw transfer failed, rolling back");
            self.entry_mut(account, asset).available += amount;
            return Err(e.into());
        }

        tracing::debug!(%account, %asset, amount, "withdraw");
        Ok(())
    }

    // ── Module-initiated ──────────────────────────────────────────────

    /// Lock `amount` of `account`'s available balance against `request_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn bond<P: ModulePolicy + ?Sized>(
        &mut self,
        policy: &P,
        caller: &AccountId,
        account: &AccountId,
        request_id: &RequestId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        authorize(policy, caller, request_id)?;
        let entry = self.entry_mut(account, asset);
        if entry.available < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: entry.available,
            });
        }
        let bonded = entry
            .bonded_for(request_id)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        entry.available -= amount;
        entry.bonded.insert(*request_id, bonded);

        tracing::debug!(%account, %asset, request = %request_id, amount, "bond");
        Ok(())
    }

    /// Move `amount` from `payer`'s bond on `request_id` to `receiver`'s available balance.
    #[allow(clippy::too_many_arguments)]
    pub fn pay<P: ModulePolicy + ?Sized>(
        &mut self,
        policy: &P,
        caller: &AccountId,
        request_id: &RequestId,
        payer: &AccountId,
        receiver: &AccountId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        authorize(policy, caller, request_id)?;
        let bonded = self.bonded_of(payer, request_id, asset);
        if bonded < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: bonded,
            });
        }
        let credited = self
            .balance_of(receiver, asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.entry_mut(payer, asset)
            .bonded
            .insert(*request_id, bonded - amount);
        self.entry_mut(receiver, asset).available = credited;

        tracing::debug!(%payer, %receiver, %asset, request = %request_id, amount, "pay");
        Ok(())
    }

    /// Unlock `amount` of `account`'s bond on `request_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn release<P: ModulePolicy + ?Sized>(
        &mut self,
        policy: &P,
        caller: &AccountId,
        account: &AccountId,
        request_id: &RequestId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        authorize(policy, caller, request_id)?;
        let entry = self.entry_mut(account, asset);
        let bonded = entry.bonded_for(request_id);
        if bonded < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: bonded,
            });
        }
        let available = entry
            .available
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        entry.bonded.insert(*request_id, bonded - amount);
        entry.available = available;

        tracing::debug!(%account, %asset, request = %request_id, amount, "release");
        Ok(())
    }

    /// Lock `amount` of `pledger`'s available balance in the pledge pool of `dispute_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn pledge<P: ModulePolicy + ?Sized>(
        &mut self,
        policy: &P,
        caller: &AccountId,
        pledger: &AccountId,
        request_id: &RequestId,
        dispute_id: &DisputeId,
        asset: &AssetId,
        amount: u128,
    ) -> Result<(), LedgerError> {
        authorize(policy, caller, request_id)?;
        let available = self.balance_of(pledger, asset);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let pooled = self
            .pledged(dispute_id, asset)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.entry_mut(pledger, asset).available -= amount;
        self.pledge_pools
            .insert((*dispute_id, asset.clone()), pooled);

        tracing::debug!(%pledger, %asset, dispute = %dispute_id, amount, "pledge");
        Ok(())
    }

    /// Credit every entry of `winners` with `amount_per_pledger` from the pledge pool.
    ///
    /// An account listed twice is credited twice. Whatever the pool holds
    /// beyond `amount_per_pledger × winners.len()` stays in the pool.
    #[allow(clippy::too_many_arguments)]
    pub fn pay_winning_pledgers<P: ModulePolicy + ?Sized>(
        &mut self,
        policy: &P,
        caller: &AccountId,
        request_id: &RequestId,
        dispute_id: &DisputeId,
        winners: &[AccountId],
        asset: &AssetId,
        amount_per_pledger: u128,
    ) -> Result<(), LedgerError> {
        authorize(policy, caller, request_id)?;
        let total = amount_per_pledger
            .checked_mul(winners.len() as u128)
            .ok_or(LedgerError::Overflow)?;
        let pooled = self.pledged(dispute_id, asset);
        if pooled < total {
            return Err(LedgerError::InsufficientFunds {
                needed: total,
                available: pooled,
            });
        }
        let mut credited: HashMap<&AccountId, u128> = HashMap::new();
        for winner in winners {
            let current = match credited.get(winner) {
                Some(balance) => *balance,
                None => self.balance_of(winner, asset),
            };
            let next = current
                .checked_add(amount_per_pledger)
                .ok_or(LedgerError::Overflow)?;
            credited.insert(winner, next);
        }

        self.pledge_pools
            .insert((*dispute_id, asset.clone()), pooled - total);
        for (winner, available) in credited {
            self.entry_mut(winner, asset).available = available;
        }

        tracing::debug!(
            dispute = %dispute_id,
            %asset,
            winners = winners.len(),
            amount_per_pledger,
            remaining = pooled - total,
            "paid winning pledgers"
        );
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn balance_of(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.entries
            .get(&(account.clone(), asset.clone()))
            .map_or(0, |e| e.available)
    }

    pub fn bonded_of(&self, account: &AccountId, request_id: &RequestId, asset: &AssetId) -> u128 {
        self.entries
            .get(&(account.clone(), asset.clone()))
            .map_or(0, |e| e.bonded_for(request_id))
    }

    pub fn pledged(&self, dispute_id: &DisputeId, asset: &AssetId) -> u128 {
        self.pledge_pools
            .get(&(*dispute_id, asset.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn entry(&self, account: &AccountId, asset: &AssetId) -> Option<&LedgerEntry> {
        self.entries.get(&(account.clone(), asset.clone()))
    }

    pub fn total_available(&self, asset: &AssetId) -> u128 {
        self.entries
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, e)| e.available)
            .sum()
    }

    pub fn total_bonded(&self, asset: &AssetId) -> u128 {
        self.entries
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, e)| e.total_bonded())
            .sum()
    }

    pub fn total_pledged(&self, asset: &AssetId) -> u128 {
        self.pledge_pools
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, v)| *v)
            .sum()
    }

    /// Everything the ledger holds in `asset`, in any bucket.
    pub fn total_held(&self, asset: &AssetId) -> u128 {
        self.total_available(asset) + self.total_bonded(asset) + self.total_pledged(asset)
    }
}
