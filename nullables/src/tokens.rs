//! Nullable token layer: in-memory balances.

use bond_types::{AccountId, AssetId, TokenTransfer, TransferError};
use std::collections::{HashMap, HashSet};

/// In-memory token balances implementing [`TokenTransfer`].
#[derive(Default)]
pub struct NullTokens {
    balances: HashMap<(AccountId, AssetId), u128>,
    /// Accounts whose transfers are refused, to exercise failure paths.
    frozen: HashSet<AccountId>,
}

impl NullTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create tokens out of thin air.
    pub fn mint(&mut self, account: &AccountId, asset: &AssetId, amount: u128) {
        *self
            .balances
            .entry((account.clone(), asset.clone()))
            .or_default() += amount;
    }

    /// Refuse every transfer from or to `account`.
    pub fn freeze(&mut self, account: &AccountId) {
        self.frozen.insert(account.clone());
    }

    pub fn unfreeze(&mut self, account: &AccountId) {
        self.frozen.remove(account);
    }

    /// Sum of all balances in `asset`.
    pub fn supply(&self, asset: &AssetId) -> u128 {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, v)| *v)
            .sum()
    }
}

impl TokenTransfer for NullTokens {
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        if self.frozen.contains(from) || self.frozen.contains(to) {
            return Err(TransferError::Rejected(format!("{from} -> {to} is frozen")));
        }
        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances
            .insert((from.clone(), asset.clone()), available - amount);
        *self
            .balances
            .entry((to.clone(), asset.clone()))
            .or_default() += amount;
        Ok(())
    }

    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> u128 {
        self.balances
            .get(&(account.clone(), asset.clone()))
            .copied()
            .unwrap_or(0)
    }
}
