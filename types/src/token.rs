//! External asset movement.
//!
//! Deposits, withdrawals and vote stakes move real tokens between accounts.
//! The mechanics live outside this workspace; all the protocol relies on is
//! that a transfer either moves exactly `amount` or fails.

use crate::address::{AccountId, AssetId};
use crate::error::TransferError;

pub trait TokenTransfer {
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Spendable token balance of `account`.
    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> u128;
}
