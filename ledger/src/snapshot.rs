//! Ledger snapshots: capture every balance, bond and pledge pool.
//!
//! Entries are sorted before hashing so two ledgers with the same contents
//! always produce the same snapshot hash, whatever their map iteration order.
//! Zero bonds, empty entries and drained pools are left out.

use crate::error::LedgerError;
use crate::ledger::{Ledger, LedgerEntry};
use bond_types::{AccountId, AssetId, DisputeId, RequestId};
use serde::{Deserialize, Serialize};

const SNAPSHOT_VERSION: u32 = 1;

/// A point-in-time copy of the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Blake2b-256 over the version, custody account and records.
    pub hash: [u8; 32],
    pub version: u32,
    pub custody: AccountId,
    pub balances: Vec<BalanceRecord>,
    pub pledges: Vec<PledgeRecord>,
}

/// One (account, asset) entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub account: AccountId,
    pub asset: AssetId,
    pub available: u128,
    pub bonds: Vec<(RequestId, u128)>,
}

/// One pledge pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PledgeRecord {
    pub dispute_id: DisputeId,
    pub asset: AssetId,
    pub amount: u128,
}

impl LedgerSnapshot {
    fn compute_hash(&self) -> Result<[u8; 32], LedgerError> {
        let body = bincode::serialize(&(
            self.version,
            &self.custody,
            &self.balances,
            &self.pledges,
        ))
        .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(bond_crypto::blake2b_256(&body))
    }

    /// Verify the snapshot hash matches its records.
    pub fn verify(&self) -> bool {
        self.compute_hash().is_ok_and(|h| h == self.hash)
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, LedgerError> {
        bincode::serialize(self).map_err(|e| LedgerError::Serialization(e.to_string()))
    }

    /// Deserialize a snapshot from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LedgerError> {
        bincode::deserialize(bytes).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

impl Ledger {
    /// Capture the current state.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let mut balances: Vec<BalanceRecord> = self
            .entries
            .iter()
            .filter_map(|((account, asset), entry)| {
                let mut bonds: Vec<(RequestId, u128)> = entry
                    .bonded
                    .iter()
                    .filter(|(_, v)| **v > 0)
                    .map(|(r, v)| (*r, *v))
                    .collect();
                if entry.available == 0 && bonds.is_empty() {
                    return None;
                }
                bonds.sort();
                Some(BalanceRecord {
                    account: account.clone(),
                    asset: asset.clone(),
                    available: entry.available,
                    bonds,
                })
            })
            .collect();
        balances.sort_by(|a, b| (&a.account, &a.asset).cmp(&(&b.account, &b.asset)));

        let mut pledges: Vec<PledgeRecord> = self
            .pledge_pools
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|((dispute_id, asset), amount)| PledgeRecord {
                dispute_id: *dispute_id,
                asset: asset.clone(),
                amount: *amount,
            })
            .collect();
        pledges.sort_by(|a, b| (&a.dispute_id, &a.asset).cmp(&(&b.dispute_id, &b.asset)));

        let mut snap = LedgerSnapshot {
            hash: [0u8; 32],
            version: SNAPSHOT_VERSION,
            custody: self.custody().clone(),
            balances,
            pledges,
        };
        snap.hash = snap.compute_hash()?;
        Ok(snap)
    }

    /// Rebuild a ledger from a snapshot, rejecting tampered ones.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        if !snapshot.verify() {
            return Err(LedgerError::SnapshotMismatch);
        }
        let mut ledger = Ledger::new(snapshot.custody);
        for record in snapshot.balances {
            ledger.entries.insert(
                (record.account, record.asset),
                LedgerEntry {
                    available: record.available,
                    bonded: record.bonds.into_iter().collect(),
                },
            );
        }
        for record in snapshot.pledges {
            ledger
                .pledge_pools
                .insert((record.dispute_id, record.asset), record.amount);
        }
        Ok(ledger)
    }
}
