//! Per-request escalation state.

use bond_types::{AccountId, DisputeId, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationStatus {
    /// No dispute has opened an escalation for this request.
    #[default]
    None,
    /// Pledging is open.
    Active,
    /// Pledges tied; waiting for a resolution module's verdict.
    Escalated,
    DisputerWon,
    DisputerLost,
}

impl EscalationStatus {
    /// `DisputerWon` and `DisputerLost` are final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::DisputerWon | Self::DisputerLost)
    }
}

impl fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Active => "active",
            Self::Escalated => "escalated",
            Self::DisputerWon => "disputer_won",
            Self::DisputerLost => "disputer_lost",
        };
        f.write_str(s)
    }
}

/// The escalation of one request.
///
/// Pledger lists keep every pledge in order; an account that pledged twice
/// appears twice and is paid twice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub status: EscalationStatus,
    /// The tracked dispute. [`Hash::ZERO`] until the escalation opens.
    pub dispute_id: DisputeId,
    pub pledgers_for: Vec<AccountId>,
    pub pledgers_against: Vec<AccountId>,
}

impl EscalationRecord {
    pub fn pledges_for(&self) -> usize {
        self.pledgers_for.len()
    }

    pub fn pledges_against(&self) -> usize {
        self.pledgers_against.len()
    }

    pub fn is_tied(&self) -> bool {
        self.pledges_for() == self.pledges_against()
    }

    pub fn tracks(&self, dispute_id: &DisputeId) -> bool {
        self.dispute_id != Hash::ZERO && &self.dispute_id == dispute_id
    }
}

/// Payout per winning pledger: their own bond back plus an equal share of
/// the losing side's bonds, rounded down.
pub fn winner_payout(bond_size: u128, winning: u128, losing: u128) -> Option<u128> {
    if winning == 0 {
        return None;
    }
    let share = losing.checked_mul(bond_size)? / winning;
    bond_size.checked_add(share)
}
