//! Bond accounting ledger.
//!
//! Tracks, per (account, asset), an available balance and the amounts bonded
//! against individual requests, plus per-dispute pledge pools used by the
//! escalation module. Modules may only touch funds held against a request
//! they are registered for; the allow-list is supplied by the coordinator
//! through [`bond_types::ModulePolicy`].

pub mod error;
pub mod ledger;
pub mod snapshot;

pub use error::LedgerError;
pub use ledger::{Ledger, LedgerEntry};
pub use snapshot::{BalanceRecord, LedgerSnapshot, PledgeRecord};
