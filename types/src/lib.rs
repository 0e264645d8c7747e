//! Fundamental types for the bonded escalation protocol.
//!
//! This crate defines the types shared by every other crate in the workspace:
//! account/asset identifiers, hashes, timestamps, dispute records, module
//! parameters, and the traits through which modules reach their external
//! collaborators (the coordinator and the token layer).

pub mod address;
pub mod dispute;
pub mod error;
pub mod hash;
pub mod oracle;
pub mod params;
pub mod time;
pub mod token;

pub use address::{AccountId, AssetId};
pub use dispute::{Dispute, DisputeStatus, Response};
pub use error::{OracleError, ParamsError, TransferError};
pub use hash::{DisputeId, Hash, RequestId, ResponseId};
pub use oracle::{ModulePolicy, Oracle};
pub use params::{BondEscalationParams, CommitRevealParams, ParamRegistry, VotingParams};
pub use time::Timestamp;
pub use token::TokenTransfer;
