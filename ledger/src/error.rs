use bond_types::{RequestId, TransferError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("caller {caller} is not a module registered for request {request_id}")]
    Unauthorized {
        caller: String,
        request_id: RequestId,
    },

    #[error("insufficient funds: need {needed}, available {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("arithmetic overflow in ledger balance")]
    Overflow,

    #[error("token transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("snapshot hash does not match its contents")]
    SnapshotMismatch,

    #[error("serialization error: {0}")]
    Serialization(String),
}
