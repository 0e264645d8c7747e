//! Errors shared between the protocol crates.

use crate::hash::{DisputeId, RequestId};
use thiserror::Error;

/// Failures reported by the coordinator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("caller {0} is not allowed to update this dispute")]
    Unauthorized(String),

    #[error("dispute {0} does not exist")]
    UnknownDispute(DisputeId),

    #[error("{0}")]
    Other(String),
}

/// Failures of an external token transfer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient token balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Failures of a module's parameter registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("request {0} is already configured")]
    AlreadyConfigured(RequestId),

    #[error("request {0} is not configured for this module")]
    NotConfigured(RequestId),
}
