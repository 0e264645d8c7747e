use bond_ledger::LedgerError;
use bond_types::{DisputeStatus, OracleError, ParamsError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscalationError {
    #[error("caller {caller} is not the coordinator")]
    Unauthorized { caller: String },

    #[error("dispute does not exist")]
    DisputeDoesNotExist,

    #[error("dispute is not the one going through bond escalation")]
    DisputeNotEscalated,

    #[error("bond escalation is not active")]
    EscalationNotActive,

    #[error("bond escalation period is over")]
    BondEscalationOver,

    #[error("bond escalation period is not over yet")]
    BondEscalationNotOver,

    #[error("dispute cannot be escalated: pledges are not tied")]
    NotEscalatable,

    #[error("pledges are tied, the dispute should be escalated")]
    ShouldBeEscalated,

    #[error("bond escalation cannot be settled")]
    BondEscalationCantBeSettled,

    #[error("maximum number of pledges reached for this side")]
    MaxNumberOfEscalationsReached,

    #[error("a side can only surpass the other by one pledge")]
    CanOnlySurpassByOnePledge,

    #[error("after the deadline pledges can only tie")]
    CanOnlyTieDuringTyingBuffer,

    #[error("dispute window is over")]
    DisputeWindowOver,

    #[error("status {0} cannot settle bonds")]
    InvalidDisputeStatus(DisputeStatus),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("coordinator: {0}")]
    Oracle(#[from] OracleError),

    #[error("serialization: {0}")]
    Serialization(String),
}
