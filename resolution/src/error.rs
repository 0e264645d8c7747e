use bond_types::{OracleError, ParamsError, TransferError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("caller {caller} is not the coordinator")]
    Unauthorized { caller: String },

    #[error("dispute does not exist")]
    NonExistentDispute,

    #[error("dispute is already resolved")]
    AlreadyResolved,

    #[error("dispute has not been escalated to this module")]
    DisputeNotEscalated,

    #[error("resolution has already started for this dispute")]
    AlreadyStarted,

    #[error("voting phase is over")]
    VotingPhaseOver,

    #[error("voting phase is still ongoing")]
    OnGoingVotingPhase,

    #[error("committing phase is over")]
    CommittingPhaseOver,

    #[error("committing phase is still ongoing")]
    OnGoingCommittingPhase,

    #[error("revealing phase is still ongoing")]
    OnGoingRevealingPhase,

    #[error("revealing phase is over")]
    RevealingPhaseOver,

    #[error("commitment must not be empty")]
    EmptyCommitment,

    #[error("revealed data does not match the commitment")]
    WrongRevealData,

    #[error("commitment was already revealed")]
    CommitmentReused,

    #[error("custody holds {available}, refunds need {needed}")]
    CustodyShortfall { needed: u128, available: u128 },

    #[error("arithmetic overflow in vote tally")]
    Overflow,

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error("coordinator: {0}")]
    Oracle(#[from] OracleError),

    #[error("token transfer: {0}")]
    Transfer(#[from] TransferError),
}
