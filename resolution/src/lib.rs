//! Resolution modules for escalated disputes.
//!
//! Both variants run a token-weighted vote after the coordinator calls
//! `start_resolution`. Voters lock vote tokens in the module's custody; the
//! dispute is decided `Won` when total votes reach the quorum and `Lost`
//! otherwise, and every voter gets their tokens back whatever the outcome.
//!
//! - [`OpenVoteEngine`]: votes are public as they are cast
//! - [`CommitRevealEngine`]: voters commit to a hidden amount, then reveal it

pub mod commit_reveal;
pub mod error;
pub mod module;
pub mod voting;

pub use commit_reveal::{CommitRevealEngine, CommitRevealRecord, VoterCommitment};
pub use error::ResolutionError;
pub use module::ResolutionModule;
pub use voting::{OpenVoteEngine, VoteRecord};
