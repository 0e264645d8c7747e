//! Hashing primitives for the bonded escalation protocol.
//!
//! - **Blake2b-256** for every derived identifier
//! - Dispute id derivation shared with the coordinator
//! - Vote commitments for the commit-reveal resolution module

pub mod hash;

pub use hash::{blake2b_256, blake2b_256_multi, compute_commitment, derive_dispute_id};
