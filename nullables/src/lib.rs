//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the protocol reaches outside itself (the coordinator,
//! the token layer, the clock) is abstracted behind a trait or an explicit
//! parameter. This crate provides in-memory implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: hand these to the engines in tests in place of the real ones.

pub mod clock;
pub mod oracle;
pub mod tokens;

pub use clock::NullClock;
pub use oracle::NullOracle;
pub use tokens::NullTokens;
