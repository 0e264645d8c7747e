//! Bond escalation module.
//!
//! The first dispute raised against a request before its escalation deadline
//! opens a pledging contest. Third parties lock one bond per pledge for or
//! against the dispute; a side may never lead by more than one pledge, and
//! after the deadline pledges may only tie. Once the tying buffer closes an
//! untied contest settles proportionally; a tied one is escalated to a
//! resolution module and paid out from its verdict.

pub mod engine;
pub mod error;
pub mod record;

pub use engine::BondEscalationEngine;
pub use error::EscalationError;
pub use record::{EscalationRecord, EscalationStatus};
