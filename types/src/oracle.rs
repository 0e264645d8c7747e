//! The coordinator ("oracle") seen from the modules.
//!
//! The coordinator owns requests, responses and disputes and sequences the
//! module hooks. Modules only read its records, report verdicts back, and
//! ask it which modules are registered for a request.

use crate::address::AccountId;
use crate::dispute::{Dispute, DisputeStatus, Response};
use crate::error::OracleError;
use crate::hash::{DisputeId, RequestId, ResponseId};

/// Allow-list of modules per request.
///
/// The ledger consults this before letting a caller bond, pay or release
/// funds held against a request.
pub trait ModulePolicy {
    fn is_allowed_module(&self, request_id: &RequestId, module: &AccountId) -> bool;
}

/// Records and callbacks provided by the coordinator.
pub trait Oracle: ModulePolicy {
    /// Fetch a dispute. Unknown ids yield [`Dispute::default`].
    fn get_dispute(&self, dispute_id: &DisputeId) -> Dispute;

    /// Fetch a response. Unknown ids yield [`Response::default`].
    fn get_response(&self, response_id: &ResponseId) -> Response;

    /// Report a verdict (or any other status change) for a dispute.
    fn update_dispute_status(
        &mut self,
        caller: &AccountId,
        dispute_id: &DisputeId,
        status: DisputeStatus,
    ) -> Result<(), OracleError>;
}
