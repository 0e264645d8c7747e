//! Nullable coordinator: in-memory requests, responses and disputes.

use bond_types::{
    AccountId, Dispute, DisputeId, DisputeStatus, Hash, ModulePolicy, Oracle, OracleError,
    RequestId, Response, ResponseId, Timestamp,
};
use std::collections::{HashMap, HashSet};

/// An in-memory coordinator implementing [`Oracle`].
///
/// It never calls back into modules: tests drive the hooks themselves, in
/// the order the real coordinator would.
pub struct NullOracle {
    address: AccountId,
    responses: HashMap<ResponseId, Response>,
    disputes: HashMap<DisputeId, Dispute>,
    modules: HashMap<RequestId, HashSet<AccountId>>,
    /// Every accepted `update_dispute_status` call, in order.
    status_updates: Vec<(DisputeId, DisputeStatus)>,
    next_response: u64,
}

impl NullOracle {
    pub fn new(address: AccountId) -> Self {
        Self {
            address,
            responses: HashMap::new(),
            disputes: HashMap::new(),
            modules: HashMap::new(),
            status_updates: Vec::new(),
            next_response: 0,
        }
    }

    /// The coordinator's own account; modules accept hook calls only from it.
    pub fn address(&self) -> &AccountId {
        &self.address
    }

    /// Register `module` for `request_id`.
    pub fn allow_module(&mut self, request_id: RequestId, module: AccountId) {
        self.modules.entry(request_id).or_default().insert(module);
    }

    /// Store a response and return its id.
    pub fn insert_response(
        &mut self,
        request_id: RequestId,
        proposer: AccountId,
        created_at: Timestamp,
    ) -> ResponseId {
        self.next_response += 1;
        let id = Hash::new(bond_crypto::blake2b_256_multi(&[
            b"response",
            request_id.as_bytes(),
            &self.next_response.to_be_bytes(),
        ]));
        self.responses.insert(
            id,
            Response {
                created_at,
                request_id,
                proposer,
                content: Vec::new(),
            },
        );
        id
    }

    /// Store a dispute under the id the coordinator derives for it.
    pub fn record_dispute(&mut self, dispute: Dispute) -> DisputeId {
        let id = bond_crypto::derive_dispute_id(
            &dispute.disputer,
            &dispute.request_id,
            &dispute.response_id,
        );
        self.disputes.insert(id, dispute);
        id
    }

    /// Overwrite a dispute's status without any authorization check.
    pub fn set_dispute_status(&mut self, dispute_id: &DisputeId, status: DisputeStatus) {
        if let Some(d) = self.disputes.get_mut(dispute_id) {
            d.status = status;
        }
    }

    pub fn status_updates(&self) -> &[(DisputeId, DisputeStatus)] {
        &self.status_updates
    }
}

impl ModulePolicy for NullOracle {
    fn is_allowed_module(&self, request_id: &RequestId, module: &AccountId) -> bool {
        self.modules
            .get(request_id)
            .is_some_and(|set| set.contains(module))
    }
}

impl Oracle for NullOracle {
    fn get_dispute(&self, dispute_id: &DisputeId) -> Dispute {
        self.disputes.get(dispute_id).cloned().unwrap_or_default()
    }

    fn get_response(&self, response_id: &ResponseId) -> Response {
        self.responses.get(response_id).cloned().unwrap_or_default()
    }

    fn update_dispute_status(
        &mut self,
        caller: &AccountId,
        dispute_id: &DisputeId,
        status: DisputeStatus,
    ) -> Result<(), OracleError> {
        let request_id = match self.disputes.get(dispute_id) {
            Some(d) => d.request_id,
            None => return Err(OracleError::UnknownDispute(*dispute_id)),
        };
        if caller != &self.address && !self.is_allowed_module(&request_id, caller) {
            return Err(OracleError::Unauthorized(caller.to_string()));
        }
        self.set_dispute_status(dispute_id, status);
        self.status_updates.push((*dispute_id, status));
        Ok(())
    }
}
