//! Blake2b hashing for dispute ids and vote commitments.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use bond_types::{AccountId, DisputeId, Hash, RequestId, ResponseId};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Account ids are variable length; prefix them so adjacent fields can't bleed.
fn account_len(account: &AccountId) -> [u8; 4] {
    (account.as_bytes().len() as u32).to_be_bytes()
}

/// Id of the dispute `disputer` raises against `response_id` of `request_id`.
///
/// The coordinator derives dispute ids the same way; the escalation module
/// relies on both sides agreeing.
pub fn derive_dispute_id(
    disputer: &AccountId,
    request_id: &RequestId,
    response_id: &ResponseId,
) -> DisputeId {
    Hash::new(blake2b_256_multi(&[
        &account_len(disputer),
        disputer.as_bytes(),
        request_id.as_bytes(),
        response_id.as_bytes(),
    ]))
}

/// Commitment a voter submits before revealing `amount` votes with `salt`.
pub fn compute_commitment(
    voter: &AccountId,
    dispute_id: &DisputeId,
    amount: u128,
    salt: &Hash,
) -> Hash {
    Hash::new(blake2b_256_multi(&[
        &account_len(voter),
        voter.as_bytes(),
        dispute_id.as_bytes(),
        &amount.to_be_bytes(),
        salt.as_bytes(),
    ]))
}
