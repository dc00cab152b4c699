//! Execution layer requests (EIP-7685)

use fixgen_crypto::sha256;
use fixgen_primitives::{Bytes, H256};

/// Deposit request type byte
pub const DEPOSIT_REQUEST_TYPE: u8 = 0x00;
/// Withdrawal request type byte
pub const WITHDRAWAL_REQUEST_TYPE: u8 = 0x01;
/// Consolidation request type byte
pub const CONSOLIDATION_REQUEST_TYPE: u8 = 0x02;

/// Commitment over typed requests.
///
/// Each entry is `type || payload`. Entries carrying only the type byte are
/// skipped.
pub fn requests_hash(requests: &[Bytes]) -> H256 {
    let mut concat = Vec::with_capacity(requests.len() * 32);
    for request in requests.iter().filter(|r| r.len() > 1) {
        concat.extend_from_slice(sha256(request).as_bytes());
    }
    sha256(&concat)
}
