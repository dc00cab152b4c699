//! Beacon chain withdrawals (EIP-4895)

use fixgen_primitives::serde_hex::padded_u64;
use fixgen_primitives::{Address, H256};
use fixgen_rlp::{Encodable, RlpStream};
use fixgen_trie::ordered_trie_root;
use serde::{Deserialize, Serialize};

/// A withdrawal credited at the end of a block. `amount` is in gwei.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    /// Monotonic withdrawal index
    #[serde(with = "padded_u64")]
    pub index: u64,
    /// Validator index
    #[serde(with = "padded_u64")]
    pub validator_index: u64,
    /// Recipient
    pub address: Address,
    /// Amount in gwei
    #[serde(with = "padded_u64")]
    pub amount: u64,
}

impl Encodable for Withdrawal {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.index);
        s.append(&self.validator_index);
        s.append(&self.address);
        s.append(&self.amount);
    }
}

/// Root of the withdrawals trie
pub fn withdrawals_root(withdrawals: &[Withdrawal]) -> H256 {
    ordered_trie_root(withdrawals.iter().map(fixgen_rlp::encode))
}
