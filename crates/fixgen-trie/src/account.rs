//! Account and storage tries

use crate::trie::{Trie, TrieValue};
use fixgen_crypto::keccak256;
use fixgen_primitives::{Address, H256, U256};
use fixgen_rlp::RlpStream;

/// Root of a trie with no entries, keccak256(rlp(""))
pub const EMPTY_TRIE_ROOT: H256 = H256::from_bytes([
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
]);

/// Hash of empty code, keccak256("")
pub const EMPTY_CODE_HASH: H256 = H256::from_bytes([
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c, 0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b, 0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
]);

/// Leaf stored in the account trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLeaf {
    /// Transaction count
    pub nonce: u64,
    /// Balance in wei
    pub balance: U256,
    /// Root of the account's storage trie
    pub storage_root: H256,
    /// keccak256 of the account code
    pub code_hash: H256,
}

impl AccountLeaf {
    /// Leaf of an account with nothing in it. Such accounts are left out of the trie.
    pub const EMPTY: AccountLeaf = AccountLeaf {
        nonce: 0,
        balance: U256::zero(),
        storage_root: EMPTY_TRIE_ROOT,
        code_hash: EMPTY_CODE_HASH,
    };

    /// Build a leaf from account fields
    pub fn new(nonce: u64, balance: U256, code: &[u8], storage_root: H256) -> Self {
        let code_hash = if code.is_empty() {
            EMPTY_CODE_HASH
        } else {
            keccak256(code)
        };
        Self {
            nonce,
            balance,
            storage_root,
            code_hash,
        }
    }
}

impl TrieValue for AccountLeaf {
    fn leaf_bytes(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(4);
        s.append(&self.nonce);
        s.append(&self.balance);
        s.append(&self.storage_root);
        s.append(&self.code_hash);
        s.out().to_vec()
    }
}

/// Root of a storage trie. Slots holding zero are treated as absent.
pub fn storage_root<'a>(slots: impl IntoIterator<Item = (&'a U256, &'a U256)>) -> H256 {
    let mut trie = Trie::new(true, U256::zero());
    for (key, value) in slots {
        let mut slot = [0u8; 32];
        key.to_big_endian(&mut slot);
        trie.set(slot, *value);
    }
    trie.root()
}

/// State root over `(address, leaf)` pairs.
///
/// Empty accounts are excluded, so they do not affect the root.
pub fn state_root(accounts: impl IntoIterator<Item = (Address, AccountLeaf)>) -> H256 {
    let mut trie = Trie::new(true, AccountLeaf::EMPTY);
    for (address, leaf) in accounts {
        trie.set(address.as_bytes(), leaf);
    }
    trie.root()
}
