//! Key/value trie with root computation

use crate::nibbles::bytes_to_nibbles;
use crate::node::root_of_sorted;
use fixgen_crypto::keccak256;
use fixgen_primitives::{Bytes, H256, U256};
use std::collections::BTreeMap;

/// A value that can be stored in a trie leaf.
pub trait TrieValue: Clone + PartialEq {
    /// Bytes placed in the leaf node.
    fn leaf_bytes(&self) -> Vec<u8>;
}

impl TrieValue for Vec<u8> {
    fn leaf_bytes(&self) -> Vec<u8> {
        self.clone()
    }
}

impl TrieValue for Bytes {
    fn leaf_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }
}

/// Storage slots are RLP encoded in their leaves.
impl TrieValue for U256 {
    fn leaf_bytes(&self) -> Vec<u8> {
        fixgen_rlp::encode(self)
    }
}

/// Merkle-Patricia trie over byte keys.
///
/// Setting a key to the trie's default value removes it, so a key holding the
/// default and an absent key produce the same root. A secured trie hashes every
/// key with keccak256 before placing it.
#[derive(Debug, Clone)]
pub struct Trie<V: TrieValue> {
    secured: bool,
    default: V,
    data: BTreeMap<Vec<u8>, V>,
}

impl<V: TrieValue> Trie<V> {
    /// Create an empty trie
    pub fn new(secured: bool, default: V) -> Self {
        Self {
            secured,
            default,
            data: BTreeMap::new(),
        }
    }

    /// Insert or replace a value. The default value deletes the key.
    pub fn set(&mut self, key: impl AsRef<[u8]>, value: V) {
        let key = key.as_ref().to_vec();
        if value == self.default {
            self.data.remove(&key);
        } else {
            self.data.insert(key, value);
        }
    }

    /// Value at `key`, or the default when absent
    pub fn get(&self, key: impl AsRef<[u8]>) -> &V {
        self.data.get(key.as_ref()).unwrap_or(&self.default)
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the trie holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the trie hashes keys before insertion
    pub fn is_secured(&self) -> bool {
        self.secured
    }

    /// Root hash of the current contents
    pub fn root(&self) -> H256 {
        let mut entries: Vec<(Vec<u8>, Vec<u8>)> = self
            .data
            .iter()
            .map(|(key, value)| {
                let path = if self.secured {
                    bytes_to_nibbles(keccak256(key).as_bytes())
                } else {
                    bytes_to_nibbles(key)
                };
                (path, value.leaf_bytes())
            })
            .collect();
        if self.secured {
            entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        }
        root_of_sorted(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> H256 {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_root() {
        let trie: Trie<Vec<u8>> = Trie::new(false, Vec::new());
        assert_eq!(
            trie.root(),
            h("0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421")
        );
    }

    #[test]
    fn test_prefix_keys() {
        let mut trie = Trie::new(false, Vec::new());
        trie.set(b"test", b"test".to_vec());
        trie.set(b"te", b"testy".to_vec());
        assert_eq!(
            trie.root(),
            h("0x8452568af70d8d140f58d941338542f645fcca50094b20f3c3d8c3df49337928")
        );
    }

    #[test]
    fn test_default_value_deletes() {
        let mut trie = Trie::new(false, Vec::new());
        trie.set(b"dog", b"puppy".to_vec());
        let with_dog = trie.root();
        trie.set(b"cat", b"kitten".to_vec());
        assert_ne!(trie.root(), with_dog);
        trie.set(b"cat", Vec::new());
        assert_eq!(trie.root(), with_dog);
        assert_eq!(trie.len(), 1);
        assert!(trie.get(b"cat").is_empty());
    }

    #[test]
    fn test_storage_values_rlp_encoded() {
        let mut trie = Trie::new(true, U256::zero());
        trie.set([0u8; 32], U256::from(1u64));
        trie.set([1u8; 32], U256::zero());
        assert_eq!(trie.len(), 1);
        assert_eq!(*trie.get([0u8; 32]), U256::from(1u64));
    }
}
