//! Roots over ordered lists (transactions, receipts, withdrawals)

use crate::trie::Trie;
use fixgen_primitives::H256;

/// Root of an unsecured trie keyed by `rlp(index)` holding the given encodings.
pub fn ordered_trie_root<I, T>(items: I) -> H256
where
    I: IntoIterator<Item = T>,
    T: Into<Vec<u8>>,
{
    let mut trie = Trie::new(false, Vec::new());
    for (index, item) in items.into_iter().enumerate() {
        trie.set(fixgen_rlp::encode(&(index as u64)), item.into());
    }
    trie.root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EMPTY_TRIE_ROOT;

    #[test]
    fn test_empty_list() {
        assert_eq!(ordered_trie_root(Vec::<Vec<u8>>::new()), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_order_matters() {
        let a = ordered_trie_root(vec![vec![0x01], vec![0x02]]);
        let b = ordered_trie_root(vec![vec![0x02], vec![0x01]]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_index_zero_key() {
        // index 0 is keyed by rlp(0) = 0x80
        let mut trie = Trie::new(false, Vec::new());
        trie.set([0x80], vec![0xaa]);
        assert_eq!(ordered_trie_root(vec![vec![0xaa]]), trie.root());
    }
}
