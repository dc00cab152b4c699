//! Accounts and allocations

use crate::error::{TypesError, TypesResult};
use fixgen_primitives::serde_hex::{padded_u256, padded_u64, HexU256};
use fixgen_primitives::{Address, Bytes, H256, U256};
use fixgen_trie::{state_root, storage_root, AccountLeaf, EMPTY_CODE_HASH};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Account storage. Zero-valued slots are kept as written but never reach the trie.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Storage(pub BTreeMap<U256, U256>);

impl Storage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a slot, zero when unset
    pub fn get(&self, key: &U256) -> U256 {
        self.0.get(key).copied().unwrap_or_default()
    }

    /// Write a slot
    pub fn set(&mut self, key: U256, value: U256) {
        self.0.insert(key, value);
    }

    /// Whether every slot is zero
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_zero())
    }

    /// Root of the storage trie
    pub fn root(&self) -> H256 {
        storage_root(self.0.iter())
    }
}

impl<K: Into<U256>, V: Into<U256>> FromIterator<(K, V)> for Storage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Serialize for Storage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (HexU256(*k), HexU256(*v))))
    }
}

impl<'de> Deserialize<'de> for Storage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<HexU256, HexU256>::deserialize(deserializer)?;
        Ok(Self(map.into_iter().map(|(k, v)| (k.0, v.0)).collect()))
    }
}

/// State of one account
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Account {
    /// Transaction count
    #[serde(with = "padded_u64", default)]
    pub nonce: u64,
    /// Balance in wei
    #[serde(with = "padded_u256", default)]
    pub balance: U256,
    /// Contract code
    #[serde(default)]
    pub code: Bytes,
    /// Storage slots
    #[serde(default)]
    pub storage: Storage,
}

impl Account {
    /// Account holding only a balance
    pub fn with_balance(balance: impl Into<U256>) -> Self {
        Self {
            balance: balance.into(),
            ..Default::default()
        }
    }

    /// No nonce, balance, code or storage
    pub fn is_empty(&self) -> bool {
        self.nonce == 0 && self.balance.is_zero() && self.code.is_empty() && self.storage.is_empty()
    }

    /// keccak256 of the code
    pub fn code_hash(&self) -> H256 {
        if self.code.is_empty() {
            EMPTY_CODE_HASH
        } else {
            fixgen_crypto::keccak256(&self.code)
        }
    }

    /// Leaf for the account trie
    pub fn leaf(&self) -> AccountLeaf {
        AccountLeaf::new(self.nonce, self.balance, &self.code, self.storage.root())
    }

    fn merge_from(&mut self, address: Address, other: Account, overwrite: bool) -> TypesResult<()> {
        let collision = |field: String| TypesError::AllocCollision { address, field };
        if !overwrite {
            if self.nonce != other.nonce {
                return Err(collision("nonce".into()));
            }
            if self.balance != other.balance {
                return Err(collision("balance".into()));
            }
            if self.code != other.code {
                return Err(collision("code".into()));
            }
            for (key, value) in &other.storage.0 {
                if matches!(self.storage.0.get(key), Some(existing) if existing != value) {
                    return Err(collision(format!("storage[{:#x}]", key)));
                }
            }
        }
        self.nonce = other.nonce;
        self.balance = other.balance;
        self.code = other.code;
        self.storage.0.extend(other.storage.0);
        Ok(())
    }
}

/// Pre- or post-state: accounts by address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alloc(pub BTreeMap<Address, Account>);

impl Alloc {
    /// Empty allocation
    pub fn new() -> Self {
        Self::default()
    }

    /// Account at `address`
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.0.get(address)
    }

    /// Insert or replace an account
    pub fn insert(&mut self, address: Address, account: Account) {
        self.0.insert(address, account);
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no accounts
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Accounts in address order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.0.iter()
    }

    /// Merge `other` into this allocation.
    ///
    /// Accounts present on both sides are merged field by field. Differing
    /// values fail with [`TypesError::AllocCollision`] unless `overwrite` is set,
    /// in which case `other` wins. On failure `self` is left untouched.
    pub fn merge(&mut self, other: Alloc, overwrite: bool) -> TypesResult<()> {
        let mut staged = Vec::with_capacity(other.0.len());
        for (address, account) in other.0 {
            match self.0.get(&address) {
                Some(existing) => {
                    let mut merged = existing.clone();
                    merged.merge_from(address, account, overwrite)?;
                    staged.push((address, merged));
                }
                None => staged.push((address, account)),
            }
        }
        self.0.extend(staged);
        Ok(())
    }

    /// State root. Empty accounts are left out of the trie.
    pub fn state_root(&self) -> H256 {
        state_root(self.0.iter().map(|(address, account)| (*address, account.leaf())))
    }
}

impl FromIterator<(Address, Account)> for Alloc {
    fn from_iter<I: IntoIterator<Item = (Address, Account)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_trie::EMPTY_TRIE_ROOT;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    // ==================== Account ====================

    #[test]
    fn test_empty_account() {
        assert!(Account::default().is_empty());
        let mut acc = Account::default();
        acc.storage.set(U256::one(), U256::zero());
        assert!(acc.is_empty());
        acc.storage.set(U256::one(), U256::one());
        assert!(!acc.is_empty());
    }

    #[test]
    fn test_account_json() {
        let mut acc = Account::with_balance(10u64);
        acc.storage.set(U256::zero(), U256::from(256u64));
        let json = serde_json::to_value(&acc).unwrap();
        assert_eq!(json["nonce"], "0x00");
        assert_eq!(json["balance"], "0x0a");
        assert_eq!(json["code"], "0x");
        assert_eq!(json["storage"]["0x00"], "0x0100");

        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, acc);
    }

    #[test]
    fn test_account_json_defaults() {
        let acc: Account = serde_json::from_str(r#"{"balance": "1000"}"#).unwrap();
        assert_eq!(acc.balance, U256::from(1000u64));
        assert_eq!(acc.nonce, 0);
    }

    // ==================== Alloc ====================

    #[test]
    fn test_state_root_skips_empty_accounts() {
        let mut alloc = Alloc::new();
        assert_eq!(alloc.state_root(), EMPTY_TRIE_ROOT);
        alloc.insert(addr(1), Account::default());
        assert_eq!(alloc.state_root(), EMPTY_TRIE_ROOT);
        alloc.insert(addr(2), Account::with_balance(1u64));
        assert_ne!(alloc.state_root(), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_merge_disjoint_and_equal() {
        let mut a: Alloc = [(addr(1), Account::with_balance(5u64))].into_iter().collect();
        let b: Alloc = [
            (addr(1), Account::with_balance(5u64)),
            (addr(2), Account::with_balance(7u64)),
        ]
        .into_iter()
        .collect();
        a.merge(b, false).unwrap();
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_merge_collision() {
        let mut a: Alloc = [(addr(1), Account::with_balance(5u64))].into_iter().collect();
        let b: Alloc = [(addr(1), Account::with_balance(6u64))].into_iter().collect();
        let err = a.clone().merge(b.clone(), false).unwrap_err();
        assert_eq!(
            err,
            TypesError::AllocCollision {
                address: addr(1),
                field: "balance".into()
            }
        );
        a.merge(b, true).unwrap();
        assert_eq!(a.get(&addr(1)).unwrap().balance, U256::from(6u64));
    }

    #[test]
    fn test_failed_merge_leaves_alloc_untouched() {
        let mut a: Alloc = [(addr(5), Account::with_balance(10u64))].into_iter().collect();
        let b: Alloc = [
            (addr(1), Account::with_balance(1u64)),
            (addr(5), Account::with_balance(11u64)),
        ]
        .into_iter()
        .collect();
        let before = a.clone();
        assert!(a.merge(b, false).is_err());
        assert_eq!(a, before);
    }

    #[test]
    fn test_merge_storage_collision() {
        let mut left = Account::default();
        left.storage.set(U256::one(), U256::one());
        let mut right = Account::default();
        right.storage.set(U256::one(), U256::from(2u64));
        let mut a: Alloc = [(addr(1), left)].into_iter().collect();
        let b: Alloc = [(addr(1), right)].into_iter().collect();
        assert!(matches!(
            a.merge(b, false),
            Err(TypesError::AllocCollision { field, .. }) if field == "storage[0x1]"
        ));
    }
}
