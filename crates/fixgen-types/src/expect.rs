//! Expected post-state

use crate::account::{Alloc, Storage};
use crate::error::PostStateError;
use fixgen_primitives::serde_hex::{opt_padded_u256, opt_padded_u64};
use fixgen_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Fields an account must have after execution. Unset fields are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpectedAccount {
    /// Expected nonce
    #[serde(with = "opt_padded_u64", default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Expected balance
    #[serde(with = "opt_padded_u256", default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<U256>,
    /// Expected code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Bytes>,
    /// Expected storage. Slots not listed must be zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Storage>,
}

/// What must hold for one address after execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountExpectation {
    /// The account must not exist. Written as `null` in JSON.
    MustNotExist,
    /// The account must exist and match
    Matches(ExpectedAccount),
}

impl Serialize for AccountExpectation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AccountExpectation::MustNotExist => serializer.serialize_none(),
            AccountExpectation::Matches(account) => account.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AccountExpectation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<ExpectedAccount>::deserialize(deserializer)? {
            Some(account) => AccountExpectation::Matches(account),
            None => AccountExpectation::MustNotExist,
        })
    }
}

/// Expected post-state by address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedAlloc(pub BTreeMap<Address, AccountExpectation>);

impl ExpectedAlloc {
    /// Expect nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for `address`
    pub fn insert(&mut self, address: Address, expectation: AccountExpectation) {
        self.0.insert(address, expectation);
    }

    /// Check `actual` against every expectation, reporting the first failure
    pub fn verify(&self, actual: &Alloc) -> Result<(), PostStateError> {
        for (address, expectation) in &self.0 {
            let found = actual.get(address);
            match (expectation, found) {
                (AccountExpectation::MustNotExist, Some(_)) => {
                    return Err(PostStateError::UnexpectedAccount { address: *address });
                }
                (AccountExpectation::MustNotExist, None) => {}
                (AccountExpectation::Matches(_), None) => {
                    return Err(PostStateError::MissingAccount { address: *address });
                }
                (AccountExpectation::Matches(expected), Some(account)) => {
                    verify_account(*address, expected, account)?;
                }
            }
        }
        Ok(())
    }
}

fn verify_account(
    address: Address,
    expected: &ExpectedAccount,
    account: &crate::account::Account,
) -> Result<(), PostStateError> {
    if let Some(nonce) = expected.nonce {
        if nonce != account.nonce {
            return Err(PostStateError::NonceMismatch {
                address,
                expected: nonce,
                actual: account.nonce,
            });
        }
    }
    if let Some(balance) = expected.balance {
        if balance != account.balance {
            return Err(PostStateError::BalanceMismatch {
                address,
                expected: balance,
                actual: account.balance,
            });
        }
    }
    if let Some(code) = &expected.code {
        if *code != account.code {
            return Err(PostStateError::CodeMismatch {
                address,
                expected: code.clone(),
                actual: account.code.clone(),
            });
        }
    }
    if let Some(storage) = &expected.storage {
        let keys: BTreeSet<&U256> = storage.0.keys().chain(account.storage.0.keys()).collect();
        for key in keys {
            let want = storage.get(key);
            let got = account.storage.get(key);
            if want != got {
                return Err(PostStateError::StorageMismatch {
                    address,
                    key: *key,
                    expected: want,
                    actual: got,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn post() -> Alloc {
        let mut acc = Account::with_balance(90u64);
        acc.nonce = 1;
        acc.storage.set(U256::one(), U256::from(5u64));
        [(addr(1), acc)].into_iter().collect()
    }

    #[test]
    fn test_null_means_must_not_exist() {
        let expected: ExpectedAlloc = serde_json::from_str(&format!(
            r#"{{"{}": null, "{}": {{"balance": "0x5a"}}}}"#,
            addr(2),
            addr(1)
        ))
        .unwrap();
        assert_eq!(expected.0[&addr(2)], AccountExpectation::MustNotExist);
        expected.verify(&post()).unwrap();

        let json = serde_json::to_value(&expected).unwrap();
        assert!(json[addr(2).to_string()].is_null());
    }

    #[test]
    fn test_each_failure_is_distinct() {
        let mut e = ExpectedAlloc::new();
        e.insert(addr(1), AccountExpectation::MustNotExist);
        assert!(matches!(e.verify(&post()), Err(PostStateError::UnexpectedAccount { .. })));

        let mut e = ExpectedAlloc::new();
        e.insert(addr(3), AccountExpectation::Matches(ExpectedAccount::default()));
        assert!(matches!(e.verify(&post()), Err(PostStateError::MissingAccount { .. })));

        let check = |expected: ExpectedAccount| {
            let mut e = ExpectedAlloc::new();
            e.insert(addr(1), AccountExpectation::Matches(expected));
            e.verify(&post())
        };
        assert!(matches!(
            check(ExpectedAccount { nonce: Some(2), ..Default::default() }),
            Err(PostStateError::NonceMismatch { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            check(ExpectedAccount { balance: Some(U256::from(1u64)), ..Default::default() }),
            Err(PostStateError::BalanceMismatch { .. })
        ));
        assert!(matches!(
            check(ExpectedAccount { code: Some(Bytes::from(vec![0x00])), ..Default::default() }),
            Err(PostStateError::CodeMismatch { .. })
        ));
        // slot 1 holds 5 but the expectation lists no slots
        assert!(matches!(
            check(ExpectedAccount { storage: Some(Storage::new()), ..Default::default() }),
            Err(PostStateError::StorageMismatch { expected, .. }) if expected.is_zero()
        ));
    }

    #[test]
    fn test_zero_slot_matches_absent_slot() {
        let mut storage = Storage::new();
        storage.set(U256::one(), U256::from(5u64));
        storage.set(U256::from(9u64), U256::zero());
        let mut e = ExpectedAlloc::new();
        e.insert(
            addr(1),
            AccountExpectation::Matches(ExpectedAccount {
                storage: Some(storage),
                ..Default::default()
            }),
        );
        e.verify(&post()).unwrap();
    }
}
