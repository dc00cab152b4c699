//! Ordered, duplicate-free exception lists

use crate::error::ExceptionError;
use crate::kinds::ExceptionKind;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One or more acceptable exceptions, rendered joined by `|`.
///
/// Insertion order is kept and repeats are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ExceptionList(Vec<ExceptionKind>);

impl ExceptionList {
    /// Empty list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append unless already present
    pub fn push(&mut self, kind: ExceptionKind) {
        if !self.0.contains(&kind) {
            self.0.push(kind);
        }
    }

    /// Whether `kind` is acceptable
    pub fn contains(&self, kind: &ExceptionKind) -> bool {
        self.0.contains(kind)
    }

    /// Exceptions in insertion order
    pub fn kinds(&self) -> &[ExceptionKind] {
        &self.0
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ExceptionKind> for ExceptionList {
    fn from(kind: ExceptionKind) -> Self {
        Self(vec![kind])
    }
}

impl<K: Into<ExceptionKind>> FromIterator<K> for ExceptionList {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut list = ExceptionList::new();
        for kind in iter {
            list.push(kind.into());
        }
        list
    }
}

impl fmt::Display for ExceptionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", kind)?;
        }
        Ok(())
    }
}

impl FromStr for ExceptionList {
    type Err = ExceptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('|')
            .map(str::parse::<ExceptionKind>)
            .collect::<Result<Vec<_>, _>>()
            .map(|kinds| kinds.into_iter().collect())
    }
}

impl Serialize for ExceptionList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExceptionList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{BlockException, TransactionException};

    #[test]
    fn test_order_kept_and_duplicates_dropped() {
        let list: ExceptionList = [
            ExceptionKind::from(TransactionException::NonceMismatchTooLow),
            ExceptionKind::from(BlockException::RlpStructuresEncoding),
            ExceptionKind::from(TransactionException::NonceMismatchTooLow),
        ]
        .into_iter()
        .collect();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.to_string(),
            "TransactionException.NONCE_MISMATCH_TOO_LOW|BlockException.RLP_STRUCTURES_ENCODING"
        );
    }

    #[test]
    fn test_parse_and_serde() {
        let text = "TransactionException.INTRINSIC_GAS_TOO_LOW|TransactionException.INSUFFICIENT_ACCOUNT_FUNDS";
        let list: ExceptionList = text.parse().unwrap();
        assert!(list.contains(&TransactionException::InsufficientAccountFunds.into()));

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, format!("\"{}\"", text));
        let back: ExceptionList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);

        assert!("TransactionException.INTRINSIC_GAS_TOO_LOW|bogus".parse::<ExceptionList>().is_err());
    }
}
