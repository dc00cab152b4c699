//! `transaction_test` fixtures

use crate::info::FixtureInfo;
use fixgen_exceptions::ExceptionList;
use fixgen_primitives::serde_hex::padded_u64;
use fixgen_primitives::{Address, Bytes, H256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected outcome of decoding the transaction under one fork
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFixtureResult {
    /// Transaction hash, valid transactions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<H256>,
    /// Intrinsic gas
    #[serde(with = "padded_u64")]
    pub intrinsic_gas: u64,
    /// Sender, valid transactions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    /// Rejection reasons, invalid transactions only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionList>,
}

/// `transaction_test` fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFixture {
    /// Outcomes by fork name
    pub result: BTreeMap<String, TransactionFixtureResult>,
    /// Network-encoded transaction
    pub txbytes: Bytes,
    /// Metadata
    #[serde(rename = "_info")]
    pub info: FixtureInfo,
}
