//! Receipts, logs and the logs bloom

use crate::error::ReceiptMismatch;
use fixgen_crypto::keccak256;
use fixgen_primitives::serde_hex::{opt_padded_u64, padded_u64};
use fixgen_primitives::{Address, Bytes, H256};
use fixgen_rlp::{Encodable, RlpStream};
use fixgen_trie::ordered_trie_root;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Logs bloom filter (2048 bits = 256 bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct Bloom(pub [u8; 256]);

impl Default for Bloom {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Bloom {
    /// Empty bloom filter
    pub const ZERO: Bloom = Bloom([0u8; 256]);

    /// Check if bloom filter is empty
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Add data to bloom filter
    pub fn accrue(&mut self, input: &[u8]) {
        let hash = keccak256(input);
        let hash_bytes = hash.as_bytes();

        // Set 3 bits based on hash
        for i in 0..3 {
            let bit_index = ((hash_bytes[i * 2] as usize) << 8 | hash_bytes[i * 2 + 1] as usize) & 0x7FF;
            let byte_index = 255 - bit_index / 8;
            self.0[byte_index] |= 1 << (bit_index % 8);
        }
    }

    /// Check if bloom might contain the input
    pub fn contains(&self, input: &[u8]) -> bool {
        let hash = keccak256(input);
        let hash_bytes = hash.as_bytes();

        (0..3).all(|i| {
            let bit_index = ((hash_bytes[i * 2] as usize) << 8 | hash_bytes[i * 2 + 1] as usize) & 0x7FF;
            self.0[255 - bit_index / 8] & (1 << (bit_index % 8)) != 0
        })
    }

    /// Combine with another bloom filter (OR)
    pub fn accrue_bloom(&mut self, other: &Bloom) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a |= b;
        }
    }

    /// Hex string with `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bloom({})", self.to_hex())
    }
}

impl Serialize for Bloom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Bloom {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(D::Error::custom)?;
        let bytes: [u8; 256] = raw
            .try_into()
            .map_err(|v: Vec<u8>| D::Error::custom(format!("bloom must be 256 bytes, got {}", v.len())))?;
        Ok(Bloom(bytes))
    }
}

impl Encodable for Bloom {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.append(&self.0.to_vec());
    }
}

/// Log entry emitted during transaction execution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics
    #[serde(default)]
    pub topics: Vec<H256>,
    /// Log data
    #[serde(default)]
    pub data: Bytes,
}

impl Log {
    /// Bloom of this log alone
    pub fn bloom(&self) -> Bloom {
        let mut bloom = Bloom::default();
        bloom.accrue(self.address.as_bytes());
        for topic in &self.topics {
            bloom.accrue(topic.as_bytes());
        }
        bloom
    }
}

impl Encodable for Log {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.address);
        s.append_list::<H256, H256>(&self.topics);
        s.append(&self.data);
    }
}

/// keccak256 of the RLP list of `logs`
pub fn logs_hash(logs: &[Log]) -> H256 {
    let mut s = RlpStream::new();
    s.append_list::<Log, Log>(logs);
    keccak256(&s.out())
}

/// Union of the blooms of `logs`
pub fn logs_bloom<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Bloom {
    let mut bloom = Bloom::default();
    for log in logs {
        bloom.accrue_bloom(&log.bloom());
    }
    bloom
}

/// Receipt as reported by a transition tool.
///
/// Parsing is lenient: fields the tool omits or sets to `null` take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Transaction type, absent for legacy
    #[serde(rename = "type", with = "opt_padded_u64", default)]
    pub tx_type: Option<u64>,
    /// Pre-Byzantium intermediate state root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Bytes>,
    /// 1 on success, 0 on failure
    #[serde(with = "opt_padded_u64", default)]
    pub status: Option<u64>,
    /// Gas used by the block up to and including this transaction
    #[serde(with = "padded_u64", default)]
    pub cumulative_gas_used: u64,
    /// Gas used by this transaction
    #[serde(with = "padded_u64", default)]
    pub gas_used: u64,
    /// Bloom over the logs
    #[serde(default)]
    pub logs_bloom: Bloom,
    /// Emitted logs
    #[serde(default)]
    pub logs: Option<Vec<Log>>,
    /// Hash of the transaction
    #[serde(default)]
    pub transaction_hash: H256,
    /// Created contract, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
    /// Blob gas used by this transaction
    #[serde(with = "opt_padded_u64", default, skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<u64>,
}

impl Receipt {
    /// Emitted logs, empty when the tool reported none
    pub fn logs(&self) -> &[Log] {
        self.logs.as_deref().unwrap_or(&[])
    }

    /// Whether execution succeeded
    pub fn succeeded(&self) -> bool {
        self.status == Some(1)
    }

    /// Consensus encoding: `type || rlp([status, cumulative, bloom, logs])`
    pub fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(4);
        match &self.root {
            Some(root) if !root.is_empty() => {
                s.append(root);
            }
            _ => {
                s.append(&self.status.unwrap_or(0));
            }
        }
        s.append(&self.cumulative_gas_used);
        s.append(&self.logs_bloom);
        s.append_list::<Log, Log>(self.logs());
        let body = s.out().to_vec();
        match self.tx_type {
            Some(tx_type) if tx_type != 0 => {
                let mut out = Vec::with_capacity(body.len() + 1);
                out.push(tx_type as u8);
                out.extend_from_slice(&body);
                out
            }
            _ => body,
        }
    }
}

/// Root of the receipts trie
pub fn receipts_root(receipts: &[Receipt]) -> H256 {
    ordered_trie_root(receipts.iter().map(Receipt::encode))
}

/// Receipt fields a test expects. Unset fields are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Expected gas used
    #[serde(with = "opt_padded_u64", default, skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<u64>,
    /// Expected cumulative gas used
    #[serde(with = "opt_padded_u64", default, skip_serializing_if = "Option::is_none")]
    pub cumulative_gas_used: Option<u64>,
    /// Expected status
    #[serde(with = "opt_padded_u64", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u64>,
    /// Expected logs bloom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_bloom: Option<Bloom>,
    /// Expected created contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<Address>,
}

impl TransactionReceipt {
    /// Compare against a tool receipt, reporting the first differing field
    pub fn check(&self, actual: &Receipt) -> Result<(), ReceiptMismatch> {
        fn cmp<T: PartialEq + fmt::Debug>(
            field: &'static str,
            expected: &Option<T>,
            actual: &T,
        ) -> Result<(), ReceiptMismatch> {
            match expected {
                Some(e) if e != actual => Err(ReceiptMismatch {
                    field,
                    expected: format!("{:?}", e),
                    actual: format!("{:?}", actual),
                }),
                _ => Ok(()),
            }
        }
        cmp("gasUsed", &self.gas_used, &actual.gas_used)?;
        cmp("cumulativeGasUsed", &self.cumulative_gas_used, &actual.cumulative_gas_used)?;
        cmp("status", &self.status, &actual.status.unwrap_or(0))?;
        cmp("logsBloom", &self.logs_bloom, &actual.logs_bloom)?;
        match (&self.contract_address, &actual.contract_address) {
            (Some(expected), Some(found)) if expected != found => Err(ReceiptMismatch {
                field: "contractAddress",
                expected: expected.to_hex(),
                actual: found.to_hex(),
            }),
            (Some(expected), None) => Err(ReceiptMismatch {
                field: "contractAddress",
                expected: expected.to_hex(),
                actual: "none".into(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_trie::EMPTY_TRIE_ROOT;

    // ==================== Bloom ====================

    #[test]
    fn test_bloom_accrue_and_contains() {
        let mut bloom = Bloom::default();
        assert!(bloom.is_empty());
        bloom.accrue(b"hello");
        assert!(!bloom.is_empty());
        assert!(bloom.contains(b"hello"));
    }

    #[test]
    fn test_bloom_json() {
        let log = Log {
            address: Address::from_low_u64(1),
            topics: vec![H256::from_low_u64(2)],
            data: Bytes::new(),
        };
        let bloom = log.bloom();
        let json = serde_json::to_string(&bloom).unwrap();
        assert_eq!(json.len(), 2 + 2 + 512);
        let back: Bloom = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bloom);
        assert!(serde_json::from_str::<Bloom>("\"0x00\"").is_err());
    }

    #[test]
    fn test_logs_bloom_is_union() {
        let a = Log { address: Address::from_low_u64(1), ..Default::default() };
        let b = Log { address: Address::from_low_u64(2), ..Default::default() };
        let bloom = logs_bloom([&a, &b]);
        assert!(bloom.contains(a.address.as_bytes()));
        assert!(bloom.contains(b.address.as_bytes()));
    }

    // ==================== Receipt ====================

    #[test]
    fn test_empty_logs_hash() {
        // keccak256(0xc0)
        assert_eq!(
            logs_hash(&[]).to_hex(),
            "0x1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
        );
    }

    #[test]
    fn test_parse_tool_receipt() {
        let receipt: Receipt = serde_json::from_str(
            r#"{
                "type": "0x2",
                "root": "0x",
                "status": "0x1",
                "cumulativeGasUsed": "0x5208",
                "logsBloom": "0x00000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000",
                "logs": null,
                "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000001",
                "contractAddress": "0x0000000000000000000000000000000000000000",
                "gasUsed": "0x5208",
                "effectiveGasPrice": null,
                "blockHash": "0x0000000000000000000000000000000000000000000000000000000000000000",
                "transactionIndex": "0x0"
            }"#,
        )
        .unwrap();
        assert!(receipt.succeeded());
        assert_eq!(receipt.gas_used, 21000);
        assert!(receipt.logs().is_empty());

        let encoded = receipt.encode();
        assert_eq!(encoded[0], 0x02);
        let item = fixgen_rlp::decode(&encoded[1..]).unwrap();
        let fields = item.as_list().unwrap();
        assert_eq!(fields[0].as_u64().unwrap(), 1);
        assert_eq!(fields[1].as_u64().unwrap(), 21000);
        assert_eq!(fields[2].as_bytes().unwrap().len(), 256);
        assert!(fields[3].as_list().unwrap().is_empty());
        assert_ne!(receipts_root(&[receipt]), EMPTY_TRIE_ROOT);
    }

    #[test]
    fn test_legacy_receipt_has_no_prefix() {
        let receipt = Receipt { status: Some(1), ..Default::default() };
        assert!(receipt.encode()[0] >= 0xc0);
    }

    #[test]
    fn test_receipt_expectation() {
        let actual = Receipt {
            status: Some(1),
            gas_used: 21000,
            cumulative_gas_used: 21000,
            ..Default::default()
        };
        let ok = TransactionReceipt { gas_used: Some(21000), ..Default::default() };
        assert!(ok.check(&actual).is_ok());

        let bad = TransactionReceipt { status: Some(0), ..Default::default() };
        let err = bad.check(&actual).unwrap_err();
        assert_eq!(err.field, "status");
    }
}
