//! Block headers and their build states.
//!
//! A header moves through three states and each transition consumes the
//! previous one:
//!
//! ```text
//! PendingHeader --validate(fork)--> ValidatedHeader --freeze--> FrozenHeader
//!       ^                                                            |
//!       +------------------------ apply(patch) ----------------------+
//! ```
//!
//! Only a [`FrozenHeader`] exposes RLP and hash, so neither can go stale.

use crate::error::{BlockError, BlockResult};
use crate::patch::HeaderPatch;
use fixgen_crypto::keccak256;
use fixgen_forks::{Fork, HeaderField, Requirement};
use fixgen_primitives::serde_hex::{opt_padded_u64, padded_u256, padded_u64};
use fixgen_primitives::{Address, Bytes, H256, U256};
use fixgen_rlp::RlpStream;
use fixgen_types::Bloom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// keccak256 of the RLP of an empty list
pub const EMPTY_OMMERS_HASH: H256 = H256::from_bytes([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a,
    0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13,
    0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
]);

/// Header field values. Fork-gated fields are `None` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Parent block hash
    pub parent_hash: H256,
    /// Ommers hash
    #[serde(rename = "uncleHash")]
    pub ommers_hash: H256,
    /// Block coinbase
    #[serde(rename = "coinbase")]
    pub fee_recipient: Address,
    /// State root
    pub state_root: H256,
    /// Transactions trie root
    #[serde(rename = "transactionsTrie")]
    pub transactions_root: H256,
    /// Receipts trie root
    #[serde(rename = "receiptTrie")]
    pub receipts_root: H256,
    /// Logs bloom
    #[serde(rename = "bloom")]
    pub logs_bloom: Bloom,
    /// Difficulty, zero after the merge
    #[serde(with = "padded_u256")]
    pub difficulty: U256,
    /// Block number
    #[serde(with = "padded_u64")]
    pub number: u64,
    /// Gas limit
    #[serde(with = "padded_u64")]
    pub gas_limit: u64,
    /// Gas used
    #[serde(with = "padded_u64")]
    pub gas_used: u64,
    /// Timestamp
    #[serde(with = "padded_u64")]
    pub timestamp: u64,
    /// Extra data
    pub extra_data: Bytes,
    /// PoW mix digest or prev-randao
    pub mix_hash: H256,
    /// PoW nonce
    #[serde(with = "nonce_hex")]
    pub nonce: u64,
    /// EIP-1559 base fee
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<u64>,
    /// EIP-4895 withdrawals root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals_root: Option<H256>,
    /// EIP-4844 blob gas used
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub blob_gas_used: Option<u64>,
    /// EIP-4844 excess blob gas
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub excess_blob_gas: Option<u64>,
    /// EIP-4788 parent beacon block root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_beacon_block_root: Option<H256>,
    /// EIP-7685 requests hash
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_hash: Option<H256>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: H256::ZERO,
            ommers_hash: EMPTY_OMMERS_HASH,
            fee_recipient: Address::ZERO,
            state_root: H256::ZERO,
            transactions_root: fixgen_trie::EMPTY_TRIE_ROOT,
            receipts_root: fixgen_trie::EMPTY_TRIE_ROOT,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::zero(),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: H256::ZERO,
            nonce: 0,
            base_fee_per_gas: None,
            withdrawals_root: None,
            blob_gas_used: None,
            excess_blob_gas: None,
            parent_beacon_block_root: None,
            requests_hash: None,
        }
    }
}

impl Header {
    /// Presence of a fork-gated field, `None` for fields every header carries
    pub fn has(&self, field: HeaderField) -> Option<bool> {
        Some(match field {
            HeaderField::BaseFee => self.base_fee_per_gas.is_some(),
            HeaderField::WithdrawalsRoot => self.withdrawals_root.is_some(),
            HeaderField::BlobGasUsed => self.blob_gas_used.is_some(),
            HeaderField::ExcessBlobGas => self.excess_blob_gas.is_some(),
            HeaderField::ParentBeaconBlockRoot => self.parent_beacon_block_root.is_some(),
            HeaderField::RequestsHash => self.requests_hash.is_some(),
            _ => return None,
        })
    }

    fn clear(&mut self, field: HeaderField) {
        match field {
            HeaderField::BaseFee => self.base_fee_per_gas = None,
            HeaderField::WithdrawalsRoot => self.withdrawals_root = None,
            HeaderField::BlobGasUsed => self.blob_gas_used = None,
            HeaderField::ExcessBlobGas => self.excess_blob_gas = None,
            HeaderField::ParentBeaconBlockRoot => self.parent_beacon_block_root = None,
            HeaderField::RequestsHash => self.requests_hash = None,
            _ => {}
        }
    }

    /// RLP of the present fields in canonical order
    pub fn encode(&self) -> Vec<u8> {
        let optional = [
            self.base_fee_per_gas.is_some(),
            self.withdrawals_root.is_some(),
            self.blob_gas_used.is_some(),
            self.excess_blob_gas.is_some(),
            self.parent_beacon_block_root.is_some(),
            self.requests_hash.is_some(),
        ];
        let mut s = RlpStream::new_list(15 + optional.iter().filter(|p| **p).count());
        s.append(&self.parent_hash);
        s.append(&self.ommers_hash);
        s.append(&self.fee_recipient);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.receipts_root);
        s.append(&self.logs_bloom);
        s.append(&self.difficulty);
        s.append(&self.number);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra_data);
        s.append(&self.mix_hash);
        s.append(&self.nonce.to_be_bytes().to_vec());
        if let Some(v) = &self.base_fee_per_gas {
            s.append(v);
        }
        if let Some(v) = &self.withdrawals_root {
            s.append(v);
        }
        if let Some(v) = &self.blob_gas_used {
            s.append(v);
        }
        if let Some(v) = &self.excess_blob_gas {
            s.append(v);
        }
        if let Some(v) = &self.parent_beacon_block_root {
            s.append(v);
        }
        if let Some(v) = &self.requests_hash {
            s.append(v);
        }
        s.out().to_vec()
    }

    /// keccak256 of [`Header::encode`]
    pub fn hash(&self) -> H256 {
        keccak256(&self.encode())
    }
}

/// Header whose fields have not been checked against a fork
#[derive(Debug, Clone)]
pub struct PendingHeader {
    header: Header,
    exempt: BTreeSet<HeaderField>,
}

impl PendingHeader {
    /// Start from field values
    pub fn new(header: Header) -> Self {
        Self {
            header,
            exempt: BTreeSet::new(),
        }
    }

    /// Check every fork-gated field.
    ///
    /// A missing required field fails. A forbidden field is dropped, or fails
    /// when `strict` is set. Fields touched by a patch are not checked.
    pub fn validate(mut self, fork: Fork, strict: bool) -> BlockResult<ValidatedHeader> {
        for field in HeaderField::ALL {
            if self.exempt.contains(&field) {
                continue;
            }
            let Some(present) = self.header.has(field) else {
                continue;
            };
            match (fork.header_requirement(field), present) {
                (Requirement::Required, false) => {
                    return Err(BlockError::MissingRequiredField { field, fork });
                }
                (Requirement::Forbidden, true) if strict => {
                    return Err(BlockError::ForbiddenField { field, fork });
                }
                (Requirement::Forbidden, true) => {
                    tracing::debug!(%field, %fork, "dropping header field the fork forbids");
                    self.header.clear(field);
                }
                _ => {}
            }
        }
        Ok(ValidatedHeader {
            header: self.header,
            fork,
        })
    }
}

/// Header checked against its fork
#[derive(Debug, Clone)]
pub struct ValidatedHeader {
    header: Header,
    fork: Fork,
}

impl ValidatedHeader {
    /// Field values
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Compute RLP and hash
    pub fn freeze(self) -> FrozenHeader {
        let rlp = self.header.encode();
        FrozenHeader {
            hash: keccak256(&rlp),
            rlp,
            header: self.header,
            fork: self.fork,
        }
    }
}

/// Header with its RLP and hash fixed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenHeader {
    header: Header,
    fork: Fork,
    rlp: Vec<u8>,
    hash: H256,
}

impl FrozenHeader {
    /// Validate and freeze in one step
    pub fn build(header: Header, fork: Fork, strict: bool) -> BlockResult<Self> {
        Ok(PendingHeader::new(header).validate(fork, strict)?.freeze())
    }

    /// Field values
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Fork the header was validated for
    pub fn fork(&self) -> Fork {
        self.fork
    }

    /// Encoded header
    pub fn rlp(&self) -> &[u8] {
        &self.rlp
    }

    /// Block hash
    pub fn hash(&self) -> H256 {
        self.hash
    }

    /// Give up the frozen state
    pub fn into_header(self) -> Header {
        self.header
    }

    /// Apply `patch`, re-validate the fields it did not touch and re-freeze
    pub fn apply(self, patch: &HeaderPatch, strict: bool) -> BlockResult<FrozenHeader> {
        if patch.is_empty() {
            return Ok(self);
        }
        let (header, touched) = patch.apply_to(&self.header)?;
        let pending = PendingHeader {
            header,
            exempt: touched,
        };
        Ok(pending.validate(self.fork, strict)?.freeze())
    }

    /// Fixture rendering with the hash attached
    pub fn to_fixture(&self) -> FixtureHeader {
        FixtureHeader {
            header: self.header.clone(),
            hash: self.hash,
        }
    }
}

/// Header as written in fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureHeader {
    /// Field values
    #[serde(flatten)]
    pub header: Header,
    /// Block hash
    pub hash: H256,
}

impl FixtureHeader {
    /// Whether `hash` matches the fields
    pub fn hash_matches(&self) -> bool {
        self.header.hash() == self.hash
    }
}

/// The nonce is rendered as its full 8 bytes
mod nonce_hex {
    use fixgen_primitives::number::parse_u64;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{:016x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let s = String::deserialize(d)?;
        parse_u64(&s).map_err(D::Error::custom)
    }
}
