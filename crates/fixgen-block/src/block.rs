//! Blocks and their fixture renderings

use crate::error::BlockResult;
use crate::header::{FixtureHeader, FrozenHeader, Header};
use fixgen_crypto::keccak256;
use fixgen_exceptions::ExceptionList;
use fixgen_primitives::serde_hex::{opt_padded_u64, padded_u256, padded_u64};
use fixgen_primitives::{Address, Bytes, H256, U256};
use fixgen_rlp::{Item, RlpResult, RlpStream};
use fixgen_types::{AccessListEntry, Authorization, Transaction, Withdrawal};
use serde::{Deserialize, Serialize};

/// A block with a frozen header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Header
    pub header: FrozenHeader,
    /// Included transactions, signed
    pub transactions: Vec<Transaction>,
    /// Ommer headers
    pub ommers: Vec<Header>,
    /// Withdrawals, present from Shanghai on
    pub withdrawals: Option<Vec<Withdrawal>>,
}

impl Block {
    /// Block RLP: `[header, transactions, ommers, withdrawals?]`
    pub fn rlp(&self) -> BlockResult<Vec<u8>> {
        let mut s = RlpStream::new_list(3 + usize::from(self.withdrawals.is_some()));
        s.append_raw(self.header.rlp(), 1);

        s.begin_list(self.transactions.len());
        for tx in &self.transactions {
            tx.rlp_append_in_block(&mut s)?;
        }

        s.begin_list(self.ommers.len());
        for ommer in &self.ommers {
            s.append_raw(&ommer.encode(), 1);
        }

        if let Some(withdrawals) = &self.withdrawals {
            s.append_list::<Withdrawal, Withdrawal>(withdrawals);
        }
        Ok(s.out().to_vec())
    }

    /// Block hash
    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    /// Body as written in fixtures
    pub fn fixture_body(&self) -> BlockResult<FixtureBlockBody> {
        Ok(FixtureBlockBody {
            block_header: self.header.to_fixture(),
            transactions: self
                .transactions
                .iter()
                .map(FixtureTransaction::from_signed)
                .collect::<BlockResult<_>>()?,
            uncle_headers: self
                .ommers
                .iter()
                .map(|h| FixtureHeader {
                    header: h.clone(),
                    hash: h.hash(),
                })
                .collect(),
            withdrawals: self.withdrawals.clone(),
        })
    }

    /// Valid block entry
    pub fn to_fixture(&self) -> BlockResult<FixtureBlock> {
        Ok(FixtureBlock {
            rlp: Bytes::from(self.rlp()?),
            body: self.fixture_body()?,
            block_number: self.header.header().number.to_string(),
        })
    }

    /// Invalid block entry expecting `exceptions`
    pub fn to_invalid_fixture(&self, exceptions: ExceptionList) -> BlockResult<InvalidFixtureBlock> {
        Ok(InvalidFixtureBlock {
            rlp: Bytes::from(self.rlp()?),
            expect_exception: exceptions,
            rlp_decoded: Some(self.fixture_body()?),
        })
    }
}

/// Signed transaction as written in fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureTransaction {
    /// Type byte
    #[serde(rename = "type", with = "padded_u64")]
    pub ty: u64,
    /// Chain id
    #[serde(with = "padded_u64")]
    pub chain_id: u64,
    /// Sender nonce
    #[serde(with = "padded_u64")]
    pub nonce: u64,
    /// Legacy gas price
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// Tip cap
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u64>,
    /// Fee cap
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u64>,
    /// Gas limit
    #[serde(with = "padded_u64")]
    pub gas_limit: u64,
    /// Recipient, `null` for contract creation
    pub to: Option<Address>,
    /// Transferred value
    #[serde(with = "padded_u256")]
    pub value: U256,
    /// Call data
    pub data: Bytes,
    /// Access list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListEntry>>,
    /// Blob fee cap
    #[serde(default, with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_blob_gas: Option<u64>,
    /// Blob hashes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_versioned_hashes: Option<Vec<H256>>,
    /// Signed authorizations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_list: Option<Vec<Authorization>>,
    /// Signature v
    #[serde(with = "padded_u256")]
    pub v: U256,
    /// Signature r
    #[serde(with = "padded_u256")]
    pub r: U256,
    /// Signature s
    #[serde(with = "padded_u256")]
    pub s: U256,
    /// Sender address
    pub sender: Address,
}

impl FixtureTransaction {
    /// Render a signed transaction. Keys and expectations are left out.
    pub fn from_signed(tx: &Transaction) -> BlockResult<Self> {
        let authorization_list = tx.authorization_list.as_ref().map(|list| {
            list.iter()
                .cloned()
                .map(|mut auth| {
                    auth.secret_key = None;
                    auth
                })
                .collect()
        });
        Ok(Self {
            ty: u64::from(tx.tx_type()),
            chain_id: tx.chain_id,
            nonce: tx.nonce,
            gas_price: tx.gas_price,
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
            max_fee_per_gas: tx.max_fee_per_gas,
            gas_limit: tx.gas_limit,
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            access_list: tx.access_list.clone(),
            max_fee_per_blob_gas: tx.max_fee_per_blob_gas,
            blob_versioned_hashes: tx.blob_versioned_hashes.clone(),
            authorization_list,
            v: tx.v.unwrap_or_default(),
            r: tx.r.unwrap_or_default(),
            s: tx.s.unwrap_or_default(),
            sender: tx.sender()?,
        })
    }
}

/// Decoded contents of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureBlockBody {
    /// Header
    pub block_header: FixtureHeader,
    /// Transactions
    pub transactions: Vec<FixtureTransaction>,
    /// Ommers
    pub uncle_headers: Vec<FixtureHeader>,
    /// Withdrawals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawals: Option<Vec<Withdrawal>>,
}

/// Valid block in a blockchain fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureBlock {
    /// Block RLP
    pub rlp: Bytes,
    /// Decoded contents
    #[serde(flatten)]
    pub body: FixtureBlockBody,
    /// Decimal block number
    #[serde(rename = "blocknumber")]
    pub block_number: String,
}

/// Block a client must reject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidFixtureBlock {
    /// Block RLP, possibly malformed
    pub rlp: Bytes,
    /// Accepted rejection reasons
    pub expect_exception: ExceptionList,
    /// Decoded contents, absent when the RLP is malformed
    #[serde(rename = "rlp_decoded", default, skip_serializing_if = "Option::is_none")]
    pub rlp_decoded: Option<FixtureBlockBody>,
}

/// One entry of a blockchain fixture's `blocks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureBlockEntry {
    /// Rejected block; tried first since only it carries `expectException`
    Invalid(InvalidFixtureBlock),
    /// Accepted block
    Valid(FixtureBlock),
}

impl FixtureBlockEntry {
    /// Block RLP
    pub fn rlp(&self) -> &Bytes {
        match self {
            FixtureBlockEntry::Invalid(b) => &b.rlp,
            FixtureBlockEntry::Valid(b) => &b.rlp,
        }
    }

    /// Whether a client must reject the block
    pub fn is_invalid(&self) -> bool {
        matches!(self, FixtureBlockEntry::Invalid(_))
    }
}

/// Hash of the header embedded in block RLP, decoded strictly
pub fn header_hash_from_block_rlp(rlp: &[u8]) -> RlpResult<H256> {
    let block = Item::decode(rlp)?;
    let fields = block.as_list()?;
    let header = fields.first().ok_or(fixgen_rlp::RlpError::ExpectedList)?;
    header.as_list()?;
    Ok(keccak256(&header.encode()))
}
