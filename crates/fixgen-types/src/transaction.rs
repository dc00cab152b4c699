//! Transactions: type inference, signing and consensus encoding

use crate::error::{TypesError, TypesResult};
use crate::receipt::TransactionReceipt;
use fixgen_crypto::{
    keccak256, private_key_from_h256, private_key_to_address, recover_address, sign, Signature,
};
use fixgen_exceptions::ExceptionList;
use fixgen_forks::{intrinsic_gas, Fork, ForkResult, IntrinsicGasInput};
use fixgen_primitives::serde_hex::{opt_padded_u256, opt_padded_u64, padded_u256, padded_u64};
use fixgen_primitives::{Address, Bytes, H256, U256};
use fixgen_rlp::{Encodable, RlpStream};
use serde::{Deserialize, Serialize};

/// Key that signs transactions which name none
pub const DEFAULT_SECRET_KEY: H256 = H256::from_bytes([
    0x45, 0xa9, 0x15, 0xe4, 0xd0, 0x60, 0x14, 0x9e, 0xb4, 0x36, 0x59, 0x60, 0xe6, 0xa7, 0xa4, 0x5f,
    0x33, 0x43, 0x93, 0x09, 0x30, 0x61, 0x11, 0x6b, 0x19, 0x7e, 0x32, 0x40, 0x06, 0x5f, 0xf2, 0xd8,
]);

/// Recipient of transactions which name none
pub const DEFAULT_RECIPIENT: Address = Address::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xaa,
]);

/// Default gas limit
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;
/// Default legacy gas price
pub const DEFAULT_GAS_PRICE: u64 = 10;
/// Default EIP-1559 fee cap
pub const DEFAULT_MAX_FEE_PER_GAS: u64 = 7;
/// Default blob fee cap
pub const DEFAULT_MAX_FEE_PER_BLOB_GAS: u64 = 1;

const SET_CODE_MAGIC: u8 = 0x05;

/// One access list entry (EIP-2930)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    /// Warm address
    pub address: Address,
    /// Warm storage keys of `address`
    #[serde(default)]
    pub storage_keys: Vec<H256>,
}

impl Encodable for AccessListEntry {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.address);
        s.append_list::<H256, H256>(&self.storage_keys);
    }
}

/// Set-code authorization tuple (EIP-7702)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Authorization {
    /// Chain the authorization is valid on, zero for any
    #[serde(with = "padded_u256")]
    pub chain_id: U256,
    /// Code delegation target
    pub address: Address,
    /// Authority nonce
    #[serde(with = "padded_u64")]
    pub nonce: u64,
    /// Signature y-parity
    #[serde(with = "opt_padded_u256", alias = "yParity", skip_serializing_if = "Option::is_none")]
    pub v: Option<U256>,
    /// Signature r
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub r: Option<U256>,
    /// Signature s
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub s: Option<U256>,
    /// Key of the authority, used when no signature is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<H256>,
}

impl Authorization {
    /// Hash the authority signs: `keccak256(0x05 || rlp([chain_id, address, nonce]))`
    pub fn signing_hash(&self) -> H256 {
        let mut s = RlpStream::new_list(3);
        s.append(&self.chain_id);
        s.append(&self.address);
        s.append(&self.nonce);
        let mut payload = vec![SET_CODE_MAGIC];
        payload.extend_from_slice(&s.out());
        keccak256(&payload)
    }

    /// Fill the signature from `secret_key` unless one is present
    pub fn sign(mut self) -> TypesResult<Self> {
        if self.r.is_some() && self.s.is_some() {
            return Ok(self);
        }
        let secret = self.secret_key.ok_or_else(|| {
            TypesError::InvalidTransaction("authorization has neither signature nor secret key".into())
        })?;
        let signature = sign(&self.signing_hash(), &private_key_from_h256(&secret)?)?;
        self.v = Some(U256::from(signature.y_parity));
        self.r = Some(signature.r_value());
        self.s = Some(signature.s_value());
        Ok(self)
    }

    /// Account that granted the authorization
    pub fn authority(&self) -> TypesResult<Address> {
        if let Some(secret) = &self.secret_key {
            return Ok(private_key_to_address(&private_key_from_h256(secret)?));
        }
        let signature = signature_from(self.v, self.r, self.s, Some)?;
        Ok(recover_address(&self.signing_hash(), &signature)?)
    }
}

impl Encodable for Authorization {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(6);
        s.append(&self.chain_id);
        s.append(&self.address);
        s.append(&self.nonce);
        s.append(&self.v.unwrap_or_default());
        s.append(&self.r.unwrap_or_default());
        s.append(&self.s.unwrap_or_default());
    }
}

fn default_to() -> Option<Address> {
    Some(DEFAULT_RECIPIENT)
}

/// A transaction as written in a test, before or after signing.
///
/// Unset fields take the defaults of the inferred type. The recipient
/// defaults to `0x…aa`; an explicit `null` makes a contract creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    /// Explicit type, inferred from populated fields when unset
    #[serde(rename = "type", with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub ty: Option<u64>,
    /// Chain id
    #[serde(with = "padded_u64")]
    pub chain_id: u64,
    /// Sender nonce
    #[serde(with = "padded_u64")]
    pub nonce: u64,
    /// Legacy gas price
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    /// EIP-1559 tip cap
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<u64>,
    /// EIP-1559 fee cap
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<u64>,
    /// Gas limit
    #[serde(with = "padded_u64", alias = "gas")]
    pub gas_limit: u64,
    /// Recipient, `None` for contract creation
    #[serde(default = "default_to")]
    pub to: Option<Address>,
    /// Transferred value
    #[serde(with = "padded_u256")]
    pub value: U256,
    /// Call data or init code
    #[serde(alias = "input")]
    pub data: Bytes,
    /// EIP-2930 access list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListEntry>>,
    /// EIP-4844 blob fee cap
    #[serde(with = "opt_padded_u64", skip_serializing_if = "Option::is_none")]
    pub max_fee_per_blob_gas: Option<u64>,
    /// EIP-4844 blob hashes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_versioned_hashes: Option<Vec<H256>>,
    /// EIP-7702 authorizations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_list: Option<Vec<Authorization>>,
    /// Signature v, or y-parity for typed transactions
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub v: Option<U256>,
    /// Signature r
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub r: Option<U256>,
    /// Signature s
    #[serde(with = "opt_padded_u256", skip_serializing_if = "Option::is_none")]
    pub s: Option<U256>,
    /// Signing key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<H256>,
    /// Legacy only: sign with EIP-155 replay protection
    pub protected: bool,
    /// Exceptions the transaction is expected to fail with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExceptionList>,
    /// Receipt fields to check after execution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_receipt: Option<TransactionReceipt>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            ty: None,
            chain_id: 1,
            nonce: 0,
            gas_price: None,
            max_priority_fee_per_gas: None,
            max_fee_per_gas: None,
            gas_limit: DEFAULT_GAS_LIMIT,
            to: Some(DEFAULT_RECIPIENT),
            value: U256::zero(),
            data: Bytes::new(),
            access_list: None,
            max_fee_per_blob_gas: None,
            blob_versioned_hashes: None,
            authorization_list: None,
            v: None,
            r: None,
            s: None,
            secret_key: Some(DEFAULT_SECRET_KEY),
            protected: true,
            error: None,
            expected_receipt: None,
        }
    }
}

impl Transaction {
    /// Type byte, explicit or inferred from the populated fields
    pub fn tx_type(&self) -> u8 {
        if let Some(ty) = self.ty {
            // out-of-range types are rejected by `payload_len`
            return u8::try_from(ty).unwrap_or(u8::MAX);
        }
        if self.authorization_list.is_some() {
            4
        } else if self.max_fee_per_blob_gas.is_some() || self.blob_versioned_hashes.is_some() {
            3
        } else if self.max_fee_per_gas.is_some() || self.max_priority_fee_per_gas.is_some() {
            2
        } else if self.access_list.is_some() {
            1
        } else {
            0
        }
    }

    /// Pin the type and fill the fee and list fields it needs
    pub fn with_defaults(mut self) -> Self {
        let ty = self.tx_type();
        self.ty.get_or_insert(u64::from(ty));
        if ty < 2 {
            self.gas_price.get_or_insert(DEFAULT_GAS_PRICE);
        } else {
            self.max_fee_per_gas.get_or_insert(DEFAULT_MAX_FEE_PER_GAS);
            self.max_priority_fee_per_gas.get_or_insert(0);
        }
        if ty >= 1 {
            self.access_list.get_or_insert_with(Vec::new);
        }
        if ty == 3 {
            self.max_fee_per_blob_gas.get_or_insert(DEFAULT_MAX_FEE_PER_BLOB_GAS);
            self.blob_versioned_hashes.get_or_insert_with(Vec::new);
        }
        if ty == 4 {
            self.authorization_list.get_or_insert_with(Vec::new);
        }
        self
    }

    /// Whether the transaction deploys a contract
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none()
    }

    /// Whether a failure is expected
    pub fn expects_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Check the type against `fork`
    pub fn check_fork(&self, fork: Fork) -> ForkResult<()> {
        fork.check_tx_type(self.tx_type())
    }

    /// Gas charged before execution under `fork`
    pub fn intrinsic_gas(&self, fork: Fork) -> u64 {
        let access_list = self.access_list.as_deref().unwrap_or(&[]);
        intrinsic_gas(
            fork,
            &IntrinsicGasInput {
                data: &self.data,
                contract_creation: self.is_contract_creation(),
                access_list_addresses: access_list.len() as u64,
                access_list_storage_keys: access_list
                    .iter()
                    .map(|e| e.storage_keys.len() as u64)
                    .sum(),
                authorizations: self.authorization_list.as_ref().map_or(0, |l| l.len() as u64),
            },
        )
    }

    /// Blob gas consumed by the attached blobs
    pub fn blob_gas(&self, fork: Fork) -> u64 {
        fork.blob_gas_per_blob() * self.blob_versioned_hashes.as_ref().map_or(0, |h| h.len() as u64)
    }

    /// Fill defaults and sign with `secret_key` unless a signature is present.
    /// Unsigned authorizations are signed too.
    pub fn sign(self) -> TypesResult<Self> {
        let mut tx = self.with_defaults();
        if let Some(list) = tx.authorization_list.take() {
            tx.authorization_list = Some(
                list.into_iter()
                    .map(Authorization::sign)
                    .collect::<TypesResult<Vec<_>>>()?,
            );
        }
        if tx.r.is_some() && tx.s.is_some() && tx.v.is_some() {
            return Ok(tx);
        }
        let secret = tx.secret_key.ok_or_else(|| {
            TypesError::InvalidTransaction("no signature and no secret key".into())
        })?;
        let signature = sign(&tx.signing_hash()?, &private_key_from_h256(&secret)?)?;
        let y = U256::from(signature.y_parity);
        // EIP-155 v is unbounded in the chain id, so it is built in 256 bits
        tx.v = Some(match (tx.tx_type(), tx.protected) {
            (0, true) => y + U256::from(35u64) + U256::from(tx.chain_id) * U256::from(2u64),
            (0, false) => y + U256::from(27u64),
            _ => y,
        });
        tx.r = Some(signature.r_value());
        tx.s = Some(signature.s_value());
        Ok(tx)
    }

    /// Hash the sender signs
    pub fn signing_hash(&self) -> TypesResult<H256> {
        let ty = self.tx_type();
        let fields = self.payload_len(ty)?;
        let bytes = if ty == 0 {
            if self.protected {
                let mut s = RlpStream::new_list(fields + 3);
                self.append_payload(&mut s, ty);
                s.append(&self.chain_id);
                s.append(&0u8);
                s.append(&0u8);
                s.out().to_vec()
            } else {
                let mut s = RlpStream::new_list(fields);
                self.append_payload(&mut s, ty);
                s.out().to_vec()
            }
        } else {
            let mut s = RlpStream::new_list(fields);
            self.append_payload(&mut s, ty);
            let mut out = vec![ty];
            out.extend_from_slice(&s.out());
            out
        };
        Ok(keccak256(&bytes))
    }

    /// Network encoding: legacy RLP list or `type || rlp(...)`
    pub fn encode(&self) -> TypesResult<Vec<u8>> {
        let ty = self.tx_type();
        let mut s = RlpStream::new_list(self.payload_len(ty)? + 3);
        self.append_payload(&mut s, ty);
        s.append(&self.v.unwrap_or_default());
        s.append(&self.r.unwrap_or_default());
        s.append(&self.s.unwrap_or_default());
        let body = s.out().to_vec();
        if ty == 0 {
            return Ok(body);
        }
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(ty);
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Transaction hash
    pub fn hash(&self) -> TypesResult<H256> {
        Ok(keccak256(&self.encode()?))
    }

    /// Append as a block body element: legacy inline, typed as a byte string
    pub fn rlp_append_in_block(&self, s: &mut RlpStream) -> TypesResult<()> {
        let encoded = self.encode()?;
        if self.tx_type() == 0 {
            s.append_raw(&encoded, 1);
        } else {
            s.append(&encoded);
        }
        Ok(())
    }

    /// Sender address, from the secret key or recovered from the signature
    pub fn sender(&self) -> TypesResult<Address> {
        if let Some(secret) = &self.secret_key {
            return Ok(private_key_to_address(&private_key_from_h256(secret)?));
        }
        let ty = self.tx_type();
        let eip155_offset = U256::from(self.chain_id) * U256::from(2u64) + U256::from(35u64);
        let signature = signature_from(self.v, self.r, self.s, |v| {
            if ty != 0 {
                Some(v)
            } else if v == U256::from(27u64) || v == U256::from(28u64) {
                Some(v - U256::from(27u64))
            } else {
                v.checked_sub(eip155_offset)
            }
        })?;
        Ok(recover_address(&self.signing_hash()?, &signature)?)
    }

    fn payload_len(&self, ty: u8) -> TypesResult<usize> {
        if let Some(explicit) = self.ty.filter(|t| *t > u64::from(u8::MAX)) {
            return Err(TypesError::InvalidTransaction(format!("unknown type {}", explicit)));
        }
        let needs_to = matches!(ty, 3 | 4);
        if needs_to && self.to.is_none() {
            return Err(TypesError::InvalidTransaction(format!(
                "type {} transaction cannot create a contract",
                ty
            )));
        }
        match ty {
            0 => Ok(6),
            1 => Ok(8),
            2 => Ok(9),
            3 => Ok(11),
            4 => Ok(10),
            other => Err(TypesError::InvalidTransaction(format!("unknown type {}", other))),
        }
    }

    fn append_payload(&self, s: &mut RlpStream, ty: u8) {
        let access_list = self.access_list.as_deref().unwrap_or(&[]);
        if ty != 0 {
            s.append(&self.chain_id);
        }
        s.append(&self.nonce);
        if ty < 2 {
            s.append(&self.gas_price.unwrap_or(DEFAULT_GAS_PRICE));
        } else {
            s.append(&self.max_priority_fee_per_gas.unwrap_or(0));
            s.append(&self.max_fee_per_gas.unwrap_or(DEFAULT_MAX_FEE_PER_GAS));
        }
        s.append(&self.gas_limit);
        match &self.to {
            Some(to) => s.append(to),
            None => s.append_empty_data(),
        };
        s.append(&self.value);
        s.append(&self.data);
        if ty >= 1 {
            s.append_list::<AccessListEntry, AccessListEntry>(access_list);
        }
        if ty == 3 {
            s.append(&self.max_fee_per_blob_gas.unwrap_or(DEFAULT_MAX_FEE_PER_BLOB_GAS));
            s.append_list::<H256, H256>(self.blob_versioned_hashes.as_deref().unwrap_or(&[]));
        }
        if ty == 4 {
            s.append_list::<Authorization, Authorization>(
                self.authorization_list.as_deref().unwrap_or(&[]),
            );
        }
    }
}

fn signature_from(
    v: Option<U256>,
    r: Option<U256>,
    s: Option<U256>,
    parity: impl Fn(U256) -> Option<U256>,
) -> TypesResult<Signature> {
    let (Some(v), Some(r), Some(s)) = (v, r, s) else {
        return Err(TypesError::InvalidTransaction("missing signature".into()));
    };
    let y = parity(v)
        .filter(|y| *y <= U256::one())
        .ok_or_else(|| TypesError::InvalidTransaction(format!("invalid v {}", v)))?;
    Ok(Signature::from_components(r, s, y.low_u64() as u8))
}
