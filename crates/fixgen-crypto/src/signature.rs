//! ECDSA signature operations using secp256k1

use crate::{keccak256, CryptoError, CryptoResult};
use fixgen_primitives::{Address, H256, U256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use std::cmp::Ordering;

/// Half of the secp256k1 curve order (n/2)
const SECP256K1_N_DIV_2: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D,
    0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Full secp256k1 curve order (n)
const SECP256K1_N: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B,
    0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

/// Recoverable ECDSA signature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// recovery id, 0 or 1
    pub y_parity: u8,
}

impl Signature {
    /// Build from integer components.
    pub fn from_components(r: U256, s: U256, y_parity: u8) -> Self {
        let mut r_bytes = [0u8; 32];
        let mut s_bytes = [0u8; 32];
        r.to_big_endian(&mut r_bytes);
        s.to_big_endian(&mut s_bytes);
        Signature {
            r: r_bytes,
            s: s_bytes,
            y_parity,
        }
    }

    /// r as integer
    pub fn r_value(&self) -> U256 {
        U256::from_big_endian(&self.r)
    }

    /// s as integer
    pub fn s_value(&self) -> U256 {
        U256::from_big_endian(&self.s)
    }

    /// Check if signature has low-s value (EIP-2 compliant)
    pub fn is_low_s(&self) -> bool {
        compare_bytes(&self.s, &SECP256K1_N_DIV_2) != Ordering::Greater
    }
}

/// Compare two 32-byte arrays as big-endian integers
fn compare_bytes(a: &[u8; 32], b: &[u8; 32]) -> Ordering {
    a.iter().cmp(b.iter())
}

/// n - s, used for low-s normalization
fn subtract_from_n(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: u16 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_N[i] as u16)
            .wrapping_sub(s[i] as u16)
            .wrapping_sub(borrow);
        result[i] = diff as u8;
        borrow = if diff > 255 { 1 } else { 0 };
    }

    result
}

/// Load a private key from its 32-byte scalar.
pub fn private_key_from_h256(secret: &H256) -> CryptoResult<PrivateKey> {
    SigningKey::from_slice(secret.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Derive the account address controlled by `key`.
pub fn private_key_to_address(key: &PrivateKey) -> Address {
    public_key_to_address(key.verifying_key())
}

/// Derive Ethereum address from public key
pub fn public_key_to_address(public_key: &VerifyingKey) -> Address {
    // Uncompressed point is 0x04 || x || y
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}

/// Sign a prehashed message. Signing is deterministic (RFC 6979) and low-s.
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> CryptoResult<Signature> {
    let (signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let r_bytes: [u8; 32] = signature.r().to_bytes().into();
    let mut s_bytes: [u8; 32] = signature.s().to_bytes().into();

    // EIP-2: s > n/2 becomes n - s with the recovery id flipped
    if compare_bytes(&s_bytes, &SECP256K1_N_DIV_2) == Ordering::Greater {
        s_bytes = subtract_from_n(&s_bytes);
        recovery_id = RecoveryId::try_from(recovery_id.to_byte() ^ 1).map_err(|_| {
            CryptoError::SigningFailed("invalid recovery id after normalization".to_string())
        })?;
    }

    Ok(Signature {
        r: r_bytes,
        s: s_bytes,
        y_parity: recovery_id.to_byte(),
    })
}

/// Recover the signer address from a signature over `message_hash`.
pub fn recover_address(message_hash: &H256, signature: &Signature) -> CryptoResult<Address> {
    let r: k256::FieldBytes = signature.r.into();
    let s: k256::FieldBytes = signature.s.into();
    let k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let recovery_id = RecoveryId::try_from(signature.y_parity)
        .map_err(|_| CryptoError::InvalidRecoveryId(signature.y_parity))?;

    let key = VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(public_key_to_address(&key))
}
