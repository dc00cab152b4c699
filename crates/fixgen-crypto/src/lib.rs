//! # fixgen-crypto
//!
//! Cryptographic primitives for fixture generation.
//!
//! - Keccak-256 hashing (block hashes, trie keys, code hashes)
//! - SHA-256 hashing (fixture content hashes, requests hash)
//! - deterministic secp256k1 signing and sender recovery

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod hash;
mod signature;

pub use error::{CryptoError, CryptoResult};
pub use hash::{keccak256, sha256};
pub use signature::{
    private_key_from_h256, private_key_to_address, public_key_to_address, recover_address, sign,
    PrivateKey, Signature,
};
