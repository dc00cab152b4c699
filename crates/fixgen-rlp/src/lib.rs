//! # fixgen-rlp
//!
//! RLP (Recursive Length Prefix) encoding and strict decoding.
//!
//! Structured values (headers, transactions, receipts) are encoded through the
//! `rlp` crate's [`RlpStream`]. Decoding of untrusted bytes goes through [`Item`],
//! which rejects every non-canonical form.
//!
//! ## RLP Encoding Rules
//!
//! - Single byte `[0x00, 0x7f]`: itself
//! - Short string (0-55 bytes): `0x80 + len` + data
//! - Long string (>55 bytes): `0xb7 + len_of_len` + len + data
//! - Short list (0-55 bytes payload): `0xc0 + len` + items
//! - Long list (>55 bytes payload): `0xf7 + len_of_len` + len + items

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod item;

pub use error::{RlpError, RlpResult};
pub use item::Item;

// Re-export rlp crate for direct use
pub use rlp::{Encodable, RlpStream};

/// Encode a value to RLP bytes
pub fn encode<T: Encodable>(value: &T) -> Vec<u8> {
    rlp::encode(value).to_vec()
}

/// Strictly decode a single top-level item
pub fn decode(data: &[u8]) -> RlpResult<Item> {
    Item::decode(data)
}
