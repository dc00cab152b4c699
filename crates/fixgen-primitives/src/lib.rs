//! # fixgen-primitives
//!
//! Primitive types shared by every fixgen crate.
//!
//! - [`Address`] and [`H256`] fixed-size values
//! - [`Bytes`] hex-rendered byte strings
//! - quantity parsing plus zero-padded and minimal hex rendering
//! - serde adapters for fixture JSON (behind the `serde` feature)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod bytes;
mod error;
mod hash;
pub mod number;
#[cfg(feature = "serde")]
pub mod serde_hex;

pub use address::{Address, AddressError};
pub use bytes::Bytes;
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;
