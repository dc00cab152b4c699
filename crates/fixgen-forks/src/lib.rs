//! # fixgen-forks
//!
//! The fork rule table. Every fork-dependent decision lives here:
//!
//! - which header fields are required or forbidden
//! - engine API versions and payload parameters
//! - transaction types, EOF support, block reward
//! - blob schedule plus base fee, excess blob gas and intrinsic gas calculators
//!
//! [`Network`] covers both single forks and transition forks that switch at a
//! block number or timestamp.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calc;
mod error;
mod fork;
mod header;
mod transition;

pub use calc::{
    blob_base_fee, calc_base_fee, calc_excess_blob_gas, calldata_floor_gas, intrinsic_gas,
    min_gas_required, IntrinsicGasInput, INITIAL_BASE_FEE,
};
pub use error::{ForkError, ForkResult};
pub use fork::{BlobSchedule, Fork, GAS_PER_BLOB};
pub use header::{HeaderField, Requirement};
pub use transition::{Network, TransitionFork, Trigger};
