//! # fixgen-exceptions
//!
//! Canonical exception taxonomy shared by transactions, blocks and EOF
//! containers, plus the per-client mapper that turns raw error text from a
//! transition tool or EOF parser into one of those exceptions.
//!
//! Mapper tables are plain values: build one with [`ExceptionMapper::for_client`]
//! or [`ExceptionMapper::new`] and pass it to whoever needs it.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod clients;
mod error;
mod kinds;
mod list;
mod mapper;

pub use error::{ExceptionError, ExceptionResult};
pub use kinds::{
    BlockException, EofException, ExceptionKind, TransactionException, UNDEFINED_EXCEPTION,
};
pub use list::ExceptionList;
pub use mapper::{ClientKind, ExceptionMapper};
