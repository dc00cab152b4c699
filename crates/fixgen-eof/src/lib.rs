//! # fixgen-eof
//!
//! EVM Object Format containers.
//!
//! - [`Container`] encoding and header decoding
//! - [`validate`] with the canonical exception of the first failed rule
//! - [`wrap_code`] to embed plain bytecode in a runtime container

#![warn(missing_docs)]
#![warn(clippy::all)]

mod container;
mod error;
pub mod opcode;
mod validate;
mod wrap;

pub use container::{
    CodeSection, Container, MAX_CODE_SECTIONS, MAX_CONTAINERS, MAX_CONTAINER_SIZE, MAX_IO,
    MAX_STACK_HEIGHT, NON_RETURNING,
};
pub use error::{EofError, EofResult};
pub use validate::{validate, ContainerKind};
pub use wrap::wrap_code;
