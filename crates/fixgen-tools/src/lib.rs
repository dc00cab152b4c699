//! # fixgen-tools
//!
//! Narrow interfaces to the programs fixture generation depends on.
//!
//! - [`TransitionTool`]: executes a block, [`SubprocessTransitionTool`] drives a
//!   geth-compatible `t8n` binary
//! - [`EofValidator`]: accepts or rejects containers, either in-process
//!   ([`BuiltinEofValidator`]) or through an `eofparse` binary

#![warn(missing_docs)]
#![warn(clippy::all)]

mod eof;
mod error;
mod process;
mod subprocess;
mod t8n;

pub use eof::{BuiltinEofValidator, EofValidator, EofVerdict, SubprocessEofValidator};
pub use error::{ToolError, ToolResult};
pub use subprocess::SubprocessTransitionTool;
pub use t8n::{
    t8n_env, RejectedTx, TransitionOutput, TransitionRequest, TransitionResult, TransitionTool,
};
