//! Subcommands

pub mod fill;
pub mod verify;
