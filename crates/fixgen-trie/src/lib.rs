//! # fixgen-trie
//!
//! Merkle-Patricia trie root computation.
//!
//! Roots are computed from the full key set at once: keys are turned into
//! nibble paths, the sorted paths are split into leaf, extension and branch
//! nodes, and nodes whose encoding is shorter than 32 bytes are embedded in
//! their parent instead of being hashed.
//!
//! - [`Trie`] keyed store, optionally secured (keys hashed with keccak256)
//! - [`state_root`] / [`storage_root`] for account state
//! - [`ordered_trie_root`] for transaction, receipt and withdrawal lists

#![warn(missing_docs)]
#![warn(clippy::all)]

mod account;
pub mod nibbles;
mod node;
mod ordered;
mod trie;

pub use account::{state_root, storage_root, AccountLeaf, EMPTY_CODE_HASH, EMPTY_TRIE_ROOT};
pub use ordered::ordered_trie_root;
pub use trie::{Trie, TrieValue};
