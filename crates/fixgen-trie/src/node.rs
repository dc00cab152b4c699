//! Node construction and internal node encoding

use crate::nibbles::{common_prefix_len, encode_hex_prefix};
use fixgen_crypto::keccak256;
use fixgen_primitives::H256;
use fixgen_rlp::RlpStream;

/// Reference to a child node as embedded in its parent.
///
/// Nodes whose encoding is shorter than 32 bytes are inlined, larger ones are
/// replaced by their hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeRef {
    Empty,
    Inline(Vec<u8>),
    Hash(H256),
}

impl NodeRef {
    fn append_to(&self, s: &mut RlpStream) {
        match self {
            NodeRef::Empty => {
                s.append_empty_data();
            }
            NodeRef::Inline(encoded) => {
                s.append_raw(encoded, 1);
            }
            NodeRef::Hash(hash) => {
                s.append(hash);
            }
        }
    }

    /// Root hash when this reference sits at the top of the trie.
    pub(crate) fn into_root(self) -> H256 {
        match self {
            NodeRef::Empty => keccak256(&[0x80]),
            NodeRef::Inline(encoded) => keccak256(&encoded),
            NodeRef::Hash(hash) => hash,
        }
    }
}

enum Node<'a> {
    Leaf {
        rest: &'a [u8],
        value: &'a [u8],
    },
    Extension {
        segment: &'a [u8],
        child: NodeRef,
    },
    Branch {
        children: Vec<NodeRef>,
        value: &'a [u8],
    },
}

impl Node<'_> {
    fn encode(&self) -> Vec<u8> {
        let mut s = RlpStream::new();
        match self {
            Node::Leaf { rest, value } => {
                s.begin_list(2);
                s.append(&encode_hex_prefix(rest, true));
                s.append(&value.to_vec());
            }
            Node::Extension { segment, child } => {
                s.begin_list(2);
                s.append(&encode_hex_prefix(segment, false));
                child.append_to(&mut s);
            }
            Node::Branch { children, value } => {
                s.begin_list(17);
                for child in children {
                    child.append_to(&mut s);
                }
                s.append(&value.to_vec());
            }
        }
        s.out().to_vec()
    }
}

fn encode_internal(node: Option<Node<'_>>) -> NodeRef {
    let Some(node) = node else {
        return NodeRef::Empty;
    };
    let encoded = node.encode();
    if encoded.len() < 32 {
        NodeRef::Inline(encoded)
    } else {
        NodeRef::Hash(keccak256(&encoded))
    }
}

/// Build the node for `entries` (sorted by nibble path, unique keys) below `level`.
fn patricialize(entries: &[(Vec<u8>, Vec<u8>)], level: usize) -> Option<Node<'_>> {
    let (first_key, first_value) = entries.first()?;
    if entries.len() == 1 {
        return Some(Node::Leaf {
            rest: &first_key[level..],
            value: first_value,
        });
    }

    let substring = &first_key[level..];
    let prefix_len = entries[1..].iter().fold(substring.len(), |acc, (key, _)| {
        acc.min(common_prefix_len(substring, &key[level..]))
    });
    if prefix_len > 0 {
        let child = encode_internal(patricialize(entries, level + prefix_len));
        return Some(Node::Extension {
            segment: &first_key[level..level + prefix_len],
            child,
        });
    }

    // A key ending exactly here sorts before all keys that extend it.
    let mut rest = entries;
    let mut value: &[u8] = &[];
    if first_key.len() == level {
        value = first_value;
        rest = &entries[1..];
    }

    let mut children = Vec::with_capacity(16);
    for nibble in 0..16u8 {
        let split = rest.iter().take_while(|(key, _)| key[level] == nibble).count();
        let (group, tail) = rest.split_at(split);
        children.push(encode_internal(patricialize(group, level + 1)));
        rest = tail;
    }
    Some(Node::Branch { children, value })
}

/// Root of the trie holding `entries`, given as (nibble path, encoded value) pairs
/// sorted by path.
pub(crate) fn root_of_sorted(entries: &[(Vec<u8>, Vec<u8>)]) -> H256 {
    encode_internal(patricialize(entries, 0)).into_root()
}
