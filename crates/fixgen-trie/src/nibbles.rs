//! Nibble paths and hex-prefix encoding

/// Split bytes into half-bytes, high nibble first.
pub fn bytes_to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0F);
    }
    nibbles
}

/// Hex-prefix encode a nibble path.
///
/// The flag nibble is 0 for an even extension, 1 for an odd extension,
/// 2 for an even leaf and 3 for an odd leaf. An odd path packs its first
/// nibble next to the flag.
pub fn encode_hex_prefix(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let odd = nibbles.len() % 2 == 1;
    let prefix = if is_leaf { 2 } else { 0 } + if odd { 1 } else { 0 };

    let mut result = Vec::with_capacity(nibbles.len() / 2 + 1);
    let rest = if odd {
        result.push((prefix << 4) | nibbles[0]);
        &nibbles[1..]
    } else {
        result.push(prefix << 4);
        nibbles
    };
    for chunk in rest.chunks(2) {
        result.push((chunk[0] << 4) | chunk.get(1).copied().unwrap_or(0));
    }
    result
}

/// Length of the shared prefix of two nibble paths.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_nibbles() {
        assert_eq!(bytes_to_nibbles(&[0x12, 0xab]), vec![1, 2, 0xa, 0xb]);
        assert!(bytes_to_nibbles(&[]).is_empty());
    }

    #[test]
    fn test_hex_prefix_flags() {
        assert_eq!(encode_hex_prefix(&[1, 2, 3, 4, 5], false), vec![0x11, 0x23, 0x45]);
        assert_eq!(encode_hex_prefix(&[0, 1, 2, 3, 4, 5], false), vec![0x00, 0x01, 0x23, 0x45]);
        assert_eq!(encode_hex_prefix(&[0xf, 1, 0xc, 0xb, 8], true), vec![0x3f, 0x1c, 0xb8]);
        assert_eq!(encode_hex_prefix(&[0, 0xf, 1, 0xc, 0xb, 8], true), vec![0x20, 0x0f, 0x1c, 0xb8]);
        assert_eq!(encode_hex_prefix(&[], true), vec![0x20]);
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len(&[1, 2, 3], &[1, 2, 4]), 2);
        assert_eq!(common_prefix_len(&[1, 2], &[1, 2, 4]), 2);
        assert_eq!(common_prefix_len(&[5], &[1]), 0);
    }
}
