//! Generic RLP item tree with canonical encoding and strict decoding

use crate::error::{RlpError, RlpResult};
use bytes::{BufMut, BytesMut};
use fixgen_primitives::{Address, H256, U256};

/// A decoded RLP value: a byte string or a list of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// Byte string
    Bytes(Vec<u8>),
    /// Ordered list
    List(Vec<Item>),
}

impl Item {
    /// Unsigned integer, minimal big-endian. Zero is the empty string.
    pub fn uint(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(8);
        Item::Bytes(bytes[start..].to_vec())
    }

    /// 256-bit unsigned integer, minimal big-endian.
    pub fn u256(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(32);
        Item::Bytes(bytes[start..].to_vec())
    }

    /// Byte string item
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Item::Bytes(data.into())
    }

    /// List item
    pub fn list(items: Vec<Item>) -> Self {
        Item::List(items)
    }

    /// Canonical encoding of this item
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.encode_into(&mut buf);
        buf.to_vec()
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        match self {
            Item::Bytes(data) => {
                if data.len() == 1 && data[0] < 0x80 {
                    buf.put_u8(data[0]);
                } else {
                    put_header(buf, 0x80, data.len());
                    buf.put_slice(data);
                }
            }
            Item::List(items) => {
                let mut payload = BytesMut::new();
                for item in items {
                    item.encode_into(&mut payload);
                }
                put_header(buf, 0xc0, payload.len());
                buf.put_slice(&payload);
            }
        }
    }

    /// Decode exactly one item from `data`, rejecting non-canonical input and trailing bytes.
    pub fn decode(data: &[u8]) -> RlpResult<Self> {
        let (item, consumed) = decode_item(data)?;
        if consumed != data.len() {
            return Err(RlpError::TrailingBytes(data.len() - consumed));
        }
        Ok(item)
    }

    /// Byte string payload
    pub fn as_bytes(&self) -> RlpResult<&[u8]> {
        match self {
            Item::Bytes(data) => Ok(data),
            Item::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    /// List elements
    pub fn as_list(&self) -> RlpResult<&[Item]> {
        match self {
            Item::List(items) => Ok(items),
            Item::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// Canonical unsigned integer that fits in `u64`
    pub fn as_u64(&self) -> RlpResult<u64> {
        let data = self.canonical_integer(8)?;
        Ok(data.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
    }

    /// Canonical unsigned integer that fits in 256 bits
    pub fn as_u256(&self) -> RlpResult<U256> {
        let data = self.canonical_integer(32)?;
        Ok(U256::from_big_endian(data))
    }

    fn canonical_integer(&self, max_width: usize) -> RlpResult<&[u8]> {
        let data = self.as_bytes()?;
        if data.first() == Some(&0) {
            return Err(RlpError::LeadingZeroInteger);
        }
        if data.len() > max_width {
            return Err(RlpError::IntegerOverflow(data.len()));
        }
        Ok(data)
    }

    /// Exactly 20 bytes
    pub fn as_address(&self) -> RlpResult<Address> {
        let data = self.as_bytes()?;
        Address::from_slice(data).map_err(|_| RlpError::InvalidLength {
            expected: 20,
            got: data.len(),
        })
    }

    /// Exactly 32 bytes
    pub fn as_h256(&self) -> RlpResult<H256> {
        let data = self.as_bytes()?;
        H256::from_slice(data).map_err(|_| RlpError::InvalidLength {
            expected: 32,
            got: data.len(),
        })
    }
}

fn put_header(buf: &mut BytesMut, offset: u8, len: usize) {
    if len < 56 {
        buf.put_u8(offset + len as u8);
    } else {
        let len_bytes = (len as u64).to_be_bytes();
        let start = len_bytes.iter().position(|&b| b != 0).unwrap_or(7);
        buf.put_u8(offset + 55 + (8 - start) as u8);
        buf.put_slice(&len_bytes[start..]);
    }
}

/// Header of one item: whether it is a list, where its payload starts and how long it is.
struct Header {
    list: bool,
    header_len: usize,
    payload_len: usize,
}

fn read_header(data: &[u8]) -> RlpResult<Header> {
    let prefix = *data.first().ok_or(RlpError::Truncated {
        needed: 1,
        available: 0,
    })?;
    match prefix {
        0x00..=0x7f => Ok(Header {
            list: false,
            header_len: 0,
            payload_len: 1,
        }),
        0x80..=0xb7 => {
            let payload_len = (prefix - 0x80) as usize;
            if payload_len == 1 {
                match data.get(1) {
                    Some(&b) if b < 0x80 => return Err(RlpError::NonCanonicalSingleByte),
                    _ => {}
                }
            }
            Ok(Header {
                list: false,
                header_len: 1,
                payload_len,
            })
        }
        0xb8..=0xbf => long_header(data, (prefix - 0xb7) as usize, false),
        0xc0..=0xf7 => Ok(Header {
            list: true,
            header_len: 1,
            payload_len: (prefix - 0xc0) as usize,
        }),
        0xf8..=0xff => long_header(data, (prefix - 0xf7) as usize, true),
    }
}

fn long_header(data: &[u8], len_of_len: usize, list: bool) -> RlpResult<Header> {
    let len_bytes = data.get(1..1 + len_of_len).ok_or(RlpError::Truncated {
        needed: 1 + len_of_len,
        available: data.len(),
    })?;
    if len_bytes[0] == 0 {
        return Err(RlpError::LeadingZeroLength);
    }
    if len_of_len > 8 {
        return Err(RlpError::LengthOverflow);
    }
    let len = len_bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
    let payload_len = usize::try_from(len).map_err(|_| RlpError::LengthOverflow)?;
    if payload_len < 56 {
        return Err(RlpError::NonCanonicalLength(payload_len));
    }
    Ok(Header {
        list,
        header_len: 1 + len_of_len,
        payload_len,
    })
}

fn decode_item(data: &[u8]) -> RlpResult<(Item, usize)> {
    let header = read_header(data)?;
    let total = header
        .header_len
        .checked_add(header.payload_len)
        .ok_or(RlpError::LengthOverflow)?;
    if data.len() < total {
        return Err(RlpError::Truncated {
            needed: total,
            available: data.len(),
        });
    }
    let payload = &data[header.header_len..total];
    if !header.list {
        return Ok((Item::Bytes(payload.to_vec()), total));
    }

    let mut items = Vec::new();
    let mut offset = 0;
    while offset < payload.len() {
        let (item, consumed) = decode_item(&payload[offset..])?;
        items.push(item);
        offset += consumed;
    }
    Ok((Item::List(items), total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    // ==================== Encoding ====================

    #[test]
    fn test_encode_integers() {
        assert_eq!(Item::uint(0).encode(), vec![0x80]);
        assert_eq!(Item::uint(15).encode(), vec![0x0f]);
        assert_eq!(Item::uint(1024).encode(), vec![0x82, 0x04, 0x00]);
        assert_eq!(Item::u256(U256::zero()).encode(), vec![0x80]);
    }

    #[test]
    fn test_encode_strings_and_lists() {
        assert_eq!(Item::bytes(b"dog".to_vec()).encode(), hex("83646f67"));
        let cat_dog = Item::list(vec![Item::bytes(b"cat".to_vec()), Item::bytes(b"dog".to_vec())]);
        assert_eq!(cat_dog.encode(), hex("c88363617483646f67"));
        assert_eq!(Item::list(vec![]).encode(), vec![0xc0]);
    }

    #[test]
    fn test_encode_long_string() {
        let data = vec![0x61u8; 56];
        let encoded = Item::bytes(data.clone()).encode();
        assert_eq!(&encoded[..2], &[0xb8, 56]);
        assert_eq!(&encoded[2..], &data[..]);
    }

    #[test]
    fn test_matches_rlp_crate() {
        let mut s = rlp::RlpStream::new_list(3);
        s.append(&1024u64);
        s.append(&"dog");
        s.begin_list(0);
        let ours = Item::list(vec![
            Item::uint(1024),
            Item::bytes(b"dog".to_vec()),
            Item::list(vec![]),
        ]);
        assert_eq!(ours.encode(), s.out().to_vec());
    }

    // ==================== Strict decoding ====================

    #[test]
    fn test_decode_rejects_wrapped_single_byte() {
        assert_eq!(
            Item::decode(&[0x81, 0x05]),
            Err(RlpError::NonCanonicalSingleByte)
        );
        assert_eq!(Item::decode(&[0x81, 0x80]), Ok(Item::Bytes(vec![0x80])));
    }

    #[test]
    fn test_decode_rejects_long_form_for_short_payload() {
        let mut data = vec![0xb8, 0x03];
        data.extend_from_slice(b"dog");
        assert_eq!(Item::decode(&data), Err(RlpError::NonCanonicalLength(3)));
    }

    #[test]
    fn test_decode_rejects_leading_zero_length() {
        let mut data = vec![0xb9, 0x00, 0x38];
        data.extend_from_slice(&[0u8; 56]);
        assert_eq!(Item::decode(&data), Err(RlpError::LeadingZeroLength));
    }

    #[test]
    fn test_decode_rejects_trailing_and_truncated() {
        assert_eq!(Item::decode(&[0x80, 0x00]), Err(RlpError::TrailingBytes(1)));
        assert!(matches!(
            Item::decode(&[0x83, 0x64]),
            Err(RlpError::Truncated { .. })
        ));
        assert!(matches!(Item::decode(&[]), Err(RlpError::Truncated { .. })));
        // list announces 3 bytes but its only item spills over
        assert!(matches!(
            Item::decode(&[0xc3, 0x83, 0x64, 0x6f]),
            Err(RlpError::Truncated { .. })
        ));
    }

    #[test]
    fn test_integer_accessors() {
        assert_eq!(Item::decode(&[0x82, 0x04, 0x00]).unwrap().as_u64(), Ok(1024));
        assert_eq!(
            Item::decode(&[0x82, 0x00, 0x04]).unwrap().as_u64(),
            Err(RlpError::LeadingZeroInteger)
        );
        assert_eq!(
            Item::bytes(vec![1u8; 9]).as_u64(),
            Err(RlpError::IntegerOverflow(9))
        );
        assert_eq!(Item::list(vec![]).as_u64(), Err(RlpError::ExpectedBytes));
    }

    #[test]
    fn test_fixed_width_accessors() {
        assert!(Item::bytes(vec![0u8; 20]).as_address().is_ok());
        assert_eq!(
            Item::bytes(vec![0u8; 19]).as_address(),
            Err(RlpError::InvalidLength {
                expected: 20,
                got: 19
            })
        );
        assert!(Item::bytes(vec![0u8; 32]).as_h256().is_ok());
    }
}
