//! Quantity parsing and hex rendering
//!
//! Fixtures render quantities in two styles:
//!
//! - zero-padded: an even number of hex digits, zero is `0x00`
//! - minimal: no leading zeros, zero is `0x0`
//!
//! Parsing accepts either style, plain decimal strings, and the empty `0x`.

use crate::error::PrimitiveError;
use primitive_types::U256;

/// Render `value` as zero-padded hex (`0x00`, `0x01`, `0x0100`).
pub fn padded_hex_u64(value: u64) -> String {
    pad_digits(format!("{:x}", value))
}

/// Render `value` as minimal hex (`0x0`, `0x1`, `0x100`).
pub fn minimal_hex_u64(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Render a 256-bit `value` as zero-padded hex.
pub fn padded_hex_u256(value: &U256) -> String {
    pad_digits(format!("{:x}", value))
}

/// Render a 256-bit `value` as minimal hex.
pub fn minimal_hex_u256(value: &U256) -> String {
    format!("0x{:x}", value)
}

fn pad_digits(digits: String) -> String {
    if digits.len() % 2 == 1 {
        format!("0x0{}", digits)
    } else {
        format!("0x{}", digits)
    }
}

/// Parse a hex (`0x`-prefixed) or decimal quantity into `u64`.
pub fn parse_u64(s: &str) -> Result<u64, PrimitiveError> {
    let s = s.trim();
    let parsed = match strip_hex_prefix(s) {
        Some("") => Ok(0),
        Some(digits) => u64::from_str_radix(digits, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| PrimitiveError::InvalidNumber(format!("{s}: {e}")))
}

/// Parse a hex (`0x`-prefixed) or decimal quantity into `U256`.
pub fn parse_u256(s: &str) -> Result<U256, PrimitiveError> {
    let s = s.trim();
    match strip_hex_prefix(s) {
        Some("") => Ok(U256::zero()),
        Some(digits) => {
            if digits.len() > 64 {
                return Err(PrimitiveError::InvalidNumber(format!("{s}: too many digits")));
            }
            U256::from_str_radix(digits, 16)
                .map_err(|e| PrimitiveError::InvalidNumber(format!("{s}: {e:?}")))
        }
        None => U256::from_dec_str(s)
            .map_err(|e| PrimitiveError::InvalidNumber(format!("{s}: {e:?}"))),
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_hex() {
        assert_eq!(padded_hex_u64(0), "0x00");
        assert_eq!(padded_hex_u64(1), "0x01");
        assert_eq!(padded_hex_u64(0x100), "0x0100");
        assert_eq!(padded_hex_u64(0x1000), "0x1000");
        assert_eq!(padded_hex_u256(&U256::zero()), "0x00");
        assert_eq!(padded_hex_u256(&U256::from(0xabcu64)), "0x0abc");
    }

    #[test]
    fn test_minimal_hex() {
        assert_eq!(minimal_hex_u64(0), "0x0");
        assert_eq!(minimal_hex_u64(0x100), "0x100");
        assert_eq!(minimal_hex_u256(&U256::from(10u64)), "0xa");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse_u64("0x00").unwrap(), 0);
        assert_eq!(parse_u64("0x").unwrap(), 0);
        assert_eq!(parse_u64("0x0100").unwrap(), 256);
        assert_eq!(parse_u64("1000").unwrap(), 1000);
        assert!(parse_u64("0xzz").is_err());
        assert!(parse_u64("-1").is_err());
        assert_eq!(parse_u256("0x0a").unwrap(), U256::from(10u64));
        assert_eq!(
            parse_u256("100000000000000000000").unwrap(),
            U256::from(100_000_000_000_000_000_000u128)
        );
    }
}
