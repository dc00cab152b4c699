//! Serde adapters for hex quantities
//!
//! Use with `#[serde(with = "fixgen_primitives::serde_hex::padded_u64")]` and friends.
//! Every deserializer is lenient: hex strings, decimal strings and JSON integers are
//! all accepted, so spec files can be written by hand.

use crate::number::{
    minimal_hex_u256, minimal_hex_u64, padded_hex_u256, padded_hex_u64, parse_u256, parse_u64,
};
use primitive_types::U256;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Str(String),
    Int(u64),
}

impl NumberRepr {
    fn into_u64<E: Error>(self) -> Result<u64, E> {
        match self {
            NumberRepr::Str(s) => parse_u64(&s).map_err(E::custom),
            NumberRepr::Int(v) => Ok(v),
        }
    }

    fn into_u256<E: Error>(self) -> Result<U256, E> {
        match self {
            NumberRepr::Str(s) => parse_u256(&s).map_err(E::custom),
            NumberRepr::Int(v) => Ok(U256::from(v)),
        }
    }
}

fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    NumberRepr::deserialize(d)?.into_u64()
}

fn de_u256<'de, D: Deserializer<'de>>(d: D) -> Result<U256, D::Error> {
    NumberRepr::deserialize(d)?.into_u256()
}

fn de_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<NumberRepr>::deserialize(d)?
        .map(NumberRepr::into_u64)
        .transpose()
}

fn de_opt_u256<'de, D: Deserializer<'de>>(d: D) -> Result<Option<U256>, D::Error> {
    Option::<NumberRepr>::deserialize(d)?
        .map(NumberRepr::into_u256)
        .transpose()
}

macro_rules! hex_module {
    ($name:ident, $ty:ty, $render:path, $de:path) => {
        #[allow(missing_docs)]
        pub mod $name {
            use super::*;

            pub fn serialize<S: Serializer>(value: &$ty, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(&$render(*value))
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<$ty, D::Error> {
                $de(d)
            }
        }
    };
}

macro_rules! opt_hex_module {
    ($name:ident, $ty:ty, $render:path, $de:path) => {
        #[allow(missing_docs)]
        pub mod $name {
            use super::*;

            pub fn serialize<S: Serializer>(value: &Option<$ty>, s: S) -> Result<S::Ok, S::Error> {
                match value {
                    Some(v) => s.serialize_str(&$render(*v)),
                    None => s.serialize_none(),
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<$ty>, D::Error> {
                $de(d)
            }
        }
    };
}

fn render_padded_u64(v: u64) -> String {
    padded_hex_u64(v)
}
fn render_minimal_u64(v: u64) -> String {
    minimal_hex_u64(v)
}
fn render_padded_u256(v: U256) -> String {
    padded_hex_u256(&v)
}
fn render_minimal_u256(v: U256) -> String {
    minimal_hex_u256(&v)
}

hex_module!(padded_u64, u64, render_padded_u64, de_u64);
hex_module!(minimal_u64, u64, render_minimal_u64, de_u64);
hex_module!(padded_u256, U256, render_padded_u256, de_u256);
hex_module!(minimal_u256, U256, render_minimal_u256, de_u256);
opt_hex_module!(opt_padded_u64, u64, render_padded_u64, de_opt_u64);
opt_hex_module!(opt_minimal_u64, u64, render_minimal_u64, de_opt_u64);
opt_hex_module!(opt_padded_u256, U256, render_padded_u256, de_opt_u256);
opt_hex_module!(opt_minimal_u256, U256, render_minimal_u256, de_opt_u256);

/// `u64` quantity that serializes zero-padded and parses leniently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct HexU64(pub u64);

impl Serialize for HexU64 {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&padded_hex_u64(self.0))
    }
}

impl<'de> Deserialize<'de> for HexU64 {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        de_u64(d).map(HexU64)
    }
}

/// `U256` quantity that serializes zero-padded and parses leniently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct HexU256(pub U256);

impl Serialize for HexU256 {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&padded_hex_u256(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexU256 {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        de_u256(d).map(HexU256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "padded_u64")]
        nonce: u64,
        #[serde(with = "minimal_u256")]
        value: U256,
        #[serde(with = "opt_padded_u64", default, skip_serializing_if = "Option::is_none")]
        base_fee: Option<u64>,
    }

    #[test]
    fn test_lenient_parse() {
        let s: Sample =
            serde_json::from_str(r#"{"nonce": 5, "value": "0x0a", "base_fee": "7"}"#).unwrap();
        assert_eq!(
            s,
            Sample {
                nonce: 5,
                value: U256::from(10u64),
                base_fee: Some(7)
            }
        );
    }

    #[test]
    fn test_render_styles() {
        let s = Sample {
            nonce: 0,
            value: U256::zero(),
            base_fee: None,
        };
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"nonce":"0x00","value":"0x0"}"#
        );
    }

    #[test]
    fn test_hex_wrappers() {
        let v: HexU64 = serde_json::from_str("\"0x0100\"").unwrap();
        assert_eq!(v, HexU64(256));
        assert_eq!(serde_json::to_string(&HexU256(U256::one())).unwrap(), "\"0x01\"");
    }
}
