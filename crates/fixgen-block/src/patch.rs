//! Header overrides.
//!
//! A patch names header fields by their fixture JSON key and either sets a
//! new value or removes the field. Values go through the same serde helpers
//! as the fixture output, so a patch accepts exactly what a fixture shows.

use crate::error::{BlockError, BlockResult};
use crate::header::Header;
use fixgen_forks::HeaderField;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Change to one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave as is
    #[default]
    Keep,
    /// Replace the value
    Set(T),
    /// Drop the field
    Remove,
}

fn field_by_name(name: &str) -> Option<HeaderField> {
    HeaderField::ALL.into_iter().find(|f| f.json_name() == name)
}

/// Set of header field changes, keyed by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderPatch(BTreeMap<HeaderField, Patch<Value>>);

impl HeaderPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`
    pub fn set(mut self, field: HeaderField, value: impl Serialize) -> BlockResult<Self> {
        self.0.insert(field, Patch::Set(serde_json::to_value(value)?));
        Ok(self)
    }

    /// Remove `field`
    pub fn remove(mut self, field: HeaderField) -> Self {
        self.0.insert(field, Patch::Remove);
        self
    }

    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|p| *p == Patch::Keep)
    }

    /// Fields the patch touches
    pub fn fields(&self) -> BTreeSet<HeaderField> {
        self.0
            .iter()
            .filter(|(_, p)| **p != Patch::Keep)
            .map(|(f, _)| *f)
            .collect()
    }

    fn patched_object(&self, header: &Header) -> BlockResult<Map<String, Value>> {
        let mut object = match serde_json::to_value(header)? {
            Value::Object(map) => map,
            other => return Err(BlockError::InvalidPatch(format!("header serialized as {}", other))),
        };
        for (field, patch) in &self.0 {
            match patch {
                Patch::Keep => {}
                Patch::Set(value) => {
                    object.insert(field.json_name().to_string(), value.clone());
                }
                Patch::Remove => {
                    object.remove(field.json_name());
                }
            }
        }
        Ok(object)
    }

    /// Patched copy of `header` and the set of touched fields
    pub fn apply_to(&self, header: &Header) -> BlockResult<(Header, BTreeSet<HeaderField>)> {
        let object = self.patched_object(header)?;
        let patched = serde_json::from_value(Value::Object(object))
            .map_err(|e| BlockError::InvalidPatch(e.to_string()))?;
        Ok((patched, self.fields()))
    }

    /// Check that every field set by the patch has that value in `header`,
    /// and every removed field is absent
    pub fn verify(&self, header: &Header) -> BlockResult<()> {
        let actual = match serde_json::to_value(header)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        // Round-trip the expectation so that equivalent spellings compare equal
        let (canonical, _) = self.apply_to(header)?;
        let expected = match serde_json::to_value(&canonical)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for field in self.fields() {
            let key = field.json_name();
            let (e, a) = (expected.get(key), actual.get(key));
            if e != a {
                return Err(BlockError::HeaderVerifyMismatch {
                    field,
                    expected: e.map_or_else(|| "absent".to_string(), Value::to_string),
                    actual: a.map_or_else(|| "absent".to_string(), Value::to_string),
                });
            }
        }
        Ok(())
    }
}

impl Serialize for HeaderPatch {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = Map::new();
        for (field, patch) in &self.0 {
            match patch {
                Patch::Keep => {}
                Patch::Set(value) => {
                    map.insert(field.json_name().to_string(), value.clone());
                }
                Patch::Remove => {
                    map.insert(field.json_name().to_string(), Value::Null);
                }
            }
        }
        map.serialize(s)
    }
}

impl<'de> Deserialize<'de> for HeaderPatch {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(d)?;
        let mut patch = BTreeMap::new();
        for (key, value) in raw {
            let field = field_by_name(&key)
                .ok_or_else(|| D::Error::custom(BlockError::UnknownField(key.clone())))?;
            let entry = match value {
                Value::Null => Patch::Remove,
                v => Patch::Set(v),
            };
            patch.insert(field, entry);
        }
        Ok(HeaderPatch(patch))
    }
}
