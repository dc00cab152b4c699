//! `_info` metadata and content hashing

use crate::format::FixtureFormat;
use fixgen_crypto::sha256;
use fixgen_primitives::H256;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of the metadata object inside every fixture
pub const INFO_KEY: &str = "_info";

/// Fixture metadata. Not covered by the content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FixtureInfo {
    /// Content hash
    pub hash: H256,
    /// Free-form comment
    #[serde(default)]
    pub comment: String,
    /// Version string of the tool that filled the fixture
    #[serde(default)]
    pub filling_transition_tool: String,
    /// Test description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Link to the test source
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Format of the fixture
    pub fixture_format: FixtureFormat,
}

impl FixtureInfo {
    /// Metadata for `format` with the hash still unset
    pub fn new(format: FixtureFormat) -> Self {
        Self {
            hash: H256::ZERO,
            comment: "fixgen".to_string(),
            filling_transition_tool: String::new(),
            description: String::new(),
            url: String::new(),
            fixture_format: format,
        }
    }

    /// Set the tool version
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.filling_transition_tool = tool.into();
        self
    }

    /// Set description and url
    pub fn with_source(mut self, description: impl Into<String>, url: impl Into<String>) -> Self {
        self.description = description.into();
        self.url = url.into();
        self
    }
}

/// Content hash of a fixture JSON object: sha256 over its compact,
/// key-sorted rendering without `_info`
pub fn content_hash(fixture: &Value) -> H256 {
    let body = match fixture {
        Value::Object(map) => {
            let mut map = map.clone();
            map.remove(INFO_KEY);
            Value::Object(map)
        }
        other => other.clone(),
    };
    // serde_json::Map is ordered by key, so this rendering is canonical
    sha256(ascii_escaped(&body.to_string()).as_bytes())
}

/// Non-ASCII characters as `\uXXXX` UTF-16 escapes. They only occur inside
/// JSON strings, so the result is still valid JSON.
fn ascii_escaped(json: &str) -> String {
    if json.is_ascii() {
        return json.to_string();
    }
    let mut out = String::with_capacity(json.len() + 16);
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
