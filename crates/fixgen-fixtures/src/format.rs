//! Fixture format registry

use crate::error::{FixtureError, FixtureResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The closed set of fixture formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FixtureFormat {
    /// Single transaction against a pre-state
    StateTest,
    /// Chain of blocks in RLP
    BlockchainTest,
    /// Chain of blocks as engine API calls
    BlockchainTestEngine,
    /// Container validity vectors
    EofTest,
    /// Transaction validity per fork
    TransactionTest,
}

/// Registry entry of a format
#[derive(Debug, Clone, Copy)]
pub struct FormatInfo {
    /// Format
    pub format: FixtureFormat,
    /// Name written in `_info.fixture-format`
    pub name: &'static str,
    /// Directory under the output root
    pub output_dir: &'static str,
    /// One-line description
    pub description: &'static str,
}

/// Every format, in output order
pub const FORMATS: [FormatInfo; 5] = [
    FormatInfo {
        format: FixtureFormat::StateTest,
        name: "state_test",
        output_dir: "state_tests",
        description: "Single transaction executed against a pre-state",
    },
    FormatInfo {
        format: FixtureFormat::BlockchainTest,
        name: "blockchain_test",
        output_dir: "blockchain_tests",
        description: "Blocks imported by RLP from a genesis",
    },
    FormatInfo {
        format: FixtureFormat::BlockchainTestEngine,
        name: "blockchain_test_engine",
        output_dir: "blockchain_tests_engine",
        description: "Blocks delivered through engine_newPayload",
    },
    FormatInfo {
        format: FixtureFormat::EofTest,
        name: "eof_test",
        output_dir: "eof_tests",
        description: "EOF container validity per fork",
    },
    FormatInfo {
        format: FixtureFormat::TransactionTest,
        name: "transaction_test",
        output_dir: "transaction_tests",
        description: "Transaction validity and intrinsic gas per fork",
    },
];

impl FixtureFormat {
    /// Registry entry
    pub fn info(&self) -> &'static FormatInfo {
        // FORMATS is indexed by discriminant
        &FORMATS[*self as usize]
    }

    /// Format name
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Directory under the output root
    pub fn output_dir(&self) -> &'static str {
        self.info().output_dir
    }
}

impl fmt::Display for FixtureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FixtureFormat {
    type Err = FixtureError;

    fn from_str(s: &str) -> FixtureResult<Self> {
        FORMATS
            .iter()
            .find(|info| info.name == s)
            .map(|info| info.format)
            .ok_or_else(|| FixtureError::UnknownFormat(s.to_string()))
    }
}

impl Serialize for FixtureFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FixtureFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
