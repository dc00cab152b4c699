//! The closed union of fixture formats

use crate::blockchain::{BlockchainEngineFixture, BlockchainFixture};
use crate::eof::EofFixture;
use crate::error::{FixtureError, FixtureResult};
use crate::format::FixtureFormat;
use crate::info::{content_hash, FixtureInfo, INFO_KEY};
use crate::state::StateFixture;
use crate::transaction::TransactionFixture;
use fixgen_primitives::H256;
use serde::Serialize;
use serde_json::Value;

/// Any fixture. The variant always agrees with `_info.fixture-format`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fixture {
    /// `state_test`
    State(StateFixture),
    /// `blockchain_test`
    Blockchain(BlockchainFixture),
    /// `blockchain_test_engine`
    BlockchainEngine(BlockchainEngineFixture),
    /// `eof_test`
    Eof(EofFixture),
    /// `transaction_test`
    Transaction(TransactionFixture),
}

impl Fixture {
    /// Format of the variant
    pub fn format(&self) -> FixtureFormat {
        match self {
            Fixture::State(_) => FixtureFormat::StateTest,
            Fixture::Blockchain(_) => FixtureFormat::BlockchainTest,
            Fixture::BlockchainEngine(_) => FixtureFormat::BlockchainTestEngine,
            Fixture::Eof(_) => FixtureFormat::EofTest,
            Fixture::Transaction(_) => FixtureFormat::TransactionTest,
        }
    }

    /// Metadata
    pub fn info(&self) -> &FixtureInfo {
        match self {
            Fixture::State(f) => &f.info,
            Fixture::Blockchain(f) => &f.info,
            Fixture::BlockchainEngine(f) => &f.info,
            Fixture::Eof(f) => &f.info,
            Fixture::Transaction(f) => &f.info,
        }
    }

    fn info_mut(&mut self) -> &mut FixtureInfo {
        match self {
            Fixture::State(f) => &mut f.info,
            Fixture::Blockchain(f) => &mut f.info,
            Fixture::BlockchainEngine(f) => &mut f.info,
            Fixture::Eof(f) => &mut f.info,
            Fixture::Transaction(f) => &mut f.info,
        }
    }

    /// Recorded content hash
    pub fn hash(&self) -> H256 {
        self.info().hash
    }

    /// Fork the fixture targets, for the index
    pub fn fork(&self) -> Option<String> {
        match self {
            Fixture::State(f) => f.post.keys().next().cloned(),
            Fixture::Blockchain(f) => Some(f.network.clone()),
            Fixture::BlockchainEngine(f) => Some(f.network.clone()),
            Fixture::Eof(f) => f
                .vectors
                .values()
                .next()
                .and_then(|v| v.results.keys().next().cloned()),
            Fixture::Transaction(f) => f.result.keys().next().cloned(),
        }
    }

    /// JSON rendering
    pub fn to_value(&self) -> FixtureResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse a fixture, dispatching on `_info.fixture-format`
    pub fn from_value(value: Value) -> FixtureResult<Self> {
        let format: FixtureFormat = value
            .get(INFO_KEY)
            .and_then(|info| info.get("fixture-format"))
            .and_then(Value::as_str)
            .ok_or_else(|| FixtureError::MissingInfo("no fixture-format".into()))?
            .parse()?;
        Ok(match format {
            FixtureFormat::StateTest => Fixture::State(serde_json::from_value(value)?),
            FixtureFormat::BlockchainTest => Fixture::Blockchain(serde_json::from_value(value)?),
            FixtureFormat::BlockchainTestEngine => {
                Fixture::BlockchainEngine(serde_json::from_value(value)?)
            }
            FixtureFormat::EofTest => Fixture::Eof(serde_json::from_value(value)?),
            FixtureFormat::TransactionTest => Fixture::Transaction(serde_json::from_value(value)?),
        })
    }

    /// Content hash of the current body
    pub fn compute_hash(&self) -> FixtureResult<H256> {
        Ok(content_hash(&self.to_value()?))
    }

    /// Record the content hash in `_info`
    pub fn seal(mut self) -> FixtureResult<Self> {
        let hash = self.compute_hash()?;
        self.info_mut().hash = hash;
        Ok(self)
    }
}

impl From<StateFixture> for Fixture {
    fn from(f: StateFixture) -> Self {
        Fixture::State(f)
    }
}

impl From<BlockchainFixture> for Fixture {
    fn from(f: BlockchainFixture) -> Self {
        Fixture::Blockchain(f)
    }
}

impl From<BlockchainEngineFixture> for Fixture {
    fn from(f: BlockchainEngineFixture) -> Self {
        Fixture::BlockchainEngine(f)
    }
}

impl From<EofFixture> for Fixture {
    fn from(f: EofFixture) -> Self {
        Fixture::Eof(f)
    }
}

impl From<TransactionFixture> for Fixture {
    fn from(f: TransactionFixture) -> Self {
        Fixture::Transaction(f)
    }
}
