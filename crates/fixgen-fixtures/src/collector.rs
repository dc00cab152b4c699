//! Fixture file layout
//!
//! ```text
//! <output>/
//!   state_tests/<source>.json        {"<test id>": fixture, ...}
//!   blockchain_tests/<source>.json
//!   ...
//!   pre_alloc/<group hash>.json
//!   index.json
//! ```

use crate::error::{FixtureError, FixtureResult};
use crate::fixture::Fixture;
use crate::format::FixtureFormat;
use fixgen_crypto::sha256;
use fixgen_forks::Fork;
use fixgen_primitives::H256;
use fixgen_types::{Alloc, Environment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the index file at the output root
pub const INDEX_FILE: &str = "index.json";

/// Directory of the pre-allocation group files
pub const PRE_ALLOC_DIR: &str = "pre_alloc";

/// Write `value` as pretty JSON, creating parent directories
pub fn write_json(path: &Path, value: &impl Serialize) -> FixtureResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FixtureError::io(parent, e))?;
    }
    let mut rendered = serde_json::to_string_pretty(value)?;
    rendered.push('\n');
    fs::write(path, rendered).map_err(|e| FixtureError::io(path, e))
}

/// Read a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> FixtureResult<T> {
    let raw = fs::read_to_string(path).map_err(|e| FixtureError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// One test case in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    /// Test id
    pub id: String,
    /// File holding the fixture, relative to the output root
    pub json_path: PathBuf,
    /// Content hash
    pub fixture_hash: H256,
    /// Fork or network name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork: Option<String>,
    /// Format
    pub format: FixtureFormat,
}

/// Listing of every fixture written in one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureIndex {
    /// sha256 over the fixture hashes in listing order
    pub root_hash: H256,
    /// Test cases sorted by file, then id
    pub test_cases: Vec<IndexEntry>,
}

/// Shared pre-state of a group of tests, written to `pre_alloc/<hash>.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreAllocGroupFile {
    /// Fork of every member
    pub fork: Fork,
    /// Environment every member was grouped by
    pub environment: Environment,
    /// Merged pre-state
    pub pre: Alloc,
    /// Member test ids
    pub test_ids: Vec<String>,
}

/// Accumulates fixtures by output file and writes them out
#[derive(Debug, Default)]
pub struct FixtureCollector {
    output_dir: PathBuf,
    files: BTreeMap<PathBuf, BTreeMap<String, Fixture>>,
}

impl FixtureCollector {
    /// Collector writing under `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            files: BTreeMap::new(),
        }
    }

    /// Output root
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path, relative to the output root, of the file for `format` and `source`
    pub fn relative_path(format: FixtureFormat, source: &str) -> PathBuf {
        Path::new(format.output_dir()).join(format!("{}.json", source))
    }

    /// Add a fixture for test `id` from spec file `source`. A later fixture
    /// with the same id replaces the earlier one.
    pub fn add(&mut self, source: &str, id: impl Into<String>, fixture: Fixture) {
        let path = Self::relative_path(fixture.format(), source);
        self.files.entry(path).or_default().insert(id.into(), fixture);
    }

    /// Number of fixtures held
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }

    /// Whether no fixture was added
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of everything held
    pub fn index(&self) -> FixtureIndex {
        let mut concat = Vec::new();
        let mut test_cases = Vec::with_capacity(self.len());
        for (path, fixtures) in &self.files {
            for (id, fixture) in fixtures {
                concat.extend_from_slice(fixture.hash().as_bytes());
                test_cases.push(IndexEntry {
                    id: id.clone(),
                    json_path: path.clone(),
                    fixture_hash: fixture.hash(),
                    fork: fixture.fork(),
                    format: fixture.format(),
                });
            }
        }
        FixtureIndex {
            root_hash: sha256(&concat),
            test_cases,
        }
    }

    /// Write every fixture file and the index. Returns the paths written.
    pub fn write(&self) -> FixtureResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len() + 1);
        for (relative, fixtures) in &self.files {
            let path = self.output_dir.join(relative);
            write_json(&path, fixtures)?;
            tracing::info!(path = %path.display(), fixtures = fixtures.len(), "wrote fixture file");
            written.push(path);
        }
        let index = self.output_dir.join(INDEX_FILE);
        write_json(&index, &self.index())?;
        written.push(index);
        Ok(written)
    }

    /// Write one pre-allocation group file
    pub fn write_pre_alloc_group(&self, hash: &H256, group: &PreAllocGroupFile) -> FixtureResult<PathBuf> {
        let path = self
            .output_dir
            .join(PRE_ALLOC_DIR)
            .join(format!("{}.json", hash.to_hex()));
        write_json(&path, group)?;
        tracing::info!(path = %path.display(), tests = group.test_ids.len(), "wrote pre-alloc group");
        Ok(path)
    }
}
