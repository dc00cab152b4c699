//! Consistency sweep over written fixtures

use crate::collector::{read_json, INDEX_FILE, PRE_ALLOC_DIR};
use crate::error::{FixtureError, FixtureResult};
use crate::fixture::Fixture;
use crate::info::{content_hash, INFO_KEY};
use fixgen_block::{header_hash_from_block_rlp, FixtureBlockEntry, FixtureHeader};
use fixgen_primitives::{Bytes, H256};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// One fixture, or one file, that failed a check
#[derive(Debug)]
pub struct VerifyFailure {
    /// File
    pub path: PathBuf,
    /// Test id, `None` when the file itself is unreadable
    pub test: Option<String>,
    /// What went wrong
    pub error: FixtureError,
}

/// Outcome of a sweep
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Fixture files read
    pub files: usize,
    /// Fixtures checked
    pub fixtures: usize,
    /// Failures
    pub failures: Vec<VerifyFailure>,
}

impl VerifyReport {
    /// Whether every fixture passed
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Check every fixture file under `dir`
pub fn verify_dir(dir: &Path) -> FixtureResult<VerifyReport> {
    let mut report = VerifyReport::default();
    verify_recursive(dir, &mut report)?;
    tracing::info!(
        files = report.files,
        fixtures = report.fixtures,
        failures = report.failures.len(),
        "verified fixtures"
    );
    Ok(report)
}

fn verify_recursive(dir: &Path, report: &mut VerifyReport) -> FixtureResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| FixtureError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FixtureError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == PRE_ALLOC_DIR) {
                continue;
            }
            verify_recursive(&path, report)?;
        } else if path.extension().is_some_and(|e| e == "json")
            && !path.file_name().is_some_and(|n| n == INDEX_FILE)
        {
            verify_file(&path, report);
        }
    }
    Ok(())
}

fn verify_file(path: &Path, report: &mut VerifyReport) {
    report.files += 1;
    let fixtures: Map<String, Value> = match read_json(path) {
        Ok(map) => map,
        Err(error) => {
            report.failures.push(VerifyFailure {
                path: path.to_path_buf(),
                test: None,
                error,
            });
            return;
        }
    };

    for (id, value) in fixtures {
        report.fixtures += 1;
        if let Err(error) = verify_fixture(&value) {
            tracing::warn!(path = %path.display(), test = %id, %error, "fixture failed verification");
            report.failures.push(VerifyFailure {
                path: path.to_path_buf(),
                test: Some(id),
                error,
            });
        }
    }
}

/// Check one fixture: the recorded hash matches its content, the content
/// survives a parse and re-render unchanged, and every header hash agrees
/// with its fields and its RLP.
pub fn verify_fixture(value: &Value) -> FixtureResult<()> {
    let recorded: H256 = value
        .get(INFO_KEY)
        .and_then(|info| info.get("hash"))
        .cloned()
        .map(serde_json::from_value)
        .transpose()?
        .ok_or_else(|| FixtureError::MissingInfo("no hash".into()))?;

    let on_disk = content_hash(value);
    if on_disk != recorded {
        return Err(FixtureError::HashMismatch {
            old: recorded,
            new: on_disk,
        });
    }

    let fixture = Fixture::from_value(value.clone())?;
    let reparsed = Fixture::from_value(fixture.to_value()?)?;
    let rehashed = reparsed.compute_hash()?;
    if rehashed != recorded {
        return Err(FixtureError::HashMismatch {
            old: recorded,
            new: rehashed,
        });
    }

    match &fixture {
        Fixture::Blockchain(f) => {
            check_header("genesis", &f.genesis_block_header)?;
            check_rlp_hash("genesis", &f.genesis_rlp, 0, f.genesis_block_header.hash)?;
            for (i, entry) in f.blocks.iter().enumerate() {
                if let FixtureBlockEntry::Valid(block) = entry {
                    let index = (i + 1).to_string();
                    check_header(&index, &block.body.block_header)?;
                    check_rlp_hash(&index, &block.rlp, i + 1, block.body.block_header.hash)?;
                }
            }
        }
        Fixture::BlockchainEngine(f) => {
            check_header("genesis", &f.genesis_block_header)?;
        }
        _ => {}
    }
    Ok(())
}

fn check_header(index: &str, header: &FixtureHeader) -> FixtureResult<()> {
    if header.hash_matches() {
        return Ok(());
    }
    Err(FixtureError::HeaderHashMismatch {
        index: index.to_string(),
        recorded: header.hash,
        computed: header.header.hash(),
    })
}

fn check_rlp_hash(index: &str, rlp: &Bytes, position: usize, recorded: H256) -> FixtureResult<()> {
    let computed = header_hash_from_block_rlp(rlp).map_err(|source| FixtureError::BlockRlp {
        index: position,
        source,
    })?;
    if computed != recorded {
        return Err(FixtureError::HeaderHashMismatch {
            index: index.to_string(),
            recorded,
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eof::{EofFixture, EofVector, EofVectorResult};
    use crate::format::FixtureFormat;
    use crate::info::FixtureInfo;
    use fixgen_eof::ContainerKind;
    use std::collections::BTreeMap;

    fn sealed() -> Value {
        let vector = EofVector {
            code: Bytes::from(vec![0xef, 0x00, 0x01]),
            container_kind: ContainerKind::Runtime,
            results: BTreeMap::from([(
                "Osaka".to_string(),
                EofVectorResult {
                    result: true,
                    exception: None,
                },
            )]),
        };
        let fixture: Fixture = EofFixture {
            vectors: BTreeMap::from([("0".to_string(), vector)]),
            info: FixtureInfo::new(FixtureFormat::EofTest),
        }
        .into();
        fixture.seal().unwrap().to_value().unwrap()
    }

    // ==================== Hash ====================

    #[test]
    fn test_sealed_fixture_verifies() {
        verify_fixture(&sealed()).unwrap();
    }

    #[test]
    fn test_tampered_body() {
        let mut value = sealed();
        value["vectors"]["0"]["results"]["Osaka"]["result"] = Value::Bool(false);
        assert!(matches!(
            verify_fixture(&value),
            Err(FixtureError::HashMismatch { .. })
        ));
    }

    #[test]
    fn test_info_edit_keeps_hash() {
        let mut value = sealed();
        value[INFO_KEY]["comment"] = Value::String("edited".into());
        verify_fixture(&value).unwrap();
    }

    #[test]
    fn test_missing_hash() {
        let mut value = sealed();
        value[INFO_KEY].as_object_mut().unwrap().remove("hash");
        assert!(matches!(
            verify_fixture(&value),
            Err(FixtureError::MissingInfo(_))
        ));
    }
}
