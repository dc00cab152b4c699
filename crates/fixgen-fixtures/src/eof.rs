//! `eof_test` fixtures

use crate::info::FixtureInfo;
use fixgen_eof::ContainerKind;
use fixgen_exceptions::ExceptionKind;
use fixgen_primitives::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected verdict for one fork
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EofVectorResult {
    /// Whether the container is valid
    pub result: bool,
    /// Reason when invalid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionKind>,
}

/// One container and its verdicts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EofVector {
    /// Container bytes
    pub code: Bytes,
    /// How the container is used
    #[serde(default)]
    pub container_kind: ContainerKind,
    /// Verdicts by fork name
    pub results: BTreeMap<String, EofVectorResult>,
}

/// `eof_test` fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EofFixture {
    /// Vectors by position
    pub vectors: BTreeMap<String, EofVector>,
    /// Metadata
    #[serde(rename = "_info")]
    pub info: FixtureInfo,
}
