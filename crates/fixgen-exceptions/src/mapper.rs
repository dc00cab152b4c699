//! Client error message classification

use crate::clients::{table_for, ClientTable};
use crate::error::{ExceptionError, ExceptionResult};
use crate::kinds::ExceptionKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Clients with a builtin message table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// evmone t8n and eofparse
    Evmone,
    /// go-ethereum evm t8n
    Geth,
    /// Hyperledger Besu
    Besu,
    /// Nethermind
    Nethermind,
    /// reth
    Reth,
}

impl ClientKind {
    /// Every client with a builtin table
    pub const ALL: [ClientKind; 5] = [
        ClientKind::Evmone,
        ClientKind::Geth,
        ClientKind::Besu,
        ClientKind::Nethermind,
        ClientKind::Reth,
    ];

    /// Lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            ClientKind::Evmone => "evmone",
            ClientKind::Geth => "geth",
            ClientKind::Besu => "besu",
            ClientKind::Nethermind => "nethermind",
            ClientKind::Reth => "reth",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClientKind {
    type Err = ExceptionError;

    fn from_str(s: &str) -> ExceptionResult<Self> {
        ClientKind::ALL
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ExceptionError::UnknownClient(s.to_string()))
    }
}

/// Maps raw error text from one client to canonical exceptions.
///
/// Substrings are tried in table order, then regexes in table order. Text that
/// matches nothing classifies as [`ExceptionKind::Undefined`].
#[derive(Debug, Clone)]
pub struct ExceptionMapper {
    client: String,
    substrings: Vec<(ExceptionKind, String)>,
    regexes: Vec<(ExceptionKind, Regex)>,
}

impl ExceptionMapper {
    /// Build a mapper from explicit tables.
    ///
    /// A literal or pattern listed twice is rejected.
    pub fn new(
        client: impl Into<String>,
        substrings: Vec<(ExceptionKind, String)>,
        regexes: Vec<(ExceptionKind, String)>,
    ) -> ExceptionResult<Self> {
        let client = client.into();

        if let Some(literal) = first_duplicate(&substrings) {
            return Err(ExceptionError::DuplicateSubstring { client, literal });
        }
        if let Some(pattern) = first_duplicate(&regexes) {
            return Err(ExceptionError::DuplicateRegex { client, pattern });
        }

        let mut compiled = Vec::with_capacity(regexes.len());
        for (kind, pattern) in &regexes {
            let regex = Regex::new(pattern).map_err(|e| ExceptionError::InvalidRegex {
                client: client.clone(),
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            compiled.push((*kind, regex));
        }

        Ok(Self {
            client,
            substrings,
            regexes: compiled,
        })
    }

    /// Mapper with the builtin table of `client`
    pub fn for_client(client: ClientKind) -> ExceptionResult<Self> {
        let ClientTable {
            substrings,
            regexes,
        } = table_for(client);
        Self::new(
            client.name(),
            substrings.iter().map(|(k, s)| (*k, s.to_string())).collect(),
            regexes.iter().map(|(k, s)| (*k, s.to_string())).collect(),
        )
    }

    /// Client name the tables belong to
    pub fn client(&self) -> &str {
        &self.client
    }

    /// Canonical exception for a raw error message. Never fails.
    pub fn classify(&self, message: &str) -> ExceptionKind {
        if let Some((kind, _)) = self
            .substrings
            .iter()
            .find(|(_, literal)| message.contains(literal.as_str()))
        {
            return *kind;
        }
        if let Some((kind, _)) = self.regexes.iter().find(|(_, re)| re.is_match(message)) {
            return *kind;
        }
        tracing::warn!(client = %self.client, raw = message, "unmapped exception message");
        ExceptionKind::Undefined
    }

    /// A message this client would print for `kind`, if the substring table has one
    pub fn message_for(&self, kind: ExceptionKind) -> Option<&str> {
        self.substrings
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, literal)| literal.as_str())
    }

    /// Kinds with a representative message
    pub fn mapped_kinds(&self) -> impl Iterator<Item = ExceptionKind> + '_ {
        self.substrings.iter().map(|(k, _)| *k)
    }
}

fn first_duplicate(entries: &[(ExceptionKind, String)]) -> Option<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .find(|(_, text)| !seen.insert(text.as_str()))
        .map(|(_, text)| text.clone())
}
