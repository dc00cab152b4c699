//! Collaborators shared by every fill

use fixgen_exceptions::ExceptionMapper;
use fixgen_tools::{EofValidator, TransitionTool};
use std::sync::Arc;

/// Default chain id
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Tools, mappers and settings injected into the orchestrator.
///
/// Built once per run and shared read-only across workers.
#[derive(Clone)]
pub struct FillContext {
    t8n: Arc<dyn TransitionTool>,
    eof: Arc<dyn EofValidator>,
    t8n_mapper: Arc<ExceptionMapper>,
    eof_mapper: Arc<ExceptionMapper>,
    t8n_version: String,
    eof_version: String,
    /// Chain id for configs and the transition tool
    pub chain_id: u64,
    /// Fail on header fields the fork forbids instead of dropping them
    pub strict: bool,
}

impl FillContext {
    /// Context around a transition tool and an EOF validator, each with the
    /// mapper for its message dialect
    pub fn new(
        t8n: Arc<dyn TransitionTool>,
        t8n_mapper: ExceptionMapper,
        eof: Arc<dyn EofValidator>,
        eof_mapper: ExceptionMapper,
    ) -> Self {
        let t8n_version = t8n.version();
        let eof_version = eof.version();
        tracing::info!(t8n = %t8n_version, eof = %eof_version, "tools ready");
        Self {
            t8n,
            eof,
            t8n_mapper: Arc::new(t8n_mapper),
            eof_mapper: Arc::new(eof_mapper),
            t8n_version,
            eof_version,
            chain_id: DEFAULT_CHAIN_ID,
            strict: false,
        }
    }

    /// Set the chain id
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set strict header validation
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Transition tool
    pub fn t8n(&self) -> &dyn TransitionTool {
        self.t8n.as_ref()
    }

    /// EOF validator
    pub fn eof(&self) -> &dyn EofValidator {
        self.eof.as_ref()
    }

    /// Mapper for transition tool messages
    pub fn t8n_mapper(&self) -> &ExceptionMapper {
        &self.t8n_mapper
    }

    /// Mapper for EOF validator messages
    pub fn eof_mapper(&self) -> &ExceptionMapper {
        &self.eof_mapper
    }

    /// Transition tool version, as recorded in `_info`
    pub fn t8n_version(&self) -> &str {
        &self.t8n_version
    }

    /// EOF validator version, as recorded in `_info`
    pub fn eof_version(&self) -> &str {
        &self.eof_version
    }
}

impl std::fmt::Debug for FillContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillContext")
            .field("t8n", &self.t8n.name())
            .field("eof", &self.eof.name())
            .field("t8n_mapper", &self.t8n_mapper.client())
            .field("eof_mapper", &self.eof_mapper.client())
            .field("chain_id", &self.chain_id)
            .field("strict", &self.strict)
            .finish()
    }
}
