//! `fixgen fill`: turn spec files into fixtures

use crate::{config::Config, output::Output, CliError};
use clap::Args;
use fixgen_exceptions::{ClientKind, ExceptionMapper};
use fixgen_fixtures::FixtureCollector;
use fixgen_specs::{collect_spec_files, FillContext, FillJob, FillRunner};
use fixgen_tools::{
    BuiltinEofValidator, EofValidator, SubprocessEofValidator, SubprocessTransitionTool,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Fill arguments; flags override the config file
#[derive(Debug, Args)]
pub struct FillArgs {
    /// Spec files or directories holding them
    #[arg(required = true)]
    pub specs: Vec<PathBuf>,

    /// Fixture output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Transition tool binary
    #[arg(long)]
    pub t8n: Option<PathBuf>,

    /// Argument passed to the transition tool before the generated ones (repeatable)
    #[arg(long = "t8n-arg", allow_hyphen_values = true)]
    pub t8n_args: Vec<String>,

    /// Client whose error messages the transition tool prints
    #[arg(long)]
    pub t8n_client: Option<String>,

    /// EOF validator binary; the builtin validator is used when unset
    #[arg(long)]
    pub eof_tool: Option<PathBuf>,

    /// Chain ID
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// Worker threads, zero for one per core
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Skip remaining fills after the first failure
    #[arg(long)]
    pub stop_on_first_error: bool,

    /// Fail on header fields the fork forbids
    #[arg(long)]
    pub strict: bool,

    /// Write pre-allocation group files next to the fixtures
    #[arg(long)]
    pub pre_alloc_groups: bool,
}

impl FillArgs {
    /// Fold the flags into `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(t8n) = &self.t8n {
            config.t8n.path = Some(t8n.clone());
        }
        if !self.t8n_args.is_empty() {
            config.t8n.args = self.t8n_args.clone();
        }
        if let Some(client) = &self.t8n_client {
            config.t8n.client = client.clone();
        }
        if let Some(eof_tool) = &self.eof_tool {
            config.eof.path = Some(eof_tool.clone());
        }
        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        config.stop_on_first_error |= self.stop_on_first_error;
        config.strict |= self.strict;
        config.pre_alloc_groups |= self.pre_alloc_groups;
    }

    /// Execute the fill
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let ctx = build_context(config)?;

        let files = collect_spec_files(&self.specs)?;
        if files.is_empty() {
            return Err(CliError::InvalidInput(
                "no spec files found in the given paths".to_string(),
            ));
        }
        let mut jobs = Vec::new();
        for file in &files {
            jobs.extend(FillJob::from_file(file)?);
        }
        tracing::info!(
            files = files.len(),
            tests = jobs.len(),
            chain_id = config.chain_id,
            workers = config.workers,
            stop_on_first_error = config.stop_on_first_error,
            output = %config.output_dir.display(),
            "filling"
        );

        let mut runner = FillRunner::new(ctx)
            .with_workers(config.workers)
            .stop_on_first_error(config.stop_on_first_error);
        if config.pre_alloc_groups {
            runner = runner.with_pre_alloc_groups(config.pre_alloc_salt.clone());
        }
        let report = runner.run(&jobs)?;

        let mut collector = FixtureCollector::new(&config.output_dir);
        for filled in report.fixtures {
            collector.add(&filled.source, filled.id, filled.fixture);
        }
        let written = collector.write()?;

        let mut group_files = 0;
        if let Some(groups) = report.groups {
            for (hash, group) in groups.into_files() {
                collector.write_pre_alloc_group(&hash, &group)?;
                group_files += 1;
            }
        }

        let stats = report.stats;
        if !json {
            stats.print_summary();
        }
        let failures: Vec<_> = stats
            .failures
            .iter()
            .map(|(id, error)| json!({ "test": id, "error": error }))
            .collect();
        Output::new(json)
            .field("output", &config.output_dir.display().to_string())
            .field_usize("files", written.len())
            .field_usize("pre_alloc_groups", group_files)
            .field_usize("filled", stats.filled)
            .field_usize("failed", stats.failed)
            .field_usize("skipped", stats.skipped)
            .field_value("failures", json!(failures))
            .message(&format!(
                "Wrote {} fixture file(s) to {}",
                written.len(),
                config.output_dir.display()
            ))
            .print();

        if stats.failed > 0 {
            return Err(CliError::FillFailed(stats.failed));
        }
        Ok(())
    }
}

/// Tools and mappers described by `config`
fn build_context(config: &Config) -> Result<FillContext, CliError> {
    let t8n_path = config.t8n.path.clone().ok_or_else(|| {
        CliError::InvalidInput(
            "no transition tool configured: pass --t8n or set t8n.path in the config".to_string(),
        )
    })?;
    let mut t8n = SubprocessTransitionTool::new(t8n_path);
    if !config.t8n.args.is_empty() {
        t8n = t8n.with_args(config.t8n.args.clone());
    }

    let eof: Arc<dyn EofValidator> = match &config.eof.path {
        Some(path) => {
            let mut validator = SubprocessEofValidator::new(path.clone());
            if !config.eof.args.is_empty() {
                validator = validator.with_args(config.eof.args.clone());
            }
            Arc::new(validator)
        }
        None => Arc::new(BuiltinEofValidator),
    };

    let t8n_mapper = ExceptionMapper::for_client(config.t8n.client.parse::<ClientKind>()?)?;
    let eof_mapper = ExceptionMapper::for_client(config.eof.client.parse::<ClientKind>()?)?;

    Ok(FillContext::new(Arc::new(t8n), t8n_mapper, eof, eof_mapper)
        .with_chain_id(config.chain_id)
        .with_strict(config.strict))
}
