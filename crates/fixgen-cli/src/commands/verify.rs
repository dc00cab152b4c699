//! `fixgen verify`: self-consistency sweep over written fixtures

use crate::{config::Config, output::Output, CliError};
use clap::Args;
use fixgen_fixtures::verify_dir;
use serde_json::json;
use std::path::PathBuf;

/// Verify arguments
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Fixture directory, the configured output directory when omitted
    pub dir: Option<PathBuf>,
}

impl VerifyArgs {
    /// Execute the sweep
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        let dir = self.dir.unwrap_or_else(|| config.output_dir.clone());
        if !dir.is_dir() {
            return Err(CliError::InvalidInput(format!(
                "not a directory: {}",
                dir.display()
            )));
        }

        let report = verify_dir(&dir)?;

        let mut lines = vec![format!(
            "Checked {} fixture(s) in {} file(s)",
            report.fixtures, report.files
        )];
        let mut failures = Vec::with_capacity(report.failures.len());
        for failure in &report.failures {
            let test = failure.test.as_deref().unwrap_or("-");
            lines.push(format!(
                "  FAIL {} [{}]: {}",
                failure.path.display(),
                test,
                failure.error
            ));
            failures.push(json!({
                "path": failure.path.display().to_string(),
                "test": failure.test,
                "error": failure.error.to_string(),
            }));
        }

        Output::new(json)
            .field("dir", &dir.display().to_string())
            .field_usize("files", report.files)
            .field_usize("fixtures", report.fixtures)
            .field_value("failures", json!(failures))
            .message(&lines.join("\n"))
            .print();

        if !report.is_ok() {
            return Err(CliError::VerifyFailed(report.failures.len()));
        }
        Ok(())
    }
}
