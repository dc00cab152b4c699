//! External transition tool speaking the geth `t8n` stdin/stdout dialect

use crate::error::{ToolError, ToolResult};
use crate::process::{binary_name, detect_version, run};
use crate::t8n::{t8n_env, TransitionOutput, TransitionRequest, TransitionTool};
use fixgen_rlp::RlpStream;
use serde_json::json;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Transition tool run as a child process per block
#[derive(Debug)]
pub struct SubprocessTransitionTool {
    binary: PathBuf,
    args: Vec<String>,
    name: String,
    version: OnceLock<String>,
}

impl SubprocessTransitionTool {
    /// Tool at `binary`, invoked with the `t8n` subcommand
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        Self {
            name: binary_name(&binary),
            binary,
            args: vec!["t8n".to_string()],
            version: OnceLock::new(),
        }
    }

    /// Replace the arguments placed before the generated ones
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Override the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn command_args(&self, request: &TransitionRequest) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--input.alloc=stdin".to_string(),
            "--input.txs=stdin".to_string(),
            "--input.env=stdin".to_string(),
            "--output.result=stdout".to_string(),
            "--output.alloc=stdout".to_string(),
            format!("--state.fork={}", request.fork),
            format!("--state.chainid={}", request.chain_id),
            format!("--state.reward={}", request.reward),
        ]);
        args
    }

    fn stdin(request: &TransitionRequest) -> ToolResult<Vec<u8>> {
        let mut txs = RlpStream::new_list(request.txs.len());
        for tx in &request.txs {
            tx.rlp_append_in_block(&mut txs)?;
        }
        let input = json!({
            "alloc": request.alloc,
            "env": t8n_env(&request.env, request.fork),
            "txsRlp": format!("0x{}", hex::encode(txs.out())),
        });
        Ok(input.to_string().into_bytes())
    }
}

impl TransitionTool for SubprocessTransitionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> String {
        self.version
            .get_or_init(|| detect_version(&self.binary).unwrap_or_else(|| self.name.clone()))
            .clone()
    }

    fn evaluate(&self, request: &TransitionRequest) -> ToolResult<TransitionOutput> {
        tracing::debug!(
            tool = %self.name,
            fork = %request.fork,
            txs = request.txs.len(),
            number = request.env.number,
            "running transition tool"
        );
        let out = run(&self.binary, &self.command_args(request), Self::stdin(request)?)?;
        if out.status != Some(0) {
            return Err(ToolError::ExitStatus {
                tool: self.name.clone(),
                status: out.status,
                stderr: out.stderr,
            });
        }
        serde_json::from_str(&out.stdout).map_err(|e| ToolError::MalformedOutput {
            tool: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_forks::Fork;
    use fixgen_types::{Alloc, Environment, Transaction};

    #[test]
    fn test_command_args() {
        let tool = SubprocessTransitionTool::new("/usr/bin/evm");
        assert_eq!(tool.name(), "evm");
        let request = TransitionRequest::new(Alloc::new(), vec![], Environment::default(), Fork::Shanghai, 1);
        let args = tool.command_args(&request);
        assert_eq!(args[0], "t8n");
        assert!(args.contains(&"--state.fork=Shanghai".to_string()));
        assert!(args.contains(&"--state.reward=0".to_string()));
    }

    #[test]
    fn test_stdin_carries_rlp_transactions() {
        let tx = Transaction::default().sign().unwrap();
        let request = TransitionRequest::new(
            Alloc::new(),
            vec![tx],
            Environment::default().set_fork_requirements(Fork::Shanghai),
            Fork::Shanghai,
            1,
        );
        let stdin: serde_json::Value =
            serde_json::from_slice(&SubprocessTransitionTool::stdin(&request).unwrap()).unwrap();
        let rlp = stdin["txsRlp"].as_str().unwrap();
        assert!(rlp.starts_with("0xf8") || rlp.starts_with("0xf9"));
        assert_eq!(stdin["env"]["currentNumber"], "0x1");
    }
}
