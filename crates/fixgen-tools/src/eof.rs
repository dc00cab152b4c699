//! EOF validator tools

use crate::error::{ToolError, ToolResult};
use crate::process::{binary_name, detect_version, run};
use fixgen_eof::{validate, ContainerKind, EofError};
use fixgen_exceptions::ExceptionKind;
use std::path::PathBuf;

/// Outcome of validating one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EofVerdict {
    /// Accepted
    Valid,
    /// Rejected
    Invalid {
        /// Raw message as the tool reported it
        message: String,
        /// Canonical kind when the tool reports one directly
        exception: Option<ExceptionKind>,
    },
}

impl EofVerdict {
    /// Whether the container was accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, EofVerdict::Valid)
    }
}

/// Decides whether bytes form a valid container
pub trait EofValidator: Send + Sync {
    /// Short name, used in logs and for the exception mapper
    fn name(&self) -> &str;

    /// Version string
    fn version(&self) -> String;

    /// Validate `code` for use as `kind`
    fn validate(&self, code: &[u8], kind: ContainerKind) -> ToolResult<EofVerdict>;
}

/// In-process validator backed by `fixgen-eof`
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEofValidator;

impl EofValidator for BuiltinEofValidator {
    fn name(&self) -> &str {
        "fixgen-eof"
    }

    fn version(&self) -> String {
        format!("fixgen-eof {}", env!("CARGO_PKG_VERSION"))
    }

    fn validate(&self, code: &[u8], kind: ContainerKind) -> ToolResult<EofVerdict> {
        match validate(code, kind) {
            Ok(_) => Ok(EofVerdict::Valid),
            Err(EofError::Invalid(e)) => Ok(EofVerdict::Invalid {
                message: format!("err: {}", e.name().to_ascii_lowercase()),
                exception: Some(ExceptionKind::from(e)),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// External `eofparse` style validator: hex on stdin, `OK` or `err: <reason>` on stdout
#[derive(Debug)]
pub struct SubprocessEofValidator {
    binary: PathBuf,
    args: Vec<String>,
    name: String,
}

impl SubprocessEofValidator {
    /// Validator at `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        Self {
            name: binary_name(&binary),
            binary,
            args: Vec::new(),
        }
    }

    /// Extra arguments placed before `--initcode`
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn parse_stdout(&self, stdout: &str) -> ToolResult<EofVerdict> {
        let line = stdout.lines().map(str::trim).find(|l| !l.is_empty());
        match line {
            Some(l) if l.starts_with("OK") => Ok(EofVerdict::Valid),
            Some(l) if l.starts_with("err:") => Ok(EofVerdict::Invalid {
                message: l.to_string(),
                exception: None,
            }),
            _ => Err(ToolError::MalformedOutput {
                tool: self.name.clone(),
                reason: format!("unexpected output {:?}", stdout),
            }),
        }
    }
}

impl EofValidator for SubprocessEofValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> String {
        detect_version(&self.binary).unwrap_or_else(|| self.name.clone())
    }

    fn validate(&self, code: &[u8], kind: ContainerKind) -> ToolResult<EofVerdict> {
        let mut args = self.args.clone();
        if kind == ContainerKind::Initcode {
            args.push("--initcode".to_string());
        }
        let input = format!("{}\n", hex::encode(code)).into_bytes();
        let out = run(&self.binary, &args, input)?;
        match out.status {
            Some(0) | Some(1) => self.parse_stdout(&out.stdout),
            status => Err(ToolError::ExitStatus {
                tool: self.name.clone(),
                status,
                stderr: out.stderr,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgen_exceptions::EofException;

    #[test]
    fn test_builtin_verdicts() {
        let valid = hex::decode("ef00010100040200010001ff0000000080000000").unwrap();
        assert_eq!(BuiltinEofValidator.validate(&valid, ContainerKind::Runtime).unwrap(), EofVerdict::Valid);

        let verdict = BuiltinEofValidator.validate(&[0xef, 0x01], ContainerKind::Runtime).unwrap();
        assert_eq!(
            verdict,
            EofVerdict::Invalid {
                message: "err: invalid_magic".into(),
                exception: Some(ExceptionKind::from(EofException::InvalidMagic)),
            }
        );
    }

    #[test]
    fn test_parse_stdout() {
        let v = SubprocessEofValidator::new("eofparse");
        assert_eq!(v.parse_stdout("OK 00\n").unwrap(), EofVerdict::Valid);
        assert!(matches!(
            v.parse_stdout("\nerr: stack_underflow\n").unwrap(),
            EofVerdict::Invalid { ref message, exception: None } if message == "err: stack_underflow"
        ));
        assert!(v.parse_stdout("segfault").is_err());
    }
}
