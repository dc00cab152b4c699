//! Child process plumbing shared by the subprocess tools

use crate::error::{ToolError, ToolResult};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Captured result of one run
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run `binary` with `args`, feeding `input` on stdin and capturing both output streams
pub(crate) fn run(binary: &Path, args: &[String], input: Vec<u8>) -> ToolResult<ProcessOutput> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn {
            binary: binary.display().to_string(),
            source,
        })?;

    // stdin is written from its own thread so a chatty child cannot block on a full stdout pipe
    let writer = child.stdin.take().map(|mut pipe| {
        thread::spawn(move || match pipe.write_all(&input) {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        })
    });
    let output = child.wait_with_output()?;
    if let Some(handle) = writer {
        handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))??;
    }

    Ok(ProcessOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// First non-empty line of `binary --version`
pub(crate) fn detect_version(binary: &Path) -> Option<String> {
    let out = run(binary, &["--version".to_string()], Vec::new()).ok()?;
    out.stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Display name derived from a binary path
pub(crate) fn binary_name(binary: &Path) -> String {
    binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| binary.display().to_string())
}
