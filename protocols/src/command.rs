//! Spawning of external diagnostic tools.
//!
//! Arguments are always passed as a list; no shell is involved.

use std::process::Stdio;
use std::time::{Duration, Instant};

use mncreach_common::{debug, error::ToolError};
use tokio::process::Command;
use tokio::time::timeout;

const STDERR_TAIL_LINES: usize = 10;

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Runs `tool` with `args`, killing it once `limit` has passed.
///
/// A non-zero exit status is an error carrying the last lines of stderr.
pub async fn run(tool: &str, args: &[String], limit: Duration) -> Result<CommandOutput, ToolError> {
    let start = Instant::now();
    debug!("Executing: {} {:?}", tool, args);

    let mut cmd = Command::new(tool);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|source| ToolError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    // Dropping the future on timeout drops the child, which kills it.
    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ToolError::Io {
                tool: tool.to_string(),
                source,
            });
        }
        Err(_) => {
            return Err(ToolError::TimedOut {
                tool: tool.to_string(),
                elapsed: start.elapsed(),
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr_tail: tail(&stderr, STDERR_TAIL_LINES),
        });
    }

    Ok(CommandOutput {
        stdout,
        stderr,
        duration: start.elapsed(),
    })
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
