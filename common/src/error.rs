use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// File level failures. Anything that goes wrong inside a single row is
/// logged and absorbed by the enricher instead.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("input file not found: {}", .0.display())]
    InputFileMissing(PathBuf),

    #[error("invalid CSV format near line {line}: {reason}")]
    InputFileMalformed { line: u64, reason: String },

    #[error("required column '{0}' is missing from the header")]
    MissingColumn(String),

    #[error("failed to write output: {0}")]
    Output(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnrichError {
    /// Problems with the input file are reported to the user and end the run
    /// quietly; every other variant is a real failure.
    pub fn is_input_problem(&self) -> bool {
        matches!(
            self,
            Self::InputFileMissing(_) | Self::InputFileMalformed { .. } | Self::MissingColumn(_)
        )
    }
}

/// Failures of an external diagnostic command.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("refusing to pass '{0}' to an external tool")]
    InvalidArgument(String),

    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} timed out after {}ms", .elapsed.as_millis())]
    TimedOut { tool: String, elapsed: Duration },

    #[error("{tool} exited with {code:?}: {stderr_tail}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("io error while reading {tool} output: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}
