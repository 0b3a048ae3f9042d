use std::path::PathBuf;

use thiserror::Error;

/// Failures at the command-line boundary. The interpretation engine
/// itself never fails; only I/O and configuration can.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot read chart text from stdin: {0}")]
    Stdin(std::io::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse switches file {}: {source}", path.display())]
    Switches {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("month stems must be 12 stem characters (甲…癸), got {0:?}")]
    MonthStems(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
