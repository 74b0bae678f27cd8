//! Errors raised by the runner itself, before or around a flow run

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// `--param` value without `=`
    #[error("invalid parameter '{0}': expected NAME=VALUE")]
    InvalidParam(String),

    /// `--param` with an empty name
    #[error("invalid parameter '{0}': name cannot be empty")]
    EmptyParamName(String),

    #[error("cannot read flow file {path}: {reason}")]
    FlowFile { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
