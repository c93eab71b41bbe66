// ABOUTME: Application-wide error types for kit-deployer.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::deploy::DeployError;
use crate::store::StoreError;
use crate::types::ParseImageReferenceError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid image reference: {0}")]
    InvalidImage(#[from] ParseImageReferenceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("deployment did not finish within {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
