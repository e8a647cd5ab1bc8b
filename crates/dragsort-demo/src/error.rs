#![forbid(unsafe_code)]

use std::path::PathBuf;

use dragsort_runtime::ConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config file not found: {path}")]
    MissingConfig { path: PathBuf },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{message}")]
    Exit { code: i32, message: String },
}

impl DemoError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn exit(code: i32, message: impl Into<String>) -> Self {
        Self::Exit {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 2,
            Self::MissingConfig { .. } | Self::Config(_) => 3,
            Self::Json(_) => 4,
            Self::Exit { code, .. } => *code,
        }
    }
}
