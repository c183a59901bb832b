use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobContextError {
    #[error("Job context file not found: {path}")]
    ContextFileNotFound { path: String },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Job context envelope is not a JSON object: {message}")]
    InvalidEnvelope { message: String },

    #[error("Job context envelope is missing string field '{field}'")]
    MissingPayloadField { field: String },

    #[error("Job context payload is not valid base64: {source}")]
    InvalidBase64 { source: base64::DecodeError },

    #[error("Decoded job context is invalid: {source}")]
    InvalidContext { source: serde_json::Error },

    #[error("Failed to serialize job context: {source}")]
    Serialize { source: serde_json::Error },

    #[error("Config file {} is not valid UTF-8", .path.display())]
    NonUtf8Config { path: PathBuf },

    #[error("Invalid {what}: '{value}'")]
    InvalidInput { what: &'static str, value: String },
}

impl JobContextError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        JobContextError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, JobContextError>;
