use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Could not reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl BackendError {
    /// Short tag for log lines; callers only ever show the `Display` text.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Transport(e) if e.is_timeout() => "timeout",
            BackendError::Transport(_) => "transport",
            BackendError::Status { .. } => "status",
            BackendError::Decode(_) => "decode",
            BackendError::InvalidBaseUrl { .. } => "config",
        }
    }
}
