use reqwest::StatusCode;
use thiserror::Error;

/// Why a question could not be answered.
///
/// The user only ever sees [`crate::ERROR_MESSAGE`]; the variants exist so the
/// cause still reaches the log.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("answer service returned status {0}")]
    Status(StatusCode),

    #[error("malformed answer body: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

impl AskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AskError::Transport(e) if e.is_timeout())
    }
}
