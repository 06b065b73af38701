use thiserror::Error;

/// Error type covering every failure mode of the client.
///
/// `Validation`, `Config` and `DuplicateContent` are raised locally before
/// any network I/O and are never retried. `Auth` covers both a failed token
/// exchange and a write attempted without write credentials. `Upstream`
/// carries the HTTP status of a non-2xx response, or the collapsed
/// `{json:{errors:[...]}}` envelope Reddit returns inside a 2xx body.
#[derive(Error, Debug)]
pub enum RedditError {
    #[error("invalid {label}: {reason}")]
    Validation { label: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("duplicate content rejected: {0}")]
    DuplicateContent(String),

    #[error("reddit API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RedditError {
    pub(crate) fn validation(label: &str, reason: impl Into<String>) -> Self {
        RedditError::Validation {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RedditError>;
