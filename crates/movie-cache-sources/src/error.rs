use thiserror::Error;

/// Failure taxonomy of a remote movie source.
///
/// Callers see the first failure unchanged; nothing in this crate retries.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceError {
    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// The payload did not match the expected schema.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client could not be built from its settings.
    #[error("invalid source configuration: {0}")]
    Configuration(String),
}

impl SourceError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SourceError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return SourceError::Http { status: status.as_u16() };
        }
        if err.is_decode() {
            return SourceError::Decode(err.to_string());
        }
        SourceError::Network(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}
