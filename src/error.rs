use thiserror::Error;

/// Error types that can occur while loading and merging list pages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Network failures, timeouts and unexpected HTTP statuses
    #[error("Transport error: {0}")]
    TransportFailure(String),
    /// Credentials rejected by the remote source
    #[error("Auth error: {0}")]
    AuthFailure(String),
    /// Response failed structural validation
    #[error("Malformed response: {message}. Raw response: {raw_response}")]
    MalformedResponse {
        message: String,
        raw_response: String,
    },
    /// A bound continuation token moved backward relative to the loaded list
    #[error("Ordering violation: bound moved from {previous} to {next}")]
    OrderingViolation { previous: i64, next: i64 },
    /// A cancelled or stale request completed; never shown to the user
    #[error("Request #{sequence} was superseded")]
    RequestSuperseded { sequence: u64 },
    /// Invalid query or request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// Retry attempts exceeded
    #[error("Retry attempts exceeded after {attempts} tries: {last_error}")]
    RetryExceeded { attempts: usize, last_error: String },
    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn malformed(message: impl Into<String>, raw_response: impl Into<String>) -> Self {
        SyncError::MalformedResponse {
            message: message.into(),
            raw_response: raw_response.into(),
        }
    }

    /// Superseded results are swallowed by the coordinator instead of reported.
    pub fn is_superseded(&self) -> bool {
        matches!(self, SyncError::RequestSuperseded { .. })
    }
}

/// Converts reqwest HTTP errors into SyncErrors
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return SyncError::AuthFailure(err.to_string());
            }
        }
        if err.is_decode() {
            return SyncError::malformed(err.to_string(), String::new());
        }
        SyncError::TransportFailure(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::malformed(
            format!("{} at line {} column {}", err, err.line(), err.column()),
            String::new(),
        )
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::Config(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Config(err.to_string())
    }
}
