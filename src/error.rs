use thiserror::Error;

#[derive(Debug, Error)]
pub enum TpotmonError {
    // Configuration errors
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    // Network errors
    #[error("Network timeout: {0}")]
    Timeout(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited: retry after {0}s")]
    RateLimited(u64),

    #[error("Network error: {0}")]
    NetworkError(String),

    // Parse errors
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    ValidationError(String),

    // Publishing errors
    #[error("Publish rejected: {0}")]
    PublishRejected(String),

    // IO errors
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<wreq::Error> for TpotmonError {
    fn from(err: wreq::Error) -> Self {
        if err.is_timeout() {
            TpotmonError::Timeout(err.to_string())
        } else if err.is_connect() {
            TpotmonError::NetworkError(format!("Connection failed: {}", err))
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 | 403 => TpotmonError::Unauthorized(err.to_string()),
                429 => TpotmonError::RateLimited(60),
                _ => TpotmonError::NetworkError(err.to_string()),
            }
        } else {
            TpotmonError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TpotmonError {
    fn from(err: serde_json::Error) -> Self {
        TpotmonError::InvalidJson(err.to_string())
    }
}

impl From<url::ParseError> for TpotmonError {
    fn from(err: url::ParseError) -> Self {
        TpotmonError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for TpotmonError {
    fn from(err: std::io::Error) -> Self {
        TpotmonError::IoError(err.to_string())
    }
}

/// Type alias for Result with TpotmonError
pub type Result<T> = std::result::Result<T, TpotmonError>;
