use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Network unreachable, connection refused or request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// The API answered with a non-success status
    #[error("Server returned status {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body could not be decoded into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

}

impl AppError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Server { .. } => "SERVER_ERROR",
            AppError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Whether this is one of the request failures the search client
    /// collapses into an empty result state
    pub fn is_search_failure(&self) -> bool {
        matches!(
            self,
            AppError::Transport(_) | AppError::Server { .. } | AppError::MalformedResponse(_)
        )
    }
}

/// Conversion from reqwest::Error
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AppError::Transport(format!("Failed to connect to catalog API: {}", err))
        } else if err.is_decode() {
            AppError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Server {
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
