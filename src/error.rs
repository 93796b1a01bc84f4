//! Kaiju error types

/// Kaiju error types
#[derive(Debug, thiserror::Error)]
pub enum KaijuError {
    // Remote/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode admin response: {0}")]
    Decode(String),

    #[error("admin client is closed")]
    ClientClosed,

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Lifecycle errors
    #[error("refresh loop is already running")]
    AlreadyRunning,
}

impl KaijuError {
    /// Whether the error is likely to clear up on its own by the next tick.
    ///
    /// Transport failures and server-side (5xx) errors are transient; client
    /// errors, decode failures and configuration problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            KaijuError::Http(_) => true,
            KaijuError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for KaijuError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            KaijuError::Decode(err.to_string())
        } else {
            KaijuError::Http(err.to_string())
        }
    }
}

/// Result type alias for Kaiju operations
pub type Result<T> = std::result::Result<T, KaijuError>;
