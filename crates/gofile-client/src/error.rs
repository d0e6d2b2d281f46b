//! Client error types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not a valid envelope
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Well-formed envelope with a status other than "ok"
    #[error("API error: {status}")]
    ApiStatus { status: String },

    /// "ok" envelope without the payload the endpoint returns
    #[error("Response envelope has no data")]
    MissingData,

    /// Staging buffer could not be allocated
    #[error("Staging init error: {0}")]
    StagingInit(#[source] std::io::Error),

    /// Staging buffer could not be prepared for reading
    #[error("Staging seal error: {0}")]
    StagingSeal(#[source] std::io::Error),

    /// Read/write failure on the staging buffer
    #[error("Staging IO error: {0}")]
    StagingIo(#[from] std::io::Error),

    /// Upload source could not be opened or read
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    /// Build an error from a non-"ok" envelope status
    pub fn api_status(status: impl Into<String>) -> Self {
        Self::ApiStatus {
            status: status.into(),
        }
    }

    /// The service status string, if this is an API status error
    pub fn status(&self) -> Option<&str> {
        match self {
            Self::ApiStatus { status } => Some(status),
            _ => None,
        }
    }

    /// Check if the service rejected the request
    pub fn is_api_status(&self) -> bool {
        matches!(self, Self::ApiStatus { .. })
    }

    /// Check if this is a local staging failure
    pub fn is_staging(&self) -> bool {
        matches!(
            self,
            Self::StagingInit(_) | Self::StagingSeal(_) | Self::StagingIo(_)
        )
    }
}
