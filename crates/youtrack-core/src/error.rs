//! Error types for mcp-youtrack.

use thiserror::Error;

/// Main error type for tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication failed (401/403)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Issue, field, or other entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Map a non-success HTTP status and response body to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Error::Auth(message),
            404 => Error::NotFound(message),
            _ => Error::Api { status, message },
        }
    }
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_auth() {
        assert!(matches!(
            Error::from_status(401, "bad token".into()),
            Error::Auth(_)
        ));
        assert!(matches!(
            Error::from_status(403, "forbidden".into()),
            Error::Auth(_)
        ));
    }

    #[test]
    fn test_from_status_not_found() {
        let err = Error::from_status(404, "Entity with id DEMO-999 not found".into());
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("DEMO-999"));
    }

    #[test]
    fn test_from_status_other() {
        match Error::from_status(400, "Invalid query".into()) {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid query");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
