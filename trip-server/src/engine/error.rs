//! Routing engine error types.

use std::fmt;

/// Errors from talking to the routing engine.
#[derive(Debug)]
pub enum EngineError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Engine returned an error status code
    ApiError { status: u16, message: String },

    /// Engine could not be initialised (network build failed, bad data path)
    InitFailed(String),

    /// A call did not complete within its time budget
    Timeout { operation: &'static str },

    /// Fixture data could not be loaded
    Fixture(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Http(e) => write!(f, "HTTP error: {e}"),
            EngineError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            EngineError::ApiError { status, message } => {
                write!(f, "engine error {status}: {message}")
            }
            EngineError::InitFailed(msg) => write!(f, "engine initialisation failed: {msg}"),
            EngineError::Timeout { operation } => write!(f, "engine call timed out: {operation}"),
            EngineError::Fixture(msg) => write!(f, "fixture error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::ApiError {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "engine error 500: Internal Server Error");

        let err = EngineError::Json {
            message: "expected array".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
        assert!(err.to_string().contains("expected array"));

        let err = EngineError::Timeout {
            operation: "travel_time_matrix",
        };
        assert_eq!(err.to_string(), "engine call timed out: travel_time_matrix");
    }
}
