use std::io;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid configuration (credentials, URLs, generation params).
    /// Not recoverable within a session.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport-level HTTP failures (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Malformed JSON in a dataset or model response.
    #[error("JSON error: {0}")]
    Json(String),

    /// The language model answered with an error status or an unusable body.
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// The tabular data source could not produce a snapshot.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Represents errors originating from the transcript store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents data validation errors (e.g., invalid input format).
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        match self {
            AppError::Config(s) => AppError::Config(s.clone()),
            AppError::Io(e) => AppError::Io(io::Error::new(e.kind(), e.to_string())),
            AppError::Http(s) => AppError::Http(s.clone()),
            AppError::Json(s) => AppError::Json(s.clone()),
            AppError::Llm(s) => AppError::Llm(s.clone()),
            AppError::Dataset(s) => AppError::Dataset(s.clone()),
            AppError::Database(e) => AppError::Database(sqlx::Error::Protocol(e.to_string())),
            AppError::Validation(s) => AppError::Validation(s.clone()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_preserves_message() {
        let err = AppError::Llm("quota exceeded".to_string());
        assert_eq!(err.clone().to_string(), "LLM request failed: quota exceeded");

        let io_err = AppError::Io(io::Error::new(io::ErrorKind::NotFound, "missing.json"));
        let cloned = io_err.clone();
        assert!(matches!(cloned, AppError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Json(_)));
    }
}
