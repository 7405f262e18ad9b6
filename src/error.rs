// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for jarclient
//!
//! Only caller-side mistakes are returned as errors. Transport failures are
//! reported through the completion callback as a 59x status instead.

use thiserror::Error;

/// Result type alias for jarclient operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jarclient
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Another error wrapped with the operation that raised it
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Url(_))
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            match err {
                Error::Config(inner) => Error::Config(format!("{}: {}", msg, inner)),
                other => Error::Other(format!("{}: {}", msg, other)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = Error::config("timeout must not be negative");
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: timeout must not be negative"
        );
    }

    #[test]
    fn test_url_error_is_config() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert!(err.is_config());
    }

    #[test]
    fn test_context_keeps_kind() {
        let res: std::result::Result<(), Error> = Err(Error::config("bad timeout"));
        let err = res.context("reading environment").unwrap_err();
        assert!(err.is_config());
        assert!(matches!(err, Error::Config(ref m) if m == "reading environment: bad timeout"));

        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = res.context("reading jar").unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        assert!(err.to_string().starts_with("reading jar: I/O error"));
    }
}
