//! HTTP error types

use thiserror::Error;

/// Errors raised while issuing a request or reading a [`Response`](crate::Response)
#[derive(Debug, Error)]
pub enum HttpError {
    /// The URL could not be parsed
    #[error("Malformed URL: {0}")]
    MalformedUrl(String),
    /// Connection or I/O failure during the exchange
    #[error("Transport error: {0}")]
    Transport(String),
    /// Connect or read timeout expired
    #[error("Request timeout")]
    Timeout,
    /// The request body could not be encoded
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// A supplied header name or value is not valid HTTP
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Client build error
    #[error("Client build error: {0}")]
    Build(String),
    /// The body is not JSON, or its root is not an object
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    /// An intermediate path segment does not hold an object
    #[error("Not an object at segment {index} (\"{segment}\")")]
    PathTraversal {
        /// Key of the offending segment
        segment: String,
        /// Zero-based position of the segment in the path
        index: usize,
    },
    /// A path segment is absent
    #[error("Missing key \"{key}\" at segment {index}")]
    MissingKey {
        /// The absent key
        key: String,
        /// Zero-based position of the segment in the path
        index: usize,
    },
    /// The leaf value has a different JSON type than requested
    #[error("{actual} couldn't cast to {requested}")]
    TypeMismatch {
        /// JSON type found at the leaf
        actual: &'static str,
        /// Type the caller asked for
        requested: &'static str,
    },
    /// The response charset is not known to the decoder
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else if err.is_builder() {
            HttpError::Build(err.to_string())
        } else {
            HttpError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for HttpError {
    fn from(err: url::ParseError) -> Self {
        HttpError::MalformedUrl(err.to_string())
    }
}
