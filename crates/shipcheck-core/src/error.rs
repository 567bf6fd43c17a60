//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),

    #[error("Values error: {message}")]
    Values { message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors produced when parsing an `algorithm:hex` digest string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("invalid digest format '{0}': expected <algorithm>:<hex>")]
    InvalidFormat(String),

    #[error("unsupported digest algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("invalid {algorithm} digest length: expected {expected} hex characters, got {actual}")]
    InvalidLength {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid digest encoding: '{0}' is not lowercase hex")]
    InvalidEncoding(String),
}
