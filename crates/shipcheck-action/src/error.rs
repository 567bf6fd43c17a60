//! Error types for shipcheck-action
//!
//! Every variant except [`VerifyError::Storage`] and [`VerifyError::Encode`]
//! is a verdict about the release. Those two are infrastructure failures
//! and the check should be retried.

use shipcheck_core::DigestError;
use thiserror::Error;

use crate::storage::StorageError;

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Outcome of a failed verification
#[derive(Debug, Error)]
pub enum VerifyError {
    /// No release exists where one was expected
    #[error("no release found")]
    ReleaseNotFound,

    /// A previously observed release revision is gone from storage
    #[error("release '{name}' disappeared from storage")]
    ReleaseDisappeared { name: String },

    /// The snapshot digest could not be parsed
    #[error("release digest verification error: {0}")]
    ReleaseDigest(#[source] DigestError),

    /// The stored release does not hash to the snapshot digest
    #[error("release '{name}' (v{version}) not observed to be made for object")]
    ReleaseNotObserved { name: String, version: u32 },

    /// Chart name or version differs from the release's chart
    #[error("release chart changed from {actual} to {expected}")]
    ChartChanged { expected: String, actual: String },

    /// Values do not hash to the snapshot config digest
    #[error("release config values changed")]
    ConfigDigest,

    /// The observed release could not be encoded
    #[error("failed to encode observed release: {0}")]
    Encode(#[source] serde_json::Error),

    /// Storage backend failure, passed through unchanged
    #[error(transparent)]
    Storage(StorageError),
}

/// Failure loading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Classified verification outcome, used to pick the next release action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NotFound,
    Disappeared,
    Unverifiable,
    Unobserved,
    ChartChanged,
    ConfigChanged,
}

impl VerifyError {
    /// The verdict this error represents, or `None` for infrastructure failures
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            VerifyError::ReleaseNotFound => Some(Verdict::NotFound),
            VerifyError::ReleaseDisappeared { .. } => Some(Verdict::Disappeared),
            VerifyError::ReleaseDigest(_) => Some(Verdict::Unverifiable),
            VerifyError::ReleaseNotObserved { .. } => Some(Verdict::Unobserved),
            VerifyError::ChartChanged { .. } => Some(Verdict::ChartChanged),
            VerifyError::ConfigDigest => Some(Verdict::ConfigChanged),
            VerifyError::Encode(_) | VerifyError::Storage(_) => None,
        }
    }

    /// Check if the failure should be retried rather than acted upon
    pub fn is_transient(&self) -> bool {
        self.verdict().is_none()
    }

    /// Check if the release has drifted from the requested chart or values
    pub fn is_drift(&self) -> bool {
        matches!(
            self.verdict(),
            Some(Verdict::ChartChanged | Verdict::ConfigChanged)
        )
    }
}
