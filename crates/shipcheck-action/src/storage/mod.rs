//! Read contract of the release storage backend
//!
//! Verification only ever reads from storage. Backends (Kubernetes Secrets,
//! ConfigMaps, SQL, ...) live outside this crate and plug in through
//! [`StorageDriver`]; [`MockStorageDriver`] keeps releases in memory for tests.

mod mock;

pub use mock::{MockStorageDriver, OperationCounts};

use async_trait::async_trait;
use shipcheck_core::Release;
use thiserror::Error;

/// Result type for storage reads
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Errors reported by a storage backend
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The requested release (or revision) does not exist
    #[error("release '{name}' not found in namespace '{namespace}'")]
    ReleaseNotFound { name: String, namespace: String },

    /// Backend request failed
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Check if this is the backend's not-found signal
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ReleaseNotFound { .. })
    }
}

/// Storage driver trait for reading release records
///
/// Names passed in are already canonicalized. Implementations must be
/// Send + Sync for use across async tasks.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Get a specific release revision
    async fn get(&self, namespace: &str, name: &str, version: u32) -> StorageResult<Release>;

    /// Get the highest revision for a name
    async fn last(&self, namespace: &str, name: &str) -> StorageResult<Release>;
}
