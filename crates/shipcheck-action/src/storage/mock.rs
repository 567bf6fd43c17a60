//! Mock storage driver for testing
//!
//! This driver stores releases in memory, useful for unit tests
//! without a real storage backend. Records are filed under the storage
//! namespace they are written to, which need not be the namespace the
//! release is applied to.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{StorageDriver, StorageError, StorageResult};
use shipcheck_core::Release;

type Store = HashMap<String, HashMap<String, HashMap<u32, Release>>>;

/// In-memory storage driver for testing
#[derive(Clone, Default)]
pub struct MockStorageDriver {
    /// Storage: namespace -> name -> version -> release
    store: Arc<RwLock<Store>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
    /// When set, every read fails with this backend error
    failure: Arc<RwLock<Option<String>>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub lasts: usize,
    pub writes: usize,
}

impl OperationCounts {
    /// Total backend reads
    pub fn reads(&self) -> usize {
        self.gets + self.lasts
    }
}

impl MockStorageDriver {
    /// Create a new empty mock driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with releases pre-populated in `namespace`
    pub fn with_releases(namespace: &str, releases: Vec<Release>) -> Self {
        let driver = Self::new();
        for release in releases {
            driver.put(namespace, release);
        }
        driver.reset_counts();
        driver
    }

    /// Insert or replace a release revision in storage namespace `namespace`
    pub fn put(&self, namespace: &str, release: Release) {
        self.operations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .writes += 1;

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(namespace.to_string())
            .or_default()
            .entry(release.name.clone())
            .or_default()
            .insert(release.version, release);
    }

    /// Remove a release revision, returning it if present
    pub fn remove(&self, namespace: &str, name: &str, version: u32) -> Option<Release> {
        self.operations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .writes += 1;

        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(namespace)
            .and_then(|ns| ns.get_mut(name))
            .and_then(|versions| versions.remove(&version))
    }

    /// Make every subsequent read fail with a backend error
    pub fn fail_reads(&self, message: impl Into<String>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    /// Clear an injected read failure
    pub fn clear_failure(&self) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        *self.operations.write().unwrap_or_else(PoisonError::into_inner) =
            OperationCounts::default();
    }

    fn check_failure(&self) -> StorageResult<()> {
        match self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(message) => Err(StorageError::Backend(message.clone())),
            None => Ok(()),
        }
    }

    fn not_found(namespace: &str, name: &str) -> StorageError {
        StorageError::ReleaseNotFound {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

#[async_trait]
impl StorageDriver for MockStorageDriver {
    async fn get(&self, namespace: &str, name: &str, version: u32) -> StorageResult<Release> {
        self.operations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .gets += 1;
        self.check_failure()?;

        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .and_then(|versions| versions.get(&version))
            .cloned()
            .ok_or_else(|| Self::not_found(namespace, name))
    }

    async fn last(&self, namespace: &str, name: &str) -> StorageResult<Release> {
        self.operations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .lasts += 1;
        self.check_failure()?;

        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        store
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .and_then(|versions| versions.values().max_by_key(|r| r.version))
            .cloned()
            .ok_or_else(|| Self::not_found(namespace, name))
    }
}
