//! Shipcheck Action - release verification for a delivery controller
//!
//! This crate provides:
//! - **Target comparison**: Detect a release object pointing at a new release target
//! - **Release lookup**: Last-revision and existence checks by release name
//! - **Snapshot verification**: Confirm a stored release is the one a snapshot was taken of
//! - **Drift checks**: Confirm chart and values still match a release
//! - **Storage contract**: The read-only interface to a release storage backend

pub mod config;
pub mod error;
pub mod lookup;
pub mod storage;
pub mod target;
pub mod verify;

pub use config::{Configuration, Settings};
pub use error::{Result, SettingsError, Verdict, VerifyError};
pub use lookup::{is_installed, last_release};
pub use storage::{MockStorageDriver, OperationCounts, StorageDriver, StorageError, StorageResult};
pub use target::{ReleaseObject, ReleaseObjectStatus, ReleaseSpec, release_target_changed};
pub use verify::{verify_last_storage_item, verify_release, verify_release_object, verify_snapshot};
