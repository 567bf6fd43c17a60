//! Shipcheck Core - data model for release verification
//!
//! This crate provides the foundational types used throughout Shipcheck:
//! - `Release`: A stored release record
//! - `Snapshot`: The controller's fingerprint of a release it produced
//! - `Digest`: Algorithm-tagged content hashes
//! - `ObservedRelease`: The canonical projection snapshot digests cover
//! - `Values`: Configuration values with canonical digests
//! - `shorten_name`: Release name canonicalization

pub mod chart;
pub mod digest;
pub mod error;
pub mod name;
pub mod observe;
pub mod release;
pub mod snapshot;
pub mod values;

pub use chart::ChartMetadata;
pub use digest::{Algorithm, Digest, Digester, Verifier};
pub use error::{CoreError, DigestError, Result};
pub use name::{MAX_RELEASE_NAME_LENGTH, shorten_name};
pub use observe::{ObservedChart, ObservedHook, ObservedRelease};
pub use release::{Hook, HookDeletePolicy, HookEvent, HookExecution, Release, ReleaseState};
pub use snapshot::{Snapshot, Snapshots};
pub use values::Values;
