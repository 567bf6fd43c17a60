//! Verification of stored releases against recorded snapshots
//!
//! [`verify_snapshot`] and [`verify_last_storage_item`] confirm the stored
//! record is exactly the one a snapshot was taken of. [`verify_release`]
//! then checks the chart and values a release is about to be reconciled
//! with still match it.

use shipcheck_core::{ChartMetadata, Digest, ObservedRelease, Release, Snapshot, Values};

use crate::config::Configuration;
use crate::error::{Result, VerifyError};
use crate::storage::StorageError;

fn disappeared(snapshot: &Snapshot, e: StorageError) -> VerifyError {
    if e.is_not_found() {
        tracing::debug!(release = %snapshot.full_release_name(), "release disappeared from storage");
        VerifyError::ReleaseDisappeared {
            name: snapshot.name.clone(),
        }
    } else {
        VerifyError::Storage(e)
    }
}

/// Verify the exact revision named by `snapshot` is still in storage, unchanged
///
/// Returns the verified release.
pub async fn verify_snapshot(
    config: &Configuration,
    snapshot: Option<&Snapshot>,
) -> Result<Release> {
    let snapshot = snapshot.ok_or(VerifyError::ReleaseNotFound)?;

    let release = config
        .driver
        .get(&config.storage_namespace, &snapshot.name, snapshot.version)
        .await
        .map_err(|e| disappeared(snapshot, e))?;

    verify_release_object(snapshot, &release)?;
    Ok(release)
}

/// Verify the latest stored revision is the one `snapshot` was taken of
///
/// Returns the verified release.
pub async fn verify_last_storage_item(
    config: &Configuration,
    snapshot: Option<&Snapshot>,
) -> Result<Release> {
    let snapshot = snapshot.ok_or(VerifyError::ReleaseNotFound)?;

    let release = config
        .driver
        .last(&config.storage_namespace, &snapshot.name)
        .await
        .map_err(|e| disappeared(snapshot, e))?;

    verify_release_object(snapshot, &release)?;
    Ok(release)
}

/// Verify `release` hashes to the snapshot's digest
///
/// The observed encoding is streamed straight into a verifier for the
/// snapshot's algorithm. An encoding failure is returned as
/// [`VerifyError::Encode`].
pub fn verify_release_object(snapshot: &Snapshot, release: &Release) -> Result<()> {
    let digest = Digest::parse(&snapshot.digest).map_err(VerifyError::ReleaseDigest)?;

    let mut verifier = digest.verifier();
    ObservedRelease::observe(release)
        .encode(&mut verifier)
        .map_err(VerifyError::Encode)?;

    if !verifier.verified() {
        tracing::warn!(
            release = %release.full_name(),
            expected = %snapshot.digest,
            "release does not match snapshot digest"
        );
        return Err(VerifyError::ReleaseNotObserved {
            name: release.name.clone(),
            version: release.version,
        });
    }

    tracing::debug!(release = %release.full_name(), "release matches snapshot digest");
    Ok(())
}

/// Verify `release` was built from `chart` and `values`
///
/// The chart is compared by name and version when given. The values are
/// hashed with the algorithm of the snapshot's config digest. A chart change
/// is reported before a values change.
pub fn verify_release(
    release: Option<&Release>,
    snapshot: Option<&Snapshot>,
    chart: Option<&ChartMetadata>,
    values: &Values,
) -> Result<()> {
    let release = release.ok_or(VerifyError::ReleaseNotFound)?;

    if let Some(chart) = chart {
        if !release.chart.same_chart(chart) {
            return Err(VerifyError::ChartChanged {
                expected: chart.versioned_name(),
                actual: release.chart.versioned_name(),
            });
        }
    }

    let config_matches = snapshot
        .and_then(|s| Digest::parse(&s.config_digest).ok())
        .is_some_and(|digest| values.verify(&digest));
    if !config_matches {
        return Err(VerifyError::ConfigDigest);
    }

    Ok(())
}
