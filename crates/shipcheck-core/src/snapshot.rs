//! Snapshots: the controller's recorded fingerprint of a release it produced

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::{Algorithm, Digest};
use crate::observe::ObservedRelease;
use crate::release::Release;

/// Fingerprint of one release revision
///
/// `digest` covers the [`ObservedRelease`] encoding of the record and
/// `config_digest` the values the release was built from. Both are kept as
/// strings so a malformed value read back from persisted status is reported
/// at verification time instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Release name (canonicalized)
    pub name: String,

    /// Namespace the release is applied to
    pub namespace: String,

    /// Release revision
    pub version: u32,

    /// Release status at the time of observation
    pub status: String,

    pub chart_name: String,

    pub chart_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    /// Digest of the observed release
    pub digest: String,

    /// Digest of the input values
    pub config_digest: String,

    pub first_deployed: DateTime<Utc>,

    pub last_deployed: DateTime<Utc>,
}

impl Snapshot {
    /// Observe `release` and record its fingerprint
    pub fn from_release(
        release: &Release,
        algorithm: Algorithm,
        config_digest: &Digest,
    ) -> serde_json::Result<Self> {
        let digest = ObservedRelease::observe(release).digest(algorithm)?;
        Ok(Self {
            name: release.name.clone(),
            namespace: release.namespace.clone(),
            version: release.version,
            status: release.state.status_name().to_string(),
            chart_name: release.chart.name.clone(),
            chart_version: release.chart.version.to_string(),
            app_version: release.chart.app_version.clone(),
            digest: digest.to_string(),
            config_digest: config_digest.to_string(),
            first_deployed: release.created_at,
            last_deployed: release.updated_at,
        })
    }

    /// `namespace/name.vN`, for messages
    pub fn full_release_name(&self) -> String {
        format!("{}/{}.v{}", self.namespace, self.name, self.version)
    }
}

/// Snapshot history, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshots(pub Vec<Snapshot>);

impl Snapshots {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Most recent snapshot
    pub fn latest(&self) -> Option<&Snapshot> {
        self.0.first()
    }

    /// Snapshot of the release before the latest one
    pub fn previous(&self) -> Option<&Snapshot> {
        self.0.get(1)
    }

    /// Record a new snapshot, replacing an existing entry for the same revision
    pub fn push(&mut self, snapshot: Snapshot) {
        self.0
            .retain(|s| !(s.name == snapshot.name && s.version == snapshot.version));
        self.0.insert(0, snapshot);
    }

    /// Keep only the `max` most recent snapshots
    pub fn truncate(&mut self, max: usize) {
        self.0.truncate(max);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
