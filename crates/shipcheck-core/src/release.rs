//! Release records as held by a release storage backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::chart::ChartMetadata;
use crate::values::Values;

/// One applied revision of a release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Release name (already canonicalized for storage)
    pub name: String,

    /// Namespace the release is applied to
    pub namespace: String,

    /// Revision number (1-indexed, increments with each upgrade)
    pub version: u32,

    /// Current state
    pub state: ReleaseState,

    /// Chart metadata at deploy time
    pub chart: ChartMetadata,

    /// Values the release was rendered with
    pub config: Values,

    /// Rendered manifest (all resources)
    pub manifest: String,

    /// Hooks defined in this release
    #[serde(default)]
    pub hooks: Vec<Hook>,

    /// Custom labels for filtering/querying
    #[serde(default)]
    pub labels: HashMap<String, String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Human readable description of the last operation
    #[serde(default)]
    pub description: Option<String>,
}

impl Release {
    /// Create the first revision of a release
    pub fn for_install(
        name: String,
        namespace: String,
        chart: ChartMetadata,
        config: Values,
        manifest: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            name,
            namespace,
            version: 1,
            state: ReleaseState::PendingInstall { started_at: now },
            chart,
            config,
            manifest,
            hooks: Vec::new(),
            labels: HashMap::new(),
            created_at: now,
            updated_at: now,
            description: None,
        }
    }

    /// `namespace/name.vN`, for messages
    pub fn full_name(&self) -> String {
        format!("{}/{}.v{}", self.namespace, self.name, self.version)
    }

    /// Mark the release as deployed
    pub fn mark_deployed(&mut self) {
        self.state = ReleaseState::Deployed;
        self.updated_at = Utc::now();
    }
}

/// Release state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ReleaseState {
    /// Successfully deployed
    Deployed,

    /// Deployment failed
    Failed { reason: String },

    /// Release has been uninstalled
    Uninstalled,

    /// Replaced by a newer revision
    Superseded,

    /// Uninstallation in progress
    Uninstalling,

    /// Installation in progress
    #[serde(rename_all = "camelCase")]
    PendingInstall { started_at: DateTime<Utc> },

    /// Upgrade in progress
    #[serde(rename_all = "camelCase")]
    PendingUpgrade {
        started_at: DateTime<Utc>,
        previous_version: u32,
    },

    /// Rollback in progress
    #[serde(rename_all = "camelCase")]
    PendingRollback {
        started_at: DateTime<Utc>,
        target_version: u32,
    },
}

impl ReleaseState {
    /// Status name as recorded in snapshots
    pub fn status_name(&self) -> &'static str {
        match self {
            Self::Deployed => "deployed",
            Self::Failed { .. } => "failed",
            Self::Uninstalled => "uninstalled",
            Self::Superseded => "superseded",
            Self::Uninstalling => "uninstalling",
            Self::PendingInstall { .. } => "pending-install",
            Self::PendingUpgrade { .. } => "pending-upgrade",
            Self::PendingRollback { .. } => "pending-rollback",
        }
    }
}

impl std::fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed: {}", reason),
            other => write!(f, "{}", other.status_name()),
        }
    }
}

impl Default for ReleaseState {
    fn default() -> Self {
        Self::Deployed
    }
}

/// A hook resource recorded with the release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub name: String,

    /// Resource kind (Job, Pod, ...)
    pub kind: String,

    /// Template path the hook was rendered from
    pub path: String,

    /// Rendered resource
    pub manifest: String,

    /// Events this hook runs on
    #[serde(default)]
    pub events: Vec<HookEvent>,

    /// Weight for ordering (lower = runs first)
    #[serde(default)]
    pub weight: i32,

    #[serde(default)]
    pub delete_policies: Vec<HookDeletePolicy>,

    /// Outcome of the most recent execution
    #[serde(default)]
    pub last_run: Option<HookExecution>,
}

/// Hook trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    PreInstall,
    PostInstall,
    PreUpgrade,
    PostUpgrade,
    PreRollback,
    PostRollback,
    PreDelete,
    PostDelete,
    Test,
}

/// When a hook resource is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookDeletePolicy {
    BeforeHookCreation,
    HookSucceeded,
    HookFailed,
}

/// Result of executing a hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookExecution {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub succeeded: bool,
}
