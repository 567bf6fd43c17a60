//! Release targets: where a release object says its release lives
//!
//! A [`ReleaseObject`] is the controller's desired-state object. Its release
//! name, release namespace and storage namespace are resolved from optional
//! overrides, and its status records the storage namespace and snapshot
//! history of the last release the controller produced.

use serde::{Deserialize, Serialize};
use shipcheck_core::{Snapshot, Snapshots, shorten_name};

/// Desired-state object managing one release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseObject {
    /// Object name
    pub name: String,

    /// Object namespace
    pub namespace: String,

    #[serde(default)]
    pub spec: ReleaseSpec,

    #[serde(default)]
    pub status: ReleaseObjectStatus,
}

/// Optional overrides for where the release lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    #[serde(default)]
    pub release_name: Option<String>,

    #[serde(default)]
    pub target_namespace: Option<String>,

    #[serde(default)]
    pub storage_namespace: Option<String>,
}

/// Last recorded state of the release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseObjectStatus {
    /// Storage namespace used for the last release action
    #[serde(default)]
    pub storage_namespace: Option<String>,

    /// Snapshot history, newest first
    #[serde(default)]
    pub history: Snapshots,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ReleaseObject {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Release name before canonicalization
    ///
    /// Explicit release name, else `<targetNamespace>-<name>`, else the
    /// object name.
    pub fn release_name(&self) -> String {
        if let Some(name) = non_empty(&self.spec.release_name) {
            return name.to_string();
        }
        match non_empty(&self.spec.target_namespace) {
            Some(target) => format!("{}-{}", target, self.name),
            None => self.name.clone(),
        }
    }

    /// Namespace the release is applied to
    pub fn release_namespace(&self) -> &str {
        non_empty(&self.spec.target_namespace).unwrap_or(&self.namespace)
    }

    /// Namespace release records are stored in
    pub fn storage_namespace(&self) -> &str {
        non_empty(&self.spec.storage_namespace).unwrap_or(&self.namespace)
    }

    /// Snapshot of the release the controller last produced
    pub fn current(&self) -> Option<&Snapshot> {
        self.status.history.latest()
    }
}

/// Check whether the release target moved since the last recorded release
///
/// Compares the storage namespace, release namespace, canonical release name
/// and chart name against the recorded status. Without a recorded storage
/// namespace or a current snapshot there is nothing to compare against, and
/// the target is considered unchanged. A changed target means the old
/// release should be removed before acting on the new one.
pub fn release_target_changed(object: &ReleaseObject, chart_name: &str) -> bool {
    let (Some(recorded), Some(current)) =
        (non_empty(&object.status.storage_namespace), object.current())
    else {
        return false;
    };

    object.storage_namespace() != recorded
        || object.release_namespace() != current.namespace
        || shorten_name(&object.release_name()) != current.name
        || chart_name != current.chart_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(name: &str, namespace: &str, chart_name: &str) -> Snapshot {
        Snapshot {
            name: name.to_string(),
            namespace: namespace.to_string(),
            version: 1,
            status: "deployed".to_string(),
            chart_name: chart_name.to_string(),
            chart_version: "1.0.0".to_string(),
            app_version: None,
            digest: String::new(),
            config_digest: String::new(),
            first_deployed: Utc::now(),
            last_deployed: Utc::now(),
        }
    }

    fn object_with_status() -> ReleaseObject {
        let mut object = ReleaseObject::new("podinfo", "apps");
        object.status.storage_namespace = Some("apps".to_string());
        object.status.history.push(snapshot("podinfo", "apps", "podinfo"));
        object
    }

    #[test]
    fn test_name_resolution() {
        let mut object = ReleaseObject::new("podinfo", "flux-system");
        assert_eq!(object.release_name(), "podinfo");
        assert_eq!(object.release_namespace(), "flux-system");
        assert_eq!(object.storage_namespace(), "flux-system");

        object.spec.target_namespace = Some("apps".to_string());
        assert_eq!(object.release_name(), "apps-podinfo");
        assert_eq!(object.release_namespace(), "apps");
        assert_eq!(object.storage_namespace(), "flux-system");

        object.spec.release_name = Some("custom".to_string());
        object.spec.storage_namespace = Some("storage".to_string());
        assert_eq!(object.release_name(), "custom");
        assert_eq!(object.storage_namespace(), "storage");
    }

    #[test]
    fn test_empty_overrides_ignored() {
        let mut object = ReleaseObject::new("podinfo", "apps");
        object.spec.release_name = Some(String::new());
        object.spec.target_namespace = Some(String::new());
        assert_eq!(object.release_name(), "podinfo");
        assert_eq!(object.release_namespace(), "apps");
    }

    #[test]
    fn test_unchanged_target() {
        assert!(!release_target_changed(&object_with_status(), "podinfo"));
    }

    #[test]
    fn test_no_recorded_storage_namespace() {
        let mut object = object_with_status();
        object.status.storage_namespace = None;
        object.spec.target_namespace = Some("elsewhere".to_string());
        assert!(!release_target_changed(&object, "other-chart"));

        object.status.storage_namespace = Some(String::new());
        assert!(!release_target_changed(&object, "other-chart"));
    }

    #[test]
    fn test_no_current_snapshot() {
        let mut object = object_with_status();
        object.status.history = Snapshots::new();
        object.spec.storage_namespace = Some("moved".to_string());
        assert!(!release_target_changed(&object, "other-chart"));
    }

    #[test]
    fn test_storage_namespace_changed() {
        let mut object = object_with_status();
        object.spec.storage_namespace = Some("moved".to_string());
        assert!(release_target_changed(&object, "podinfo"));
    }

    #[test]
    fn test_release_namespace_changed() {
        let mut object = object_with_status();
        object.spec.target_namespace = Some("apps".to_string());
        object.spec.release_name = Some("podinfo".to_string());
        assert!(!release_target_changed(&object, "podinfo"));

        object.spec.target_namespace = Some("other".to_string());
        assert!(release_target_changed(&object, "podinfo"));
    }

    #[test]
    fn test_release_name_changed() {
        let mut object = object_with_status();
        object.spec.release_name = Some("renamed".to_string());
        assert!(release_target_changed(&object, "podinfo"));
    }

    #[test]
    fn test_long_release_name_compared_shortened() {
        let long = "a".repeat(70);
        let mut object = ReleaseObject::new("podinfo", "apps");
        object.spec.release_name = Some(long.clone());
        object.status.storage_namespace = Some("apps".to_string());
        object
            .status
            .history
            .push(snapshot(&shorten_name(&long), "apps", "podinfo"));

        assert!(!release_target_changed(&object, "podinfo"));
    }

    #[test]
    fn test_chart_name_changed() {
        assert!(release_target_changed(&object_with_status(), "podinfo-v2"));
    }
}
