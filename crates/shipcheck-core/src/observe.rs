//! Canonical observation of a release record
//!
//! Snapshot digests are computed over an [`ObservedRelease`], a projection of
//! a [`Release`] that keeps only the fields describing what was deployed.
//! The encoding is part of the on-disk contract: a digest recorded by one
//! version of the controller must verify under every later version.
//!
//! Observed fields, in encoding order:
//!
//! | field       | source                                              |
//! |-------------|-----------------------------------------------------|
//! | `name`      | `Release::name`                                     |
//! | `namespace` | `Release::namespace`                                |
//! | `version`   | `Release::version`                                  |
//! | `status`    | `ReleaseState::status_name`                         |
//! | `chart`     | chart `name`, `version`, and `appVersion` when set  |
//! | `config`    | `Release::config` with object keys sorted           |
//! | `manifest`  | `Release::manifest`                                 |
//! | `hooks`     | every hook without its `lastRun` record             |
//! | `labels`    | `Release::labels`, sorted by key                    |
//!
//! Timestamps, the description, failure reasons and hook executions are
//! not observed. The bytes are compact JSON followed by a single newline.
//!
//! Changing this list or the encoding invalidates every recorded snapshot.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::io::Write;

use crate::chart::ChartMetadata;
use crate::digest::{Algorithm, Digest, Digester};
use crate::release::{Hook, HookDeletePolicy, HookEvent, Release};

/// The digest-relevant projection of a [`Release`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedRelease {
    pub name: String,
    pub namespace: String,
    pub version: u32,
    pub status: String,
    pub chart: ObservedChart,
    pub config: JsonValue,
    pub manifest: String,
    pub hooks: Vec<ObservedHook>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedChart {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl From<&ChartMetadata> for ObservedChart {
    fn from(chart: &ChartMetadata) -> Self {
        Self {
            name: chart.name.clone(),
            version: chart.version.to_string(),
            app_version: chart.app_version.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedHook {
    pub name: String,
    pub kind: String,
    pub path: String,
    pub manifest: String,
    pub events: Vec<HookEvent>,
    pub weight: i32,
    pub delete_policies: Vec<HookDeletePolicy>,
}

impl From<&Hook> for ObservedHook {
    fn from(hook: &Hook) -> Self {
        Self {
            name: hook.name.clone(),
            kind: hook.kind.clone(),
            path: hook.path.clone(),
            manifest: hook.manifest.clone(),
            events: hook.events.clone(),
            weight: hook.weight,
            delete_policies: hook.delete_policies.clone(),
        }
    }
}

impl ObservedRelease {
    /// Project a release onto its observed fields
    pub fn observe(release: &Release) -> Self {
        Self {
            name: release.name.clone(),
            namespace: release.namespace.clone(),
            version: release.version,
            status: release.state.status_name().to_string(),
            chart: ObservedChart::from(&release.chart),
            config: release.config.canonical(),
            manifest: release.manifest.clone(),
            hooks: release.hooks.iter().map(ObservedHook::from).collect(),
            labels: release
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Write the canonical encoding
    pub fn encode<W: Write>(&self, mut writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(&mut writer, self)?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)
    }

    /// Digest of the canonical encoding
    pub fn digest(&self, algorithm: Algorithm) -> serde_json::Result<Digest> {
        let mut digester = Digester::new(algorithm);
        self.encode(&mut digester)?;
        Ok(digester.finish())
    }
}
