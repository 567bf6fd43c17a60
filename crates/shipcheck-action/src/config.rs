//! Verification settings and the storage handle operations run against

use serde::{Deserialize, Serialize};
use shipcheck_core::{Algorithm, Release, Snapshot, Values};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, SettingsError, VerifyError};
use crate::storage::StorageDriver;

/// Tunables, loadable from YAML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Algorithm used for newly recorded snapshot digests
    #[serde(default)]
    pub digest_algorithm: Algorithm,
}

impl Settings {
    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load settings from a YAML file
    pub fn load_from(path: &Path) -> std::result::Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}

/// Storage handle scoped to one storage namespace
#[derive(Clone)]
pub struct Configuration {
    pub driver: Arc<dyn StorageDriver>,
    pub storage_namespace: String,
    pub settings: Settings,
}

impl Configuration {
    pub fn new(driver: Arc<dyn StorageDriver>, storage_namespace: impl Into<String>) -> Self {
        Self {
            driver,
            storage_namespace: storage_namespace.into(),
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Record a snapshot of `release` built from `values`
    ///
    /// Both digests use the configured algorithm.
    pub fn snapshot(&self, release: &Release, values: &Values) -> Result<Snapshot> {
        let algorithm = self.settings.digest_algorithm;
        let config_digest = values.digest(algorithm).map_err(VerifyError::Encode)?;
        Snapshot::from_release(release, algorithm, &config_digest).map_err(VerifyError::Encode)
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("storage_namespace", &self.storage_namespace)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockStorageDriver;
    use shipcheck_core::{ChartMetadata, Digest};
    use std::io::Write;

    #[test]
    fn test_settings_default() {
        let settings = Settings::from_yaml("{}").unwrap();
        assert_eq!(settings.digest_algorithm, Algorithm::Sha256);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_from_yaml() {
        let settings = Settings::from_yaml("digestAlgorithm: sha512\n").unwrap();
        assert_eq!(settings.digest_algorithm, Algorithm::Sha512);

        assert!(Settings::from_yaml("digestAlgorithm: md5\n").is_err());
    }

    #[test]
    fn test_settings_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "digestAlgorithm: sha384").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.digest_algorithm, Algorithm::Sha384);

        let missing = Settings::load_from(Path::new("/nonexistent/shipcheck.yaml"));
        assert!(matches!(missing, Err(SettingsError::Io(_))));
    }

    #[test]
    fn test_snapshot_uses_configured_algorithm() {
        let config = Configuration::new(Arc::new(MockStorageDriver::new()), "default")
            .with_settings(Settings {
                digest_algorithm: Algorithm::Sha512,
            });

        let mut release = Release::for_install(
            "app".to_string(),
            "default".to_string(),
            ChartMetadata::parse("app-chart", "1.0.0").unwrap(),
            Values::new(),
            String::new(),
        );
        release.mark_deployed();

        let values = Values::from_json(r#"{"replicas":2}"#).unwrap();
        let snapshot = config.snapshot(&release, &values).unwrap();

        assert_eq!(
            Digest::parse(&snapshot.digest).unwrap().algorithm(),
            Algorithm::Sha512
        );
        assert!(values.verify(&Digest::parse(&snapshot.config_digest).unwrap()));
    }
}
