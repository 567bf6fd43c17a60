//! Chart metadata

use semver::Version;
use serde::{Deserialize, Serialize};

/// Identity of the chart that produced a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    /// Chart name (required)
    pub name: String,

    /// Chart version (required, SemVer)
    #[serde(with = "version_serde")]
    pub version: Version,

    /// Application version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
}

impl ChartMetadata {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            app_version: None,
        }
    }

    /// Parse the version from a string
    pub fn parse(name: impl Into<String>, version: &str) -> crate::Result<Self> {
        Ok(Self::new(name, Version::parse(version)?))
    }

    /// Whether both charts share name and version; the app version is ignored
    pub fn same_chart(&self, other: &ChartMetadata) -> bool {
        self.name == other.name && self.version == other.version
    }

    /// `name@version`, for messages
    pub fn versioned_name(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

mod version_serde {
    use semver::Version;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(version: &Version, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&version.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Version, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}
