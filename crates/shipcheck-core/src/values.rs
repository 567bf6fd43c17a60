//! Configuration values and their canonical digests

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::io::Write;

use crate::digest::{Algorithm, Digest, Digester};
use crate::error::{CoreError, Result};

/// Values a release was rendered with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Parse values from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Ok(Self(value))
    }

    /// Set a value by dotted path (e.g., "image.tag")
    pub fn set(&mut self, path: &str, value: JsonValue) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(&mut self.0, &parts, value)
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }

    /// The values with every object's keys in sorted order
    pub fn canonical(&self) -> JsonValue {
        canonicalize(&self.0)
    }

    /// Write the canonical encoding used for config digests
    ///
    /// Empty values write nothing; anything else is written as compact,
    /// key-sorted JSON followed by a newline.
    pub fn encode<W: Write>(&self, mut writer: W) -> serde_json::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        serde_json::to_writer(&mut writer, &self.canonical())?;
        writer.write_all(b"\n").map_err(serde_json::Error::io)
    }

    /// Digest of the canonical encoding
    pub fn digest(&self, algorithm: Algorithm) -> serde_json::Result<Digest> {
        let mut digester = Digester::new(algorithm);
        self.encode(&mut digester)?;
        Ok(digester.finish())
    }

    /// Check the canonical encoding hashes to `expected`
    ///
    /// Encoding failures count as a mismatch.
    pub fn verify(&self, expected: &Digest) -> bool {
        let mut verifier = expected.verifier();
        self.encode(&mut verifier).is_ok() && verifier.verified()
    }
}

/// Recursively rebuild a JSON value with sorted object keys
pub fn canonicalize(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            JsonValue::Object(sorted)
        }
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Set a nested value by path
fn set_nested(value: &mut JsonValue, path: &[&str], new_value: JsonValue) -> Result<()> {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return Ok(());
    };

    if !value.is_object() {
        *value = JsonValue::Object(serde_json::Map::new());
    }
    let map = value.as_object_mut().ok_or_else(|| CoreError::Values {
        message: format!("cannot set '{}' on a non-object value", key),
    })?;

    if remaining.is_empty() {
        map.insert(key.to_string(), new_value);
    } else {
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
        set_nested(entry, remaining, new_value)?;
    }

    Ok(())
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        JsonValue::Object(map) => map.get(*key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}
