//! Versioned JSON persistence for the message table.
//!
//! Messages survive process restarts in a local JSON file keyed by a store
//! name and schema version. A version bump resets the store to empty rather
//! than migrating. 64-bit integers round-trip through a tagged string
//! encoding (`"BIGINT::<digits>"`) so heights and sequence numbers survive
//! JSON readers that clip large integers.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Tag prefix for 64-bit integers in persisted JSON.
pub const BIGINT_TAG: &str = "BIGINT::";

/// Serde adapter: `u64` <-> `"BIGINT::<digits>"`.
pub mod bigint {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BIGINT_TAG;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}{}", BIGINT_TAG, value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_tagged(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `Option<u64>` <-> `"BIGINT::<digits>"` or null.
pub mod bigint_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BIGINT_TAG;

    pub fn serialize<S: Serializer>(
        value: &Option<u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&format!("{}{}", BIGINT_TAG, v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(s) => super::parse_tagged(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

fn parse_tagged(raw: &str) -> Result<u64, String> {
    let digits = raw
        .strip_prefix(BIGINT_TAG)
        .ok_or_else(|| format!("expected '{}' prefix, got {:?}", BIGINT_TAG, raw))?;
    digits
        .parse::<u64>()
        .map_err(|e| format!("invalid BIGINT digits {:?}: {}", digits, e))
}

/// On-disk envelope: name + version wrap the actual state.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    name: String,
    version: u32,
    state: T,
}

/// A named, versioned JSON file store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    name: String,
    version: u32,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, version: u32) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load persisted state. A missing file, an unreadable file, or a
    /// name/version mismatch resets to the default (no migration).
    pub fn load<T: DeserializeOwned + Default>(&self) -> T {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(_) => return T::default(),
        };

        match serde_json::from_str::<Envelope<T>>(&data) {
            Ok(envelope) if envelope.name == self.name && envelope.version == self.version => {
                envelope.state
            }
            Ok(envelope) => {
                tracing::warn!(
                    path = %self.path.display(),
                    found_name = %envelope.name,
                    found_version = envelope.version,
                    expected_version = self.version,
                    "Persisted store name/version mismatch, resetting"
                );
                T::default()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to parse persisted store, resetting"
                );
                T::default()
            }
        }
    }

    /// Persist state atomically (temp file + rename).
    pub fn save<T: Serialize>(&self, state: &T) -> Result<()> {
        let envelope = Envelope {
            name: self.name.clone(),
            version: self.version,
            state,
        };
        let data = serde_json::to_string_pretty(&envelope)
            .wrap_err("Failed to serialize persisted state")?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)
            .wrap_err_with(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .wrap_err_with(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
