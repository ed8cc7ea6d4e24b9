//! Store configuration.
//!
//! # Responsibility
//! - Describe where the storage file lives and which schema version to expect.
//!
//! # Invariants
//! - `schema_version` is never 0; 0 marks a file that was never created.

use crate::db::schema::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Fixed storage file name.
pub const DATABASE_NAME: &str = "shelter.db";

/// Physical location of the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    File(PathBuf),
    /// Private in-memory database; data ends with the store.
    Memory,
}

impl StorageLocation {
    /// Short label used in log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub location: StorageLocation,
    pub schema_version: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: StorageLocation::File(PathBuf::from(DATABASE_NAME)),
            schema_version: SCHEMA_VERSION,
        }
    }
}

impl StoreConfig {
    /// Uses `shelter.db` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::at_path(dir.as_ref().join(DATABASE_NAME))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StorageLocation::File(path.into()),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StorageLocation::Memory,
            ..Self::default()
        }
    }

    /// Overrides the expected schema version.
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version == 0 {
            return Err(ConfigError::ZeroSchemaVersion);
        }
        if let StorageLocation::File(path) = &self.location {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroSchemaVersion,
    EmptyPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroSchemaVersion => write!(f, "schema_version must be at least 1"),
            Self::EmptyPath => write!(f, "storage path cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_fixed_file_name() {
        let config = StoreConfig::in_dir("/tmp/shelter");
        assert_eq!(
            config.location,
            StorageLocation::File(PathBuf::from("/tmp/shelter/shelter.db"))
        );
        assert_eq!(config.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn validate_rejects_zero_version_and_empty_path() {
        assert_eq!(
            StoreConfig::in_memory().with_schema_version(0).validate(),
            Err(ConfigError::ZeroSchemaVersion)
        );
        assert_eq!(
            StoreConfig::at_path("").validate(),
            Err(ConfigError::EmptyPath)
        );
        assert!(StoreConfig::default().validate().is_ok());
    }
}
