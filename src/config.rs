// src/config.rs

//! Agent configuration and path derivation

use std::path::{Path, PathBuf};

/// Default location of the agent's durable state
pub const DEFAULT_DATA_STORE_DIR: &str = "/var/lib/fleetup";

/// File name of the key-value store inside the data-store directory
pub const STORE_FILE_NAME: &str = "fleetup-store.db";

/// File name of the device-type declaration inside the data-store directory
pub const DEVICE_TYPE_FILE_NAME: &str = "device_type";

/// Configuration for the update-agent state core
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the store and the default device-type file
    pub data_store_dir: PathBuf,
    /// Overrides the device-type file location when set
    pub device_type_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_STORE_DIR)
    }
}

impl Config {
    /// Create a config rooted at the given data-store directory
    pub fn new(data_store_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_store_dir: data_store_dir.into(),
            device_type_file: None,
        }
    }

    /// Path of the key-value store database
    pub fn store_path(&self) -> PathBuf {
        self.data_store_dir.join(STORE_FILE_NAME)
    }

    /// Path of the device-type file, honoring the override
    pub fn device_type_path(&self) -> PathBuf {
        match &self.device_type_file {
            Some(path) => path.clone(),
            None => self.data_store_dir.join(DEVICE_TYPE_FILE_NAME),
        }
    }

    /// Set the device-type file override
    pub fn with_device_type_file(mut self, path: impl AsRef<Path>) -> Self {
        self.device_type_file = Some(path.as_ref().to_path_buf());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_path() {
        let config = Config::new("/var/lib/fleetup");
        assert_eq!(
            config.store_path(),
            PathBuf::from("/var/lib/fleetup/fleetup-store.db")
        );
    }

    #[test]
    fn test_device_type_path_default() {
        let config = Config::new("/var/lib/fleetup");
        assert_eq!(
            config.device_type_path(),
            PathBuf::from("/var/lib/fleetup/device_type")
        );
    }

    #[test]
    fn test_device_type_path_override() {
        let config = Config::new("/var/lib/fleetup").with_device_type_file("/etc/device_type");
        assert_eq!(config.device_type_path(), PathBuf::from("/etc/device_type"));
    }
}
