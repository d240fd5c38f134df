//! Local key/value persistence.
//!
//! The cart snapshot and access token live under well-known keys and are
//! read back on process start to seed initial state.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use crate::errors::ClientError;

/// Storage key for the serialized cart snapshot.
pub const CART_KEY: &str = "cart";

/// Storage key for the access token.
pub const TOKEN_KEY: &str = "token";

pub trait Storage: Send + Sync {
    /// Read a value, `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    /// Write a value.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// Volatile storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        Ok(())
    }
}

/// Single-file JSON storage, the durable analogue of browser local storage.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, ClientError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let text = fs::read_to_string(&self.path).map_err(ClientError::Storage)?;

        serde_json::from_str(&text).map_err(ClientError::Decode)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), ClientError> {
        let text = serde_json::to_string_pretty(map).map_err(ClientError::Decode)?;

        fs::write(&self.path, text).map_err(ClientError::Storage)
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut map = self.read_map()?;

        map.insert(key.to_string(), value.to_string());

        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut map = self.read_map()?;

        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }

        Ok(())
    }
}
