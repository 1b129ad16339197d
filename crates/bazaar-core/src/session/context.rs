//! Screen-scoped session context.
//!
//! The bag holds heterogeneous transient values (search drafts, pagination
//! contexts, awaiting-input flags) under string keys. Reads declare the
//! expected type and fail fast on mismatch instead of silently returning a
//! default — a mismatch means a screen handler left stale state behind.

use crate::error::{BazaarError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Typed key→value bag scoped to the currently rendered screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBag {
    entries: HashMap<String, serde_json::Value>,
}

impl ContextBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `key`, replacing any previous entry.
    pub fn put<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let key = key.into();
        let encoded = serde_json::to_value(value)
            .map_err(|e| BazaarError::context(key.clone(), e.to_string()))?;
        self.entries.insert(key, encoded);
        Ok(())
    }

    /// Reads the entry under `key` as `T`.
    ///
    /// Returns `Ok(None)` when the key is absent and a [`BazaarError::Context`]
    /// when the entry exists but does not decode as the declared type.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| BazaarError::context(key, e.to_string())),
        }
    }

    /// Reads and removes the entry under `key` in one step.
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.entries.remove(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| BazaarError::context(key, e.to_string())),
        }
    }

    /// Removes the entry under `key`, reporting whether one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drops every entry. Called when the owning screen is left.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
