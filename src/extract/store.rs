//! Persisted error code map
//!
//! The map file is a JSON object from decimal code to message:
//!
//! ```json
//! {
//!   "0": "Invalid input",
//!   "1": "Expected %s to exist"
//! }
//! ```
//!
//! Keys are written in ascending numeric order, followed by a newline.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::extract::error::StoreError;

/// Code to message map, ordered by code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeMap {
    entries: BTreeMap<u32, String>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        id: u32,
    ) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Record `message` under `id`; returns the message it replaced
    pub fn insert(
        &mut self,
        id: u32,
        message: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(id, message.into())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Codes in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(id, message)| (*id, message.as_str()))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String, StoreError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Message to code index. Fails if two codes share a message.
    pub fn invert(&self) -> Result<InvertedIndex, StoreError> {
        let mut index = InvertedIndex::default();
        for (id, message) in self.iter() {
            match index.by_message.entry(message.to_string()) {
                Entry::Occupied(existing) => {
                    return Err(StoreError::DuplicateMessage {
                        first: *existing.get(),
                        second: id,
                        message: message.to_string(),
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }
        Ok(index)
    }
}

impl FromIterator<(u32, String)> for CodeMap {
    fn from_iter<T: IntoIterator<Item = (u32, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Message to code lookup derived from a [`CodeMap`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
    by_message: HashMap<String, u32>,
}

impl InvertedIndex {
    pub fn get(
        &self,
        message: &str,
    ) -> Option<u32> {
        self.by_message.get(message).copied()
    }

    pub fn insert(
        &mut self,
        message: impl Into<String>,
        id: u32,
    ) {
        self.by_message.insert(message.into(), id);
    }

    pub fn len(&self) -> usize {
        self.by_message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_message.is_empty()
    }
}

/// Load the map at `path`. A missing or unreadable file yields an empty map.
pub async fn load(path: &Path) -> CodeMap {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("No code map at {}, starting empty", path.display());
            return CodeMap::new();
        }
        Err(err) => {
            warn!("Cannot read code map {}: {}; starting empty", path.display(), err);
            return CodeMap::new();
        }
    };

    match CodeMap::from_json(&text) {
        Ok(map) => {
            debug!("Loaded {} codes from {}", map.len(), path.display());
            map
        }
        Err(err) => {
            warn!("Cannot parse code map {}: {}; starting empty", path.display(), err);
            CodeMap::new()
        }
    }
}

/// Write `map` to `path`, replacing it atomically.
///
/// The text goes to a temporary file next to `path`, which is then renamed
/// over the destination. Missing parent directories are created.
pub async fn persist(
    path: &Path,
    map: &CodeMap,
) -> Result<(), StoreError> {
    let text = map.to_json()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
    let temp_path = tempfile::Builder::new()
        .prefix(".errcodes-")
        .suffix(".json")
        .tempfile_in(dir)
        .map_err(io_error)?
        .into_temp_path();
    tokio::fs::write(&temp_path, text).await.map_err(io_error)?;
    temp_path.persist(path).map_err(|err| io_error(err.error))?;

    debug!("Persisted {} codes to {}", map.len(), path.display());
    Ok(())
}
