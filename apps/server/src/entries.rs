//! Stored entries file.
//!
//! The file is a JSON array of `{ "entry_id", "data", "options" }` objects,
//! the same split between creation-time data and editable options that the
//! core resolves into [`InstanceSettings`](ingstocks_core::InstanceSettings).

use std::path::Path;
use std::time::SystemTime;

use anyhow::Context;
use ingstocks_core::{EntryData, EntryOptions};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub entry_id: String,
    pub data: EntryData,
    #[serde(default)]
    pub options: EntryOptions,
}

/// Loads all entries. A missing file means no entries.
pub fn load_entries(path: &Path) -> anyhow::Result<Vec<StoredEntry>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Entries file {} not found, no instruments configured", path.display());
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<StoredEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse entries file {}", path.display()))?;

    let mut seen = std::collections::HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.entry_id.as_str()) {
            anyhow::bail!("Duplicate entry_id '{}' in {}", entry.entry_id, path.display());
        }
    }

    Ok(entries)
}

/// Modification time used to detect changes; `None` when the file is absent.
pub fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
