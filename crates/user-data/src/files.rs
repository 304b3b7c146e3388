//! Shared helpers for whole-file JSON documents and append-only JSON lines.

use crate::error::{Result, StoreError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::warn;

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Load a JSON document, or its default when the file is missing or empty
pub(crate) fn load_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load a JSON document, replacing a corrupt file's content with the default
pub(crate) fn load_document_lenient<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match load_document(path) {
        Err(StoreError::Corrupt { path, reason }) => {
            warn!(path = %path.display(), %reason, "Store file corrupted, starting fresh");
            Ok(T::default())
        }
        other => other,
    }
}

pub(crate) fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| StoreError::io(path, e))
}

/// Append one record as a single JSON line
pub(crate) fn append_line<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    ensure_parent(path)?;
    let line = serde_json::to_string(record)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    writeln!(file, "{}", line).map_err(|e| StoreError::io(path, e))
}

/// Read every parseable line; malformed lines are logged and skipped
pub(crate) fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let mut records = Vec::new();

    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| StoreError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                line = number + 1,
                error = %e,
                "Skipping malformed line"
            ),
        }
    }

    Ok(records)
}
