//! JSON export functionality
//!
//! Writes the whole registry snapshot as one pretty-printed document.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::RegistrySnapshot;
use crate::CommandError;

/// Format version of the exported document
pub const EXPORT_VERSION: &str = "1.0";

/// Top-level JSON document
#[derive(Debug, Clone, Serialize)]
pub struct RegistryExportJson<'a> {
    pub export_version: &'static str,
    pub total_sessions: usize,
    pub total_tokens: usize,
    #[serde(flatten)]
    pub snapshot: &'a RegistrySnapshot,
}

/// Write a registry snapshot to JSON format
pub fn write_snapshot_json(snapshot: &RegistrySnapshot, path: &Path) -> Result<(), CommandError> {
    let export = RegistryExportJson {
        export_version: EXPORT_VERSION,
        total_sessions: snapshot.sessions.len(),
        total_tokens: snapshot.tokens.len(),
        snapshot,
    };

    let json = serde_json::to_string_pretty(&export)
        .map_err(|e| CommandError::Internal(format!("Failed to serialize JSON: {}", e)))?;

    let mut file = std::fs::File::create(path)
        .map_err(|e| CommandError::Internal(format!("Failed to create JSON file: {}", e)))?;

    file.write_all(json.as_bytes())
        .map_err(|e| CommandError::Internal(format!("Failed to write JSON: {}", e)))?;

    Ok(())
}
