//! Export module for CSV and JSON export functionality
//!
//! Captures a read-only snapshot of both registries and writes it out
//! as a single JSON document or as one CSV file per table.

pub mod csv_export;
pub mod json_export;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::{ContributionToken, Session, UserLanguages};
use crate::registry::{ContributionTokenRegistry, ExchangeRegistry};
use crate::store::{ExchangeStore, StoreError, TokenStore};
use crate::CommandError;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(CommandError::Internal(format!(
                "Invalid export format: {}. Use 'csv' or 'json'",
                s
            ))),
        }
    }
}

impl ExportFormat {
    /// Get file extension for format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Point-in-time copy of every registry table
#[derive(Debug, Clone, Serialize)]
pub struct RegistrySnapshot {
    pub exported_at: String,
    pub sessions: Vec<Session>,
    pub user_languages: Vec<UserLanguages>,
    pub tokens: Vec<ContributionToken>,
}

impl RegistrySnapshot {
    pub fn capture<E: ExchangeStore, T: TokenStore>(
        exchange: &ExchangeRegistry<E>,
        tokens: &ContributionTokenRegistry<T>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            sessions: exchange.sessions()?,
            user_languages: exchange.user_languages_table()?,
            tokens: tokens.tokens()?,
        })
    }
}

/// Flat session row for CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportableSession {
    pub session_id: u64,
    pub language_a: String,
    pub language_b: String,
    pub participant_a: String,
    pub participant_b: String,
    pub status: String,
}

impl From<&Session> for ExportableSession {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.value(),
            language_a: session.language_a.clone(),
            language_b: session.language_b.clone(),
            participant_a: session.participant_a.to_string(),
            participant_b: session.participant_b.to_string(),
            status: session.status.as_str().to_string(),
        }
    }
}

/// Flat user-language row for CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportableUserLanguages {
    pub user: String,
    pub languages: String, // Semicolon-separated
}

impl From<&UserLanguages> for ExportableUserLanguages {
    fn from(entry: &UserLanguages) -> Self {
        Self {
            user: entry.user.to_string(),
            languages: entry.languages.join(";"),
        }
    }
}

/// Flat token row for CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportableToken {
    pub token_id: u64,
    pub owner: String,
    pub language: String,
    pub contribution_type: String,
    pub contributor: String,
}

impl From<&ContributionToken> for ExportableToken {
    fn from(token: &ContributionToken) -> Self {
        Self {
            token_id: token.id.value(),
            owner: token.owner.to_string(),
            language: token.metadata.language.clone(),
            contribution_type: token.metadata.contribution_type.clone(),
            contributor: token.metadata.contributor.to_string(),
        }
    }
}

/// Get the export directory: configured, then Downloads, then temp dir
pub fn get_export_directory(configured: Option<&Path>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or_else(dirs::download_dir)
        .unwrap_or_else(std::env::temp_dir)
}

/// Generate a timestamped filename for exports
pub fn generate_export_filename(prefix: &str, extension: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{}_{}.{}", prefix, timestamp, extension)
}

/// Write `snapshot` into `dir` and return the files created
pub fn write_snapshot(
    snapshot: &RegistrySnapshot,
    format: ExportFormat,
    dir: &Path,
) -> Result<Vec<PathBuf>, CommandError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CommandError::Internal(format!("Failed to create export directory: {}", e)))?;

    let ext = format.extension();
    match format {
        ExportFormat::Json => {
            let path = dir.join(generate_export_filename("registry", ext));
            json_export::write_snapshot_json(snapshot, &path)?;
            Ok(vec![path])
        }
        ExportFormat::Csv => {
            let sessions_path = dir.join(generate_export_filename("sessions", ext));
            let languages_path = dir.join(generate_export_filename("user_languages", ext));
            let tokens_path = dir.join(generate_export_filename("tokens", ext));

            csv_export::write_sessions_csv(&snapshot.sessions, &sessions_path)?;
            csv_export::write_user_languages_csv(&snapshot.user_languages, &languages_path)?;
            csv_export::write_tokens_csv(&snapshot.tokens, &tokens_path)?;

            Ok(vec![sessions_path, languages_path, tokens_path])
        }
    }
}
