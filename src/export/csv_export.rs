//! CSV export functionality
//!
//! Provides CSV serialization for sessions, user languages, and tokens.

use std::path::Path;

use csv::Writer;
use serde::Serialize;

use super::{ExportableSession, ExportableToken, ExportableUserLanguages};
use crate::models::{ContributionToken, Session, UserLanguages};
use crate::CommandError;

/// Write rows to `path`, header taken from the row type
fn write_rows<R, I>(rows: I, path: &Path) -> Result<(), CommandError>
where
    R: Serialize,
    I: IntoIterator<Item = R>,
{
    let file = std::fs::File::create(path)
        .map_err(|e| CommandError::Internal(format!("Failed to create CSV file: {}", e)))?;

    let mut writer = Writer::from_writer(file);

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| CommandError::Internal(format!("Failed to write CSV record: {}", e)))?;
    }

    writer
        .flush()
        .map_err(|e| CommandError::Internal(format!("Failed to flush CSV: {}", e)))?;

    Ok(())
}

/// Write sessions to CSV format
pub fn write_sessions_csv(sessions: &[Session], path: &Path) -> Result<(), CommandError> {
    write_rows(sessions.iter().map(ExportableSession::from), path)
}

/// Write user language lists to CSV format
pub fn write_user_languages_csv(
    entries: &[UserLanguages],
    path: &Path,
) -> Result<(), CommandError> {
    write_rows(entries.iter().map(ExportableUserLanguages::from), path)
}

/// Write tokens to CSV format
pub fn write_tokens_csv(tokens: &[ContributionToken], path: &Path) -> Result<(), CommandError> {
    write_rows(tokens.iter().map(ExportableToken::from), path)
}
