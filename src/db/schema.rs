//! Database schema definitions
//!
//! Contains SQL for creating the four registry tables

use rusqlite::Connection;
use super::DbError;

/// SQL schema for all tables
const SCHEMA: &str = r#"
-- Exchange sessions
CREATE TABLE IF NOT EXISTS sessions (
    session_id INTEGER PRIMARY KEY,
    language_a TEXT NOT NULL,
    language_b TEXT NOT NULL,
    participant_a TEXT NOT NULL,
    participant_b TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('open', 'in-progress', 'completed')),
    created_at TEXT DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);
CREATE INDEX IF NOT EXISTS idx_sessions_participant_a ON sessions(participant_a);

-- Languages registered per user, stored as an ordered JSON array
CREATE TABLE IF NOT EXISTS user_languages (
    user_id TEXT PRIMARY KEY,
    languages TEXT NOT NULL,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

-- Current owner of each contribution token
CREATE TABLE IF NOT EXISTS token_owners (
    token_id INTEGER PRIMARY KEY,
    owner TEXT NOT NULL,
    updated_at TEXT DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_token_owners_owner ON token_owners(owner);

-- Contribution details fixed at mint time
CREATE TABLE IF NOT EXISTS token_metadata (
    token_id INTEGER PRIMARY KEY REFERENCES token_owners(token_id),
    language TEXT NOT NULL,
    contribution_type TEXT NOT NULL,
    contributor TEXT NOT NULL,
    created_at TEXT DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Create all database tables
pub fn create_tables(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
