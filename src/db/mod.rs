//! Database module for SQLite operations
//!
//! This module handles all database interactions including:
//! - Schema creation
//! - Session and user-language queries
//! - Token owner and metadata queries
//!
//! [`Database`] implements both storage traits, so either registry can be
//! backed by a SQLite file.

pub mod schema;
pub mod queries;

use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;
use thiserror::Error;

use crate::models::{
    ContributionMetadata, ContributionToken, Identity, Session, SessionId, TokenId,
    UserLanguages,
};
use crate::store::{ExchangeStore, StoreError, TokenStore};

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid JSON column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Database connection wrapper
pub struct Database {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl Database {
    /// Create a new database connection
    pub fn new(path: PathBuf) -> Result<Self, DbError> {
        let conn = Connection::open(&path)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        schema::create_tables(&conn)?;
        Ok(())
    }

    /// Get the database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Execute a query with the database connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        f(&conn)
    }
}

impl ExchangeStore for Database {
    fn last_session_id(&self) -> Result<u64, StoreError> {
        Ok(self.with_connection(queries::get_last_session_id)?)
    }

    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.with_connection(|conn| queries::get_session(conn, id))?)
    }

    fn put_session(&mut self, session: &Session) -> Result<(), StoreError> {
        Ok(self.with_connection(|conn| queries::upsert_session(conn, session))?)
    }

    fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.with_connection(queries::get_sessions)?)
    }

    fn user_languages(&self, user: &Identity) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.with_connection(|conn| queries::get_user_languages(conn, user))?)
    }

    fn put_user_languages(
        &mut self,
        user: &Identity,
        languages: &[String],
    ) -> Result<(), StoreError> {
        Ok(self.with_connection(|conn| queries::upsert_user_languages(conn, user, languages))?)
    }

    fn all_user_languages(&self) -> Result<Vec<UserLanguages>, StoreError> {
        Ok(self.with_connection(queries::get_all_user_languages)?)
    }
}

impl TokenStore for Database {
    fn last_token_id(&self) -> Result<u64, StoreError> {
        Ok(self.with_connection(queries::get_last_token_id)?)
    }

    fn owner(&self, id: TokenId) -> Result<Option<Identity>, StoreError> {
        Ok(self.with_connection(|conn| queries::get_token_owner(conn, id))?)
    }

    fn metadata(&self, id: TokenId) -> Result<Option<ContributionMetadata>, StoreError> {
        Ok(self.with_connection(|conn| queries::get_token_metadata(conn, id))?)
    }

    fn put_token(&mut self, token: &ContributionToken) -> Result<(), StoreError> {
        Ok(self.with_connection(|conn| queries::insert_token(conn, token))?)
    }

    fn put_owner(&mut self, id: TokenId, owner: &Identity) -> Result<(), StoreError> {
        Ok(self.with_connection(|conn| queries::update_token_owner(conn, id, owner))?)
    }

    fn tokens(&self) -> Result<Vec<ContributionToken>, StoreError> {
        Ok(self.with_connection(queries::get_tokens)?)
    }
}

/// Get the default database path
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("lingua-registry").join("registry.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_database_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "lingua_registry_reopen_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let mut db = Database::new(path.clone()).unwrap();
            db.initialize().unwrap();
            db.put_user_languages(&Identity::from("u1"), &["English".to_string()])
                .unwrap();
        }

        let db = Database::new(path.clone()).unwrap();
        db.initialize().unwrap();
        assert_eq!(
            db.user_languages(&Identity::from("u1")).unwrap(),
            Some(vec!["English".to_string()])
        );
        assert_eq!(db.path(), &path);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_default_db_path_ends_with_registry_file() {
        let path = default_db_path();
        assert!(path.ends_with("lingua-registry/registry.db"));
    }
}
