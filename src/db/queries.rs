//! Database query implementations
//!
//! One function per table read or write. All writes are upserts; there is
//! no delete path.

use rusqlite::{params, Connection, OptionalExtension};
use super::DbError;
use crate::models::{
    ContributionMetadata, ContributionToken, Identity, Session, SessionId, SessionStatus,
    TokenId, UserLanguages,
};

/// Raw session row before status decoding
struct SessionRow {
    session_id: i64,
    language_a: String,
    language_b: String,
    participant_a: String,
    participant_b: String,
    status: String,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            session_id: row.get(0)?,
            language_a: row.get(1)?,
            language_b: row.get(2)?,
            participant_a: row.get(3)?,
            participant_b: row.get(4)?,
            status: row.get(5)?,
        })
    }

    fn into_session(self) -> Result<Session, DbError> {
        let status = self
            .status
            .parse::<SessionStatus>()
            .map_err(DbError::Corrupt)?;

        Ok(Session {
            id: SessionId::new(self.session_id as u64),
            language_a: self.language_a,
            language_b: self.language_b,
            participant_a: Identity::from(self.participant_a),
            participant_b: Identity::from(self.participant_b),
            status,
        })
    }
}

const SESSION_COLUMNS: &str =
    "session_id, language_a, language_b, participant_a, participant_b, status";

/// Highest session id stored, 0 when the table is empty
pub fn get_last_session_id(conn: &Connection) -> Result<u64, DbError> {
    let id: i64 = conn.query_row(
        "SELECT COALESCE(MAX(session_id), 0) FROM sessions",
        [],
        |row| row.get(0),
    )?;
    Ok(id as u64)
}

/// Get a single session by ID
pub fn get_session(conn: &Connection, session_id: SessionId) -> Result<Option<Session>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sessions WHERE session_id = ?1",
        SESSION_COLUMNS
    ))?;

    let row = stmt
        .query_row(params![session_id.value() as i64], SessionRow::from_row)
        .optional()?;

    row.map(SessionRow::into_session).transpose()
}

/// Get all sessions ordered by id
pub fn get_sessions(conn: &Connection) -> Result<Vec<Session>, DbError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sessions ORDER BY session_id ASC",
        SESSION_COLUMNS
    ))?;

    let rows = stmt
        .query_map([], SessionRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(SessionRow::into_session).collect()
}

/// Insert or update a session
pub fn upsert_session(conn: &Connection, session: &Session) -> Result<(), DbError> {
    conn.execute(
        r#"
        INSERT INTO sessions (
            session_id, language_a, language_b, participant_a, participant_b, status
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(session_id) DO UPDATE SET
            participant_b = excluded.participant_b,
            status = excluded.status,
            updated_at = CURRENT_TIMESTAMP
        "#,
        params![
            session.id.value() as i64,
            session.language_a,
            session.language_b,
            session.participant_a.as_str(),
            session.participant_b.as_str(),
            session.status.as_str(),
        ],
    )?;
    Ok(())
}

/// Get the registered languages of a user
pub fn get_user_languages(
    conn: &Connection,
    user: &Identity,
) -> Result<Option<Vec<String>>, DbError> {
    let mut stmt = conn.prepare("SELECT languages FROM user_languages WHERE user_id = ?1")?;

    let raw = stmt
        .query_row(params![user.as_str()], |row| row.get::<_, String>(0))
        .optional()?;

    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Replace the registered languages of a user
pub fn upsert_user_languages(
    conn: &Connection,
    user: &Identity,
    languages: &[String],
) -> Result<(), DbError> {
    let json = serde_json::to_string(languages)?;

    conn.execute(
        r#"
        INSERT INTO user_languages (user_id, languages, updated_at)
        VALUES (?1, ?2, CURRENT_TIMESTAMP)
        ON CONFLICT(user_id) DO UPDATE SET
            languages = excluded.languages,
            updated_at = excluded.updated_at
        "#,
        params![user.as_str(), json],
    )?;
    Ok(())
}

/// Get every user language entry ordered by user
pub fn get_all_user_languages(conn: &Connection) -> Result<Vec<UserLanguages>, DbError> {
    let mut stmt =
        conn.prepare("SELECT user_id, languages FROM user_languages ORDER BY user_id ASC")?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(user, json)| -> Result<UserLanguages, DbError> {
            Ok(UserLanguages {
                user: Identity::from(user),
                languages: serde_json::from_str(&json)?,
            })
        })
        .collect()
}

/// Highest token id stored, 0 when the table is empty
pub fn get_last_token_id(conn: &Connection) -> Result<u64, DbError> {
    let id: i64 = conn.query_row(
        "SELECT COALESCE(MAX(token_id), 0) FROM token_owners",
        [],
        |row| row.get(0),
    )?;
    Ok(id as u64)
}

/// Get the current owner of a token
pub fn get_token_owner(conn: &Connection, token_id: TokenId) -> Result<Option<Identity>, DbError> {
    let owner = conn
        .query_row(
            "SELECT owner FROM token_owners WHERE token_id = ?1",
            params![token_id.value() as i64],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .map(Identity::from);

    Ok(owner)
}

/// Get the metadata recorded for a token
pub fn get_token_metadata(
    conn: &Connection,
    token_id: TokenId,
) -> Result<Option<ContributionMetadata>, DbError> {
    let metadata = conn
        .query_row(
            r#"
            SELECT language, contribution_type, contributor
            FROM token_metadata
            WHERE token_id = ?1
            "#,
            params![token_id.value() as i64],
            |row| {
                Ok(ContributionMetadata {
                    language: row.get(0)?,
                    contribution_type: row.get(1)?,
                    contributor: Identity::from(row.get::<_, String>(2)?),
                })
            },
        )
        .optional()?;

    Ok(metadata)
}

/// Insert a freshly minted token into both token tables
pub fn insert_token(conn: &Connection, token: &ContributionToken) -> Result<(), DbError> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "INSERT INTO token_owners (token_id, owner) VALUES (?1, ?2)",
        params![token.id.value() as i64, token.owner.as_str()],
    )?;
    tx.execute(
        r#"
        INSERT INTO token_metadata (token_id, language, contribution_type, contributor)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            token.id.value() as i64,
            token.metadata.language,
            token.metadata.contribution_type,
            token.metadata.contributor.as_str(),
        ],
    )?;

    tx.commit()?;
    Ok(())
}

/// Record a new owner for an existing token
pub fn update_token_owner(
    conn: &Connection,
    token_id: TokenId,
    owner: &Identity,
) -> Result<(), DbError> {
    conn.execute(
        r#"
        UPDATE token_owners
        SET owner = ?2, updated_at = CURRENT_TIMESTAMP
        WHERE token_id = ?1
        "#,
        params![token_id.value() as i64, owner.as_str()],
    )?;
    Ok(())
}

/// Get all tokens with their owners, ordered by id
pub fn get_tokens(conn: &Connection) -> Result<Vec<ContributionToken>, DbError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT o.token_id, o.owner, m.language, m.contribution_type, m.contributor
        FROM token_owners o
        JOIN token_metadata m ON o.token_id = m.token_id
        ORDER BY o.token_id ASC
        "#,
    )?;

    let tokens = stmt
        .query_map([], |row| {
            Ok(ContributionToken {
                id: TokenId::new(row.get::<_, i64>(0)? as u64),
                owner: Identity::from(row.get::<_, String>(1)?),
                metadata: ContributionMetadata {
                    language: row.get(2)?,
                    contribution_type: row.get(3)?,
                    contributor: Identity::from(row.get::<_, String>(4)?),
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tokens)
}
