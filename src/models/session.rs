//! Exchange session data types
//!
//! A session pairs two identities for a language exchange and moves
//! strictly forward through its lifecycle:
//!
//! ```text
//! Open ──► InProgress ──► Completed
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::identity::{Identity, SessionId};

/// Lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Waiting for a second participant
    Open,
    /// Both participants are paired
    InProgress,
    /// Terminal
    Completed,
}

impl SessionStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::InProgress => "in-progress",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(SessionStatus::Open),
            "in-progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            other => Err(format!("Unknown session status: {}", other)),
        }
    }
}

/// Full session record
///
/// `participant_b` equals `participant_a` while the session is open and
/// holds the joining identity from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub language_a: String,
    pub language_b: String,
    pub participant_a: Identity,
    pub participant_b: Identity,
    pub status: SessionStatus,
}

impl Session {
    /// Build a freshly created session owned by `creator`
    pub fn open(id: SessionId, creator: Identity, language_a: String, language_b: String) -> Self {
        Self {
            id,
            language_a,
            language_b,
            participant_b: creator.clone(),
            participant_a: creator,
            status: SessionStatus::Open,
        }
    }

    pub fn is_participant(&self, identity: &Identity) -> bool {
        &self.participant_a == identity || &self.participant_b == identity
    }
}

/// One entry of the user language table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLanguages {
    pub user: Identity,
    pub languages: Vec<String>,
}
