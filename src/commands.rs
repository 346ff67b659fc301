//! Command handlers
//!
//! The boundary API of the registries. Each handler locks one registry,
//! runs one operation and releases the lock, so operations never
//! interleave. [`Request`] and [`dispatch`] give any transport a
//! serializable 1:1 mapping onto the handlers.

use std::path::PathBuf;
use std::sync::MutexGuard;

use serde::{Deserialize, Serialize};

use crate::export::{self, ExportFormat};
use crate::models::{
    ContributionMetadata, ContributionToken, Identity, Session, SessionId, SessionStatus,
    TokenId,
};
use crate::{AppState, CommandError, ExchangeBackend, TokenBackend};
use crate::registry::{ContributionTokenRegistry, ExchangeRegistry};

// ============================================================================
// Tagged results
// ============================================================================

/// Tagged result handed back to callers:
/// `{"success": true, "value": ..}` or `{"success": false, "error": code}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<u32>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(code: u32) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(code),
        }
    }
}

impl Outcome<()> {
    /// Outcome of an operation that succeeds without a value
    pub fn done(result: Result<(), CommandError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                value: None,
                error: None,
            },
            Err(e) => Self::failed(e.code()),
        }
    }
}

impl<T> From<Result<T, CommandError>> for Outcome<T> {
    fn from(result: Result<T, CommandError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::failed(e.code()),
        }
    }
}

fn lock_exchange(
    state: &AppState,
) -> Result<MutexGuard<'_, ExchangeRegistry<ExchangeBackend>>, CommandError> {
    state.exchange.lock().map_err(|_| CommandError::LockPoisoned)
}

fn lock_tokens(
    state: &AppState,
) -> Result<MutexGuard<'_, ContributionTokenRegistry<TokenBackend>>, CommandError> {
    state.tokens.lock().map_err(|_| CommandError::LockPoisoned)
}

// ============================================================================
// Exchange commands
// ============================================================================

pub fn register_languages(
    state: &AppState,
    caller: &Identity,
    languages: Vec<String>,
) -> Result<(), CommandError> {
    lock_exchange(state)?.register_languages(caller, languages)?;
    Ok(())
}

pub fn create_session(
    state: &AppState,
    caller: &Identity,
    language_a: String,
    language_b: String,
) -> Result<SessionId, CommandError> {
    Ok(lock_exchange(state)?.create_session(caller, language_a, language_b)?)
}

pub fn join_session(
    state: &AppState,
    caller: &Identity,
    session_id: SessionId,
) -> Result<(), CommandError> {
    lock_exchange(state)?.join_session(caller, session_id)?;
    Ok(())
}

pub fn complete_session(
    state: &AppState,
    caller: &Identity,
    session_id: SessionId,
) -> Result<(), CommandError> {
    lock_exchange(state)?.complete_session(caller, session_id)?;
    Ok(())
}

pub fn get_session(
    state: &AppState,
    session_id: SessionId,
) -> Result<Option<Session>, CommandError> {
    Ok(lock_exchange(state)?.get_session(session_id)?)
}

pub fn get_user_languages(
    state: &AppState,
    user: &Identity,
) -> Result<Option<Vec<String>>, CommandError> {
    Ok(lock_exchange(state)?.get_user_languages(user)?)
}

/// List sessions, optionally only those in one lifecycle stage
pub fn list_sessions(
    state: &AppState,
    status: Option<SessionStatus>,
) -> Result<Vec<Session>, CommandError> {
    let sessions = lock_exchange(state)?.sessions()?;

    Ok(match status {
        Some(status) => sessions.into_iter().filter(|s| s.status == status).collect(),
        None => sessions,
    })
}

// ============================================================================
// Token commands
// ============================================================================

pub fn mint(
    state: &AppState,
    caller: &Identity,
    recipient: Identity,
    language: String,
    contribution_type: String,
) -> Result<TokenId, CommandError> {
    Ok(lock_tokens(state)?.mint(caller, recipient, language, contribution_type)?)
}

pub fn transfer(
    state: &AppState,
    token_id: TokenId,
    caller: &Identity,
    recipient: Identity,
) -> Result<(), CommandError> {
    lock_tokens(state)?.transfer(token_id, caller, recipient)?;
    Ok(())
}

pub fn get_owner(state: &AppState, token_id: TokenId) -> Result<Option<Identity>, CommandError> {
    Ok(lock_tokens(state)?.get_owner(token_id)?)
}

pub fn get_token_metadata(
    state: &AppState,
    token_id: TokenId,
) -> Result<Option<ContributionMetadata>, CommandError> {
    Ok(lock_tokens(state)?.get_token_metadata(token_id)?)
}

pub fn tokens_owned_by(
    state: &AppState,
    owner: &Identity,
) -> Result<Vec<ContributionToken>, CommandError> {
    Ok(lock_tokens(state)?.tokens_owned_by(owner)?)
}

// ============================================================================
// Export commands
// ============================================================================

/// Export both registries in `format` ("csv" or "json"); returns written files
pub fn export_registry(state: &AppState, format: &str) -> Result<Vec<PathBuf>, CommandError> {
    let format: ExportFormat = format.parse()?;
    let dir = export::get_export_directory(state.export_dir.as_deref());

    let snapshot = {
        let exchange = lock_exchange(state)?;
        let tokens = lock_tokens(state)?;
        export::RegistrySnapshot::capture(&*exchange, &*tokens)?
    };

    let paths = export::write_snapshot(&snapshot, format, &dir)?;
    tracing::info!("Exported registry to {:?}", paths);
    Ok(paths)
}

// ============================================================================
// Request dispatch
// ============================================================================

/// One boundary operation with its parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    RegisterLanguages { languages: Vec<String> },
    CreateSession { language_a: String, language_b: String },
    JoinSession { session_id: SessionId },
    CompleteSession { session_id: SessionId },
    GetSession { session_id: SessionId },
    GetUserLanguages { user: Identity },
    Mint {
        recipient: Identity,
        language: String,
        contribution_type: String,
    },
    Transfer { token_id: TokenId, recipient: Identity },
    GetOwner { token_id: TokenId },
    GetTokenMetadata { token_id: TokenId },
}

/// Run `request` on behalf of `caller` and encode the tagged result
pub fn dispatch(
    state: &AppState,
    caller: &Identity,
    request: Request,
) -> Outcome<serde_json::Value> {
    fn encode<T: Serialize>(result: Result<T, CommandError>) -> Outcome<serde_json::Value> {
        result
            .and_then(|value| {
                serde_json::to_value(value).map_err(|e| CommandError::Internal(e.to_string()))
            })
            .into()
    }

    fn unit(result: Result<(), CommandError>) -> Outcome<serde_json::Value> {
        let done = Outcome::done(result);
        Outcome {
            success: done.success,
            value: None,
            error: done.error,
        }
    }

    tracing::debug!(caller = %caller, ?request, "Dispatching request");

    match request {
        Request::RegisterLanguages { languages } => {
            unit(register_languages(state, caller, languages))
        }
        Request::CreateSession {
            language_a,
            language_b,
        } => encode(create_session(state, caller, language_a, language_b)),
        Request::JoinSession { session_id } => unit(join_session(state, caller, session_id)),
        Request::CompleteSession { session_id } => {
            unit(complete_session(state, caller, session_id))
        }
        Request::GetSession { session_id } => encode(get_session(state, session_id)),
        Request::GetUserLanguages { user } => encode(get_user_languages(state, &user)),
        Request::Mint {
            recipient,
            language,
            contribution_type,
        } => encode(mint(state, caller, recipient, language, contribution_type)),
        Request::Transfer {
            token_id,
            recipient,
        } => unit(transfer(state, token_id, caller, recipient)),
        Request::GetOwner { token_id } => encode(get_owner(state, token_id)),
        Request::GetTokenMetadata { token_id } => encode(get_token_metadata(state, token_id)),
    }
}
