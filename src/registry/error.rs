//! Registry error types
//!
//! Every rejected operation falls into one of three kinds. Storage
//! failures come from the backend and carry no kind.

use serde::Serialize;
use thiserror::Error;

use crate::models::{Identity, SessionId, SessionStatus, TokenId};
use crate::store::StoreError;

/// Exchange: referenced session does not exist
pub const ERR_NOT_FOUND: u32 = 404;
/// Exchange: session is in the wrong lifecycle stage
pub const ERR_INVALID_STATE: u32 = 100;
/// Exchange: caller lacks the required relationship to the session
pub const ERR_UNAUTHORIZED: u32 = 101;
/// Tokens: mint attempted by someone other than the administrator
pub const ERR_NOT_ADMINISTRATOR: u32 = 100;
/// Tokens: transfer attempted by someone other than the owner
pub const ERR_NOT_OWNER: u32 = 101;

/// Classification of a rejected operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    Unauthorized,
}

/// Exchange registry errors
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session {id} is {status}, expected {expected}")]
    InvalidState {
        id: SessionId,
        status: SessionStatus,
        expected: SessionStatus,
    },

    #[error("{caller} may not act on session {id}")]
    Unauthorized { id: SessionId, caller: Identity },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ExchangeError {
    /// Kind of rejection, `None` for storage failures
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ExchangeError::NotFound(_) => Some(ErrorKind::NotFound),
            ExchangeError::InvalidState { .. } => Some(ErrorKind::InvalidState),
            ExchangeError::Unauthorized { .. } => Some(ErrorKind::Unauthorized),
            ExchangeError::Storage(_) => None,
        }
    }

    /// Numeric error code, `None` for storage failures
    pub fn code(&self) -> Option<u32> {
        self.kind().map(|kind| match kind {
            ErrorKind::NotFound => ERR_NOT_FOUND,
            ErrorKind::InvalidState => ERR_INVALID_STATE,
            ErrorKind::Unauthorized => ERR_UNAUTHORIZED,
        })
    }
}

/// Contribution token registry errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("{0} is not the registry administrator")]
    NotAdministrator(Identity),

    #[error("{caller} does not own token {token}")]
    NotOwner { token: TokenId, caller: Identity },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl TokenError {
    /// Both rejections are authorization failures; there is no not-found path
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            TokenError::NotAdministrator(_) | TokenError::NotOwner { .. } => {
                Some(ErrorKind::Unauthorized)
            }
            TokenError::Storage(_) => None,
        }
    }

    pub fn code(&self) -> Option<u32> {
        match self {
            TokenError::NotAdministrator(_) => Some(ERR_NOT_ADMINISTRATOR),
            TokenError::NotOwner { .. } => Some(ERR_NOT_OWNER),
            TokenError::Storage(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_codes() {
        assert_eq!(ExchangeError::NotFound(SessionId::new(9)).code(), Some(404));
        assert_eq!(
            ExchangeError::InvalidState {
                id: SessionId::first(),
                status: SessionStatus::Completed,
                expected: SessionStatus::InProgress,
            }
            .code(),
            Some(100)
        );
        assert_eq!(
            ExchangeError::Unauthorized {
                id: SessionId::first(),
                caller: Identity::from("x"),
            }
            .code(),
            Some(101)
        );
    }

    #[test]
    fn test_token_rejections_are_unauthorized() {
        let mint = TokenError::NotAdministrator(Identity::from("x"));
        let transfer = TokenError::NotOwner {
            token: TokenId::first(),
            caller: Identity::from("x"),
        };

        assert_eq!(mint.kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(transfer.kind(), Some(ErrorKind::Unauthorized));
        assert_eq!(mint.code(), Some(100));
        assert_eq!(transfer.code(), Some(101));
    }

    #[test]
    fn test_error_messages() {
        let err = ExchangeError::InvalidState {
            id: SessionId::new(3),
            status: SessionStatus::Open,
            expected: SessionStatus::InProgress,
        };
        assert_eq!(err.to_string(), "Session 3 is open, expected in-progress");
    }
}
