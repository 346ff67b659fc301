//! Storage seam for the registries
//!
//! The registries never touch storage directly. They read and write the
//! four tables through these traits:
//! - [`ExchangeStore`] for the session and user-language tables
//! - [`TokenStore`] for the token-owner and token-metadata tables
//!
//! Tables are append-only: records are inserted or overwritten in place,
//! never deleted.

pub mod memory;

use thiserror::Error;

use crate::db::DbError;
use crate::models::{
    ContributionMetadata, ContributionToken, Identity, Session, SessionId, TokenId,
    UserLanguages,
};

pub use memory::MemoryStore;

/// Storage backend failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Session and user-language tables
pub trait ExchangeStore {
    /// Highest session id handed out so far, 0 when empty
    fn last_session_id(&self) -> Result<u64, StoreError>;

    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError>;

    /// Insert or overwrite the record stored under `session.id`
    fn put_session(&mut self, session: &Session) -> Result<(), StoreError>;

    /// All sessions in id order
    fn sessions(&self) -> Result<Vec<Session>, StoreError>;

    fn user_languages(&self, user: &Identity) -> Result<Option<Vec<String>>, StoreError>;

    /// Replace the whole language list of `user`
    fn put_user_languages(&mut self, user: &Identity, languages: &[String])
        -> Result<(), StoreError>;

    fn all_user_languages(&self) -> Result<Vec<UserLanguages>, StoreError>;
}

/// Token-owner and token-metadata tables
pub trait TokenStore {
    /// Highest token id handed out so far, 0 when empty
    fn last_token_id(&self) -> Result<u64, StoreError>;

    fn owner(&self, id: TokenId) -> Result<Option<Identity>, StoreError>;

    fn metadata(&self, id: TokenId) -> Result<Option<ContributionMetadata>, StoreError>;

    /// Write owner and metadata of a new token in one step
    fn put_token(&mut self, token: &ContributionToken) -> Result<(), StoreError>;

    fn put_owner(&mut self, id: TokenId, owner: &Identity) -> Result<(), StoreError>;

    /// All tokens in id order
    fn tokens(&self) -> Result<Vec<ContributionToken>, StoreError>;
}

impl<S: ExchangeStore + ?Sized> ExchangeStore for Box<S> {
    fn last_session_id(&self) -> Result<u64, StoreError> {
        (**self).last_session_id()
    }

    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        (**self).session(id)
    }

    fn put_session(&mut self, session: &Session) -> Result<(), StoreError> {
        (**self).put_session(session)
    }

    fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        (**self).sessions()
    }

    fn user_languages(&self, user: &Identity) -> Result<Option<Vec<String>>, StoreError> {
        (**self).user_languages(user)
    }

    fn put_user_languages(
        &mut self,
        user: &Identity,
        languages: &[String],
    ) -> Result<(), StoreError> {
        (**self).put_user_languages(user, languages)
    }

    fn all_user_languages(&self) -> Result<Vec<UserLanguages>, StoreError> {
        (**self).all_user_languages()
    }
}

impl<S: TokenStore + ?Sized> TokenStore for Box<S> {
    fn last_token_id(&self) -> Result<u64, StoreError> {
        (**self).last_token_id()
    }

    fn owner(&self, id: TokenId) -> Result<Option<Identity>, StoreError> {
        (**self).owner(id)
    }

    fn metadata(&self, id: TokenId) -> Result<Option<ContributionMetadata>, StoreError> {
        (**self).metadata(id)
    }

    fn put_token(&mut self, token: &ContributionToken) -> Result<(), StoreError> {
        (**self).put_token(token)
    }

    fn put_owner(&mut self, id: TokenId, owner: &Identity) -> Result<(), StoreError> {
        (**self).put_owner(id, owner)
    }

    fn tokens(&self) -> Result<Vec<ContributionToken>, StoreError> {
        (**self).tokens()
    }
}
