//! In-memory storage backend
//!
//! Keeps every table in a `BTreeMap` so listings come back in key order.

use std::collections::BTreeMap;

use super::{ExchangeStore, StoreError, TokenStore};
use crate::models::{
    ContributionMetadata, ContributionToken, Identity, Session, SessionId, TokenId,
    UserLanguages,
};

/// Volatile store holding all four tables
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sessions: BTreeMap<SessionId, Session>,
    user_languages: BTreeMap<Identity, Vec<String>>,
    owners: BTreeMap<TokenId, Identity>,
    metadata: BTreeMap<TokenId, ContributionMetadata>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExchangeStore for MemoryStore {
    fn last_session_id(&self) -> Result<u64, StoreError> {
        Ok(self
            .sessions
            .keys()
            .next_back()
            .map(|id| id.value())
            .unwrap_or(0))
    }

    fn session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.get(&id).cloned())
    }

    fn put_session(&mut self, session: &Session) -> Result<(), StoreError> {
        self.sessions.insert(session.id, session.clone());
        Ok(())
    }

    fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.sessions.values().cloned().collect())
    }

    fn user_languages(&self, user: &Identity) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.user_languages.get(user).cloned())
    }

    fn put_user_languages(
        &mut self,
        user: &Identity,
        languages: &[String],
    ) -> Result<(), StoreError> {
        self.user_languages.insert(user.clone(), languages.to_vec());
        Ok(())
    }

    fn all_user_languages(&self) -> Result<Vec<UserLanguages>, StoreError> {
        Ok(self
            .user_languages
            .iter()
            .map(|(user, languages)| UserLanguages {
                user: user.clone(),
                languages: languages.clone(),
            })
            .collect())
    }
}

impl TokenStore for MemoryStore {
    fn last_token_id(&self) -> Result<u64, StoreError> {
        Ok(self
            .owners
            .keys()
            .next_back()
            .map(|id| id.value())
            .unwrap_or(0))
    }

    fn owner(&self, id: TokenId) -> Result<Option<Identity>, StoreError> {
        Ok(self.owners.get(&id).cloned())
    }

    fn metadata(&self, id: TokenId) -> Result<Option<ContributionMetadata>, StoreError> {
        Ok(self.metadata.get(&id).cloned())
    }

    fn put_token(&mut self, token: &ContributionToken) -> Result<(), StoreError> {
        self.owners.insert(token.id, token.owner.clone());
        self.metadata.insert(token.id, token.metadata.clone());
        Ok(())
    }

    fn put_owner(&mut self, id: TokenId, owner: &Identity) -> Result<(), StoreError> {
        self.owners.insert(id, owner.clone());
        Ok(())
    }

    fn tokens(&self) -> Result<Vec<ContributionToken>, StoreError> {
        Ok(self
            .owners
            .iter()
            .filter_map(|(id, owner)| {
                self.metadata.get(id).map(|metadata| ContributionToken {
                    id: *id,
                    owner: owner.clone(),
                    metadata: metadata.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_reports_zero_ids() {
        let store = MemoryStore::new();
        assert_eq!(store.last_session_id().unwrap(), 0);
        assert_eq!(store.last_token_id().unwrap(), 0);
        assert!(store.sessions().unwrap().is_empty());
        assert!(store.tokens().unwrap().is_empty());
    }

    #[test]
    fn test_put_session_overwrites_in_place() {
        let mut store = MemoryStore::new();
        let mut session = Session::open(
            SessionId::first(),
            Identity::from("a"),
            "English".to_string(),
            "Spanish".to_string(),
        );
        store.put_session(&session).unwrap();

        session.participant_b = Identity::from("b");
        store.put_session(&session).unwrap();

        assert_eq!(store.sessions().unwrap().len(), 1);
        assert_eq!(
            store.session(SessionId::first()).unwrap().unwrap().participant_b,
            Identity::from("b")
        );
        assert_eq!(store.last_session_id().unwrap(), 1);
    }

    #[test]
    fn test_tokens_join_owner_and_metadata() {
        let mut store = MemoryStore::new();
        let token = ContributionToken::minted(
            TokenId::first(),
            Identity::from("r1"),
            "French".to_string(),
            "dictionary".to_string(),
        );
        store.put_token(&token).unwrap();
        store.put_owner(token.id, &Identity::from("r2")).unwrap();

        let tokens = store.tokens().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].owner, Identity::from("r2"));
        assert_eq!(tokens[0].metadata.contributor, Identity::from("r1"));
    }
}
