//! Language exchange registry
//!
//! Users register the languages they speak and pair up in sessions.
//! `join_session` and `complete_session` check existence, then lifecycle
//! stage, then caller identity, and report the first failure.

use tracing::{debug, info, warn};

use super::error::ExchangeError;
use crate::models::{Identity, Session, SessionId, SessionStatus, UserLanguages};
use crate::store::{ExchangeStore, StoreError};

/// Session matching state machine over an [`ExchangeStore`]
pub struct ExchangeRegistry<S> {
    store: S,
}

impl<S: ExchangeStore> ExchangeRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Replace the caller's language list. Always succeeds.
    pub fn register_languages(
        &mut self,
        caller: &Identity,
        languages: Vec<String>,
    ) -> Result<(), ExchangeError> {
        self.store.put_user_languages(caller, &languages)?;
        info!(user = %caller, count = languages.len(), "Registered languages");
        Ok(())
    }

    /// Open a new session owned by the caller and return its id
    pub fn create_session(
        &mut self,
        caller: &Identity,
        language_a: String,
        language_b: String,
    ) -> Result<SessionId, ExchangeError> {
        let id = SessionId::new(self.store.last_session_id()?).next();
        let session = Session::open(id, caller.clone(), language_a, language_b);
        self.store.put_session(&session)?;

        info!(
            session_id = %id,
            creator = %caller,
            language_a = %session.language_a,
            language_b = %session.language_b,
            "Created session"
        );
        Ok(id)
    }

    /// Pair a second participant with an open session
    pub fn join_session(&mut self, caller: &Identity, id: SessionId) -> Result<(), ExchangeError> {
        let mut session = self.existing(id)?;

        if session.status != SessionStatus::Open {
            return Err(reject(ExchangeError::InvalidState {
                id,
                status: session.status,
                expected: SessionStatus::Open,
            }));
        }
        if &session.participant_a == caller {
            return Err(reject(ExchangeError::Unauthorized {
                id,
                caller: caller.clone(),
            }));
        }

        session.participant_b = caller.clone();
        session.status = SessionStatus::InProgress;
        self.store.put_session(&session)?;

        info!(session_id = %id, participant = %caller, "Joined session");
        Ok(())
    }

    /// Mark an in-progress session as completed. Either participant may do so.
    pub fn complete_session(
        &mut self,
        caller: &Identity,
        id: SessionId,
    ) -> Result<(), ExchangeError> {
        let mut session = self.existing(id)?;

        if session.status != SessionStatus::InProgress {
            return Err(reject(ExchangeError::InvalidState {
                id,
                status: session.status,
                expected: SessionStatus::InProgress,
            }));
        }
        if !session.is_participant(caller) {
            return Err(reject(ExchangeError::Unauthorized {
                id,
                caller: caller.clone(),
            }));
        }

        session.status = SessionStatus::Completed;
        self.store.put_session(&session)?;

        info!(session_id = %id, by = %caller, "Completed session");
        Ok(())
    }

    pub fn get_session(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        debug!(session_id = %id, "Fetching session");
        self.store.session(id)
    }

    pub fn get_user_languages(&self, user: &Identity) -> Result<Option<Vec<String>>, StoreError> {
        debug!(user = %user, "Fetching user languages");
        self.store.user_languages(user)
    }

    /// All sessions in id order
    pub fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.store.sessions()
    }

    /// The whole user language table
    pub fn user_languages_table(&self) -> Result<Vec<UserLanguages>, StoreError> {
        self.store.all_user_languages()
    }

    fn existing(&self, id: SessionId) -> Result<Session, ExchangeError> {
        self.store
            .session(id)?
            .ok_or_else(|| reject(ExchangeError::NotFound(id)))
    }
}

fn reject(err: ExchangeError) -> ExchangeError {
    warn!(kind = ?err.kind(), "Rejected exchange operation: {}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::registry::error::ErrorKind;
    use crate::store::MemoryStore;

    const WALLET_1: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG";
    const WALLET_2: &str = "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC";
    const WALLET_3: &str = "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0";

    fn memory_registry() -> ExchangeRegistry<MemoryStore> {
        ExchangeRegistry::new(MemoryStore::new())
    }

    fn sqlite_registry() -> ExchangeRegistry<Database> {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        ExchangeRegistry::new(db)
    }

    fn wallet(id: &str) -> Identity {
        Identity::from(id)
    }

    fn open_session<S: ExchangeStore>(registry: &mut ExchangeRegistry<S>) -> SessionId {
        registry
            .create_session(&wallet(WALLET_1), "English".to_string(), "Spanish".to_string())
            .unwrap()
    }

    fn kind(err: ExchangeError) -> Option<ErrorKind> {
        err.kind()
    }

    #[test]
    fn test_register_languages() {
        let mut registry = memory_registry();
        let languages = vec![
            "English".to_string(),
            "Spanish".to_string(),
            "French".to_string(),
        ];

        registry
            .register_languages(&wallet(WALLET_1), languages.clone())
            .unwrap();

        assert_eq!(
            registry.get_user_languages(&wallet(WALLET_1)).unwrap(),
            Some(languages)
        );
        assert_eq!(registry.get_user_languages(&wallet(WALLET_2)).unwrap(), None);
    }

    #[test]
    fn test_register_languages_replaces_previous_list() {
        let mut registry = memory_registry();
        let user = wallet(WALLET_1);

        registry
            .register_languages(&user, vec!["English".to_string(), "German".to_string()])
            .unwrap();
        registry
            .register_languages(&user, vec!["japanese".to_string(), "japanese".to_string()])
            .unwrap();

        assert_eq!(
            registry.get_user_languages(&user).unwrap(),
            Some(vec!["japanese".to_string(), "japanese".to_string()])
        );
    }

    #[test]
    fn test_register_empty_language_list() {
        let mut registry = memory_registry();
        registry.register_languages(&wallet(WALLET_1), vec![]).unwrap();
        assert_eq!(registry.get_user_languages(&wallet(WALLET_1)).unwrap(), Some(vec![]));
    }

    #[test]
    fn test_create_session() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);
        assert_eq!(id, SessionId::first());

        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(
            session,
            Session {
                id,
                language_a: "English".to_string(),
                language_b: "Spanish".to_string(),
                participant_a: wallet(WALLET_1),
                participant_b: wallet(WALLET_1),
                status: SessionStatus::Open,
            }
        );
    }

    #[test]
    fn test_session_ids_are_sequential() {
        let mut registry = memory_registry();
        let ids: Vec<u64> = (0..5)
            .map(|i| {
                let caller = if i % 2 == 0 { WALLET_1 } else { WALLET_2 };
                registry
                    .create_session(&wallet(caller), "English".to_string(), "English".to_string())
                    .unwrap()
                    .value()
            })
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_create_session_allows_same_language_pair() {
        let mut registry = memory_registry();
        let id = registry
            .create_session(&wallet(WALLET_1), "Korean".to_string(), "Korean".to_string())
            .unwrap();
        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.language_a, session.language_b);
    }

    #[test]
    fn test_join_open_session() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);

        registry.join_session(&wallet(WALLET_2), id).unwrap();

        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.participant_b, wallet(WALLET_2));
        assert_eq!(session.status, SessionStatus::InProgress);
    }

    #[test]
    fn test_join_missing_session_is_not_found() {
        let mut registry = memory_registry();
        open_session(&mut registry);

        for caller in [WALLET_1, WALLET_2, WALLET_3] {
            let err = registry
                .join_session(&wallet(caller), SessionId::new(42))
                .unwrap_err();
            assert_eq!(kind(err), Some(ErrorKind::NotFound));
        }
    }

    #[test]
    fn test_join_session_not_open() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);
        registry.join_session(&wallet(WALLET_2), id).unwrap();

        let err = registry.join_session(&wallet(WALLET_3), id).unwrap_err();
        assert_eq!(err.code(), Some(100));

        // Re-joining by the participant already paired is rejected the same way
        let err = registry.join_session(&wallet(WALLET_2), id).unwrap_err();
        assert_eq!(kind(err), Some(ErrorKind::InvalidState));

        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.participant_b, wallet(WALLET_2));
    }

    #[test]
    fn test_creator_cannot_join_own_session() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);

        let err = registry.join_session(&wallet(WALLET_1), id).unwrap_err();
        assert_eq!(err.code(), Some(101));

        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.participant_b, wallet(WALLET_1));
    }

    #[test]
    fn test_join_checks_state_before_identity() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);
        registry.join_session(&wallet(WALLET_2), id).unwrap();

        // Creator re-joining an in-progress session: both state and identity fail
        let err = registry.join_session(&wallet(WALLET_1), id).unwrap_err();
        assert_eq!(kind(err), Some(ErrorKind::InvalidState));
    }

    #[test]
    fn test_complete_session() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);
        registry.join_session(&wallet(WALLET_2), id).unwrap();

        registry.complete_session(&wallet(WALLET_1), id).unwrap();

        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[test]
    fn test_joined_participant_can_complete() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);
        registry.join_session(&wallet(WALLET_2), id).unwrap();

        registry.complete_session(&wallet(WALLET_2), id).unwrap();
        assert_eq!(
            registry.get_session(id).unwrap().unwrap().status,
            SessionStatus::Completed
        );
    }

    #[test]
    fn test_non_participant_cannot_complete() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);
        registry.join_session(&wallet(WALLET_2), id).unwrap();

        let err = registry.complete_session(&wallet(WALLET_3), id).unwrap_err();
        assert_eq!(err.code(), Some(101));
        assert_eq!(
            registry.get_session(id).unwrap().unwrap().status,
            SessionStatus::InProgress
        );
    }

    #[test]
    fn test_complete_open_session_is_invalid_state() {
        let mut registry = memory_registry();
        let id = open_session(&mut registry);

        let err = registry.complete_session(&wallet(WALLET_1), id).unwrap_err();
        assert_eq!(err.code(), Some(100));
    }

    #[test]
    fn test_complete_precedence() {
        let mut registry = memory_registry();

        let err = registry
            .complete_session(&wallet(WALLET_3), SessionId::new(1))
            .unwrap_err();
        assert_eq!(kind(err), Some(ErrorKind::NotFound));

        // Open session, outsider caller: state is checked first
        let id = open_session(&mut registry);
        let err = registry.complete_session(&wallet(WALLET_3), id).unwrap_err();
        assert_eq!(kind(err), Some(ErrorKind::InvalidState));

        // Completed session, outsider caller: still a state failure
        registry.join_session(&wallet(WALLET_2), id).unwrap();
        registry.complete_session(&wallet(WALLET_2), id).unwrap();
        let err = registry.complete_session(&wallet(WALLET_3), id).unwrap_err();
        assert_eq!(kind(err), Some(ErrorKind::InvalidState));
    }

    #[test]
    fn test_exchange_end_to_end() {
        let mut registry = sqlite_registry();
        let u1 = wallet(WALLET_1);
        let u2 = wallet(WALLET_2);

        let id = registry
            .create_session(&u1, "English".to_string(), "Spanish".to_string())
            .unwrap();
        assert_eq!(id.value(), 1);
        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.participant_a, u1);
        assert_eq!(session.participant_b, u1);

        registry.join_session(&u2, id).unwrap();
        let session = registry.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::InProgress);
        assert_eq!(session.participant_b, u2);

        registry.complete_session(&u1, id).unwrap();
        assert_eq!(
            registry.get_session(id).unwrap().unwrap().status,
            SessionStatus::Completed
        );

        let err = registry.complete_session(&u1, id).unwrap_err();
        assert_eq!(kind(err), Some(ErrorKind::InvalidState));
    }

    #[test]
    fn test_sqlite_ids_continue_after_existing_rows() {
        let mut registry = sqlite_registry();
        open_session(&mut registry);
        open_session(&mut registry);
        let id = open_session(&mut registry);
        assert_eq!(id.value(), 3);
        assert_eq!(registry.sessions().unwrap().len(), 3);
    }

    #[test]
    fn test_user_languages_table_lists_every_user() {
        let mut registry = sqlite_registry();
        registry
            .register_languages(&wallet(WALLET_1), vec!["English".to_string()])
            .unwrap();
        registry
            .register_languages(&wallet(WALLET_2), vec!["Spanish".to_string()])
            .unwrap();

        let table = registry.user_languages_table().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.iter().any(|entry| entry.user == wallet(WALLET_2)
            && entry.languages == vec!["Spanish".to_string()]));
    }
}
