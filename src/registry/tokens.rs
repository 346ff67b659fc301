//! Contribution token registry
//!
//! Only the administrator fixed at construction may mint. Ownership moves
//! by transfer; the recorded contributor never does.

use tracing::{debug, info, warn};

use super::error::TokenError;
use crate::models::{ContributionMetadata, ContributionToken, Identity, TokenId};
use crate::store::{StoreError, TokenStore};

/// Token ownership state machine over a [`TokenStore`]
pub struct ContributionTokenRegistry<S> {
    store: S,
    administrator: Identity,
}

impl<S: TokenStore> ContributionTokenRegistry<S> {
    pub fn new(store: S, administrator: Identity) -> Self {
        Self {
            store,
            administrator,
        }
    }

    pub fn administrator(&self) -> &Identity {
        &self.administrator
    }

    /// Mint a token for `recipient` and return its id.
    ///
    /// A rejected mint does not consume an id.
    pub fn mint(
        &mut self,
        caller: &Identity,
        recipient: Identity,
        language: String,
        contribution_type: String,
    ) -> Result<TokenId, TokenError> {
        if caller != &self.administrator {
            return Err(reject(TokenError::NotAdministrator(caller.clone())));
        }

        let id = TokenId::new(self.store.last_token_id()?).next();
        let token = ContributionToken::minted(id, recipient, language, contribution_type);
        self.store.put_token(&token)?;

        info!(
            token_id = %id,
            recipient = %token.owner,
            language = %token.metadata.language,
            contribution_type = %token.metadata.contribution_type,
            "Minted contribution token"
        );
        Ok(id)
    }

    /// Hand a token to `recipient`.
    ///
    /// A missing token and a token owned by someone else are rejected
    /// alike: the caller is not its owner.
    pub fn transfer(
        &mut self,
        id: TokenId,
        caller: &Identity,
        recipient: Identity,
    ) -> Result<(), TokenError> {
        if self.store.owner(id)?.as_ref() != Some(caller) {
            return Err(reject(TokenError::NotOwner {
                token: id,
                caller: caller.clone(),
            }));
        }

        self.store.put_owner(id, &recipient)?;

        info!(token_id = %id, from = %caller, to = %recipient, "Transferred token");
        Ok(())
    }

    pub fn get_owner(&self, id: TokenId) -> Result<Option<Identity>, StoreError> {
        debug!(token_id = %id, "Fetching token owner");
        self.store.owner(id)
    }

    pub fn get_token_metadata(
        &self,
        id: TokenId,
    ) -> Result<Option<ContributionMetadata>, StoreError> {
        debug!(token_id = %id, "Fetching token metadata");
        self.store.metadata(id)
    }

    /// All tokens in id order
    pub fn tokens(&self) -> Result<Vec<ContributionToken>, StoreError> {
        self.store.tokens()
    }

    pub fn tokens_owned_by(&self, owner: &Identity) -> Result<Vec<ContributionToken>, StoreError> {
        Ok(self
            .store
            .tokens()?
            .into_iter()
            .filter(|token| &token.owner == owner)
            .collect())
    }
}

fn reject(err: TokenError) -> TokenError {
    warn!(kind = ?err.kind(), "Rejected token operation: {}", err);
    err
}
