//! Contribution token data types

use serde::{Deserialize, Serialize};

use super::identity::{Identity, TokenId};

/// What a token records about the contribution it was minted for.
///
/// `contributor` is the original recipient and never changes, even after
/// the token itself changes hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionMetadata {
    pub language: String,
    pub contribution_type: String,
    pub contributor: Identity,
}

/// A token joined with its current owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionToken {
    pub id: TokenId,
    pub owner: Identity,
    pub metadata: ContributionMetadata,
}

impl ContributionToken {
    /// Build a newly minted token, owned by its contributor
    pub fn minted(
        id: TokenId,
        recipient: Identity,
        language: String,
        contribution_type: String,
    ) -> Self {
        Self {
            id,
            owner: recipient.clone(),
            metadata: ContributionMetadata {
                language,
                contribution_type,
                contributor: recipient,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_token_is_owned_by_contributor() {
        let token = ContributionToken::minted(
            TokenId::first(),
            Identity::from("wallet-1"),
            "Spanish".to_string(),
            "translation".to_string(),
        );

        assert_eq!(token.owner, token.metadata.contributor);
        assert_eq!(token.metadata.language, "Spanish");
        assert_eq!(token.metadata.contribution_type, "translation");
    }
}
