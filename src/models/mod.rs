//! Data models module
//!
//! Contains the records held by both registries:
//! - Caller identities and sequential ids
//! - Exchange sessions and user language lists
//! - Contribution tokens and their metadata

pub mod identity;
pub mod session;
pub mod token;

pub use identity::{Identity, SessionId, TokenId};
pub use session::{Session, SessionStatus, UserLanguages};
pub use token::{ContributionMetadata, ContributionToken};
