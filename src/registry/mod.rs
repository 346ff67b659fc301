//! Registry state machines
//!
//! Two independent registries that share no state:
//! - [`ExchangeRegistry`]: language lists and paired exchange sessions
//! - [`ContributionTokenRegistry`]: administrator-minted, transferable tokens
//!
//! Every operation takes the caller identity explicitly. Rejections are
//! returned as values and leave all stored state untouched.

pub mod error;
pub mod exchange;
pub mod tokens;

pub use error::{ErrorKind, ExchangeError, TokenError};
pub use exchange::ExchangeRegistry;
pub use tokens::ContributionTokenRegistry;
