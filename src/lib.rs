//! Lingua Registry
//!
//! State-transition core for two independent registries:
//! - Language exchange: users register spoken languages and pair up in
//!   sessions that move from open to in-progress to completed
//! - Contribution tokens: an administrator mints tokens recording a
//!   language contribution; owners transfer them freely
//!
//! The caller identity is supplied by the hosting environment and passed
//! explicitly into every operation. State is kept in SQLite or in memory.

pub mod commands;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod registry;
pub mod store;

use std::path::PathBuf;
use std::sync::Mutex;

use config::{Config, ConfigError, StorageBackend};
use db::Database;
use models::Identity;
use registry::{ContributionTokenRegistry, ExchangeError, ExchangeRegistry, TokenError};
use store::{ExchangeStore, MemoryStore, StoreError, TokenStore};

/// Storage behind the exchange registry, chosen at startup
pub type ExchangeBackend = Box<dyn ExchangeStore + Send>;
/// Storage behind the token registry, chosen at startup
pub type TokenBackend = Box<dyn TokenStore + Send>;

/// Code reported for failures outside the registry rules
pub const ERR_INTERNAL: u32 = 500;

/// Shared state for command handlers.
///
/// Each registry sits behind its own lock, so every operation runs in a
/// single critical section.
pub struct AppState {
    pub exchange: Mutex<ExchangeRegistry<ExchangeBackend>>,
    pub tokens: Mutex<ContributionTokenRegistry<TokenBackend>>,
    pub export_dir: Option<PathBuf>,
}

impl AppState {
    /// Build both registries over the configured backend
    pub fn open(config: &Config) -> Result<Self, CommandError> {
        let (exchange, tokens): (ExchangeBackend, TokenBackend) = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory registry storage");
                let exchange: ExchangeBackend = Box::new(MemoryStore::new());
                let tokens: TokenBackend = Box::new(MemoryStore::new());
                (exchange, tokens)
            }
            StorageBackend::Sqlite => {
                let db_path = config.db_path();
                tracing::info!("Database path: {:?}", db_path);

                if let Some(parent) = db_path.parent() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        tracing::error!("Failed to create database directory: {}", e);
                    }
                }

                // One connection per registry; they touch disjoint tables
                let exchange_db = Database::new(db_path.clone())?;
                exchange_db.initialize()?;
                let token_db = Database::new(db_path.clone())?;
                token_db.initialize()?;

                tracing::info!("Database initialized successfully at {:?}", db_path);
                let exchange: ExchangeBackend = Box::new(exchange_db);
                let tokens: TokenBackend = Box::new(token_db);
                (exchange, tokens)
            }
        };

        Ok(Self::with_backends(
            exchange,
            tokens,
            config.administrator.clone(),
            config.export.directory.clone(),
        ))
    }

    pub fn with_backends(
        exchange: ExchangeBackend,
        tokens: TokenBackend,
        administrator: Identity,
        export_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            exchange: Mutex::new(ExchangeRegistry::new(exchange)),
            tokens: Mutex::new(ContributionTokenRegistry::new(tokens, administrator)),
            export_dir,
        }
    }

    /// Volatile state, mostly useful for tests and demos
    pub fn in_memory(administrator: Identity) -> Self {
        Self::with_backends(
            Box::new(MemoryStore::new()),
            Box::new(MemoryStore::new()),
            administrator,
            None,
        )
    }
}

/// Error type for command handlers
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry lock poisoned")]
    LockPoisoned,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommandError {
    /// Numeric code for the tagged result
    pub fn code(&self) -> u32 {
        let code = match self {
            CommandError::Exchange(e) => e.code(),
            CommandError::Token(e) => e.code(),
            _ => None,
        };
        code.unwrap_or(ERR_INTERNAL)
    }
}

impl serde::Serialize for CommandError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Install the global `tracing` subscriber. Later calls are no-ops.
pub fn init_logging(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init();
}

/// Load logging and storage from `config` and return ready command state
pub fn start(config: &Config) -> Result<AppState, CommandError> {
    init_logging(config.log_level()?);
    tracing::info!(
        administrator = %config.administrator,
        "Starting lingua registry"
    );
    AppState::open(config)
}
