//! Tally Core - Business logic for a per-user bookkeeping ledger
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Statement, Balance)
//! - **ports**: Trait definitions for the user and statement stores
//! - **services**: Use cases (registration, authentication, statements)
//! - **adapters**: Store implementations (DuckDB, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbRepository;
use adapters::memory::InMemoryRepository;
use config::Config;
use ports::{StatementsRepository, UsersRepository};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Balance, OperationType, Session, Statement, User, UserProfile};
pub use services::{
    AuthenticateRequest, CreateStatementRequest, CreateUserRequest, LogEntry, LogEvent,
    LoggingService,
};

/// Name of the ledger database file inside the tally directory
pub const DB_FILENAME: &str = "tally.duckdb";

/// Main context for Tally operations
///
/// Holds the configuration and every service, wired to one pair of stores.
pub struct TallyContext {
    pub config: Config,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub statement_service: StatementService,
    pub token_service: Arc<TokenService>,
}

impl TallyContext {
    /// Open the DuckDB ledger in `tally_dir`, creating the schema if needed
    ///
    /// A signing secret is generated and saved to settings.json when none is
    /// configured.
    pub fn new(tally_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(tally_dir)
            .with_context(|| format!("Failed to create {}", tally_dir.display()))?;

        let mut config = Config::load(tally_dir)?;
        config.ensure_jwt_secret(tally_dir)?;

        let repository = Arc::new(DuckDbRepository::new(&tally_dir.join(DB_FILENAME))?);
        repository.ensure_schema()?;

        Self::from_repositories(config, repository.clone(), repository)
    }

    /// Context backed by the in-memory store
    pub fn in_memory(config: Config) -> Result<Self> {
        let repository = Arc::new(InMemoryRepository::new());
        Self::from_repositories(config, repository.clone(), repository)
    }

    pub fn from_repositories(
        config: Config,
        users: Arc<dyn UsersRepository>,
        statements: Arc<dyn StatementsRepository>,
    ) -> Result<Self> {
        let secret = config
            .jwt_secret
            .clone()
            .context("No token signing secret configured")?;

        let hasher = PasswordHasher::new(&config.password_hashing)?;
        let token_service = Arc::new(TokenService::new(secret.as_bytes(), config.token_ttl()?)?);

        let user_service = UserService::new(Arc::clone(&users), hasher.clone());
        let auth_service = AuthService::new(Arc::clone(&users), hasher, Arc::clone(&token_service));
        let statement_service = StatementService::new(users, statements);

        Ok(Self {
            config,
            user_service,
            auth_service,
            statement_service,
            token_service,
        })
    }
}
