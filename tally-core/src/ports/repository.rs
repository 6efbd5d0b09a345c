//! Repository ports - storage abstraction for users and statements

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Statement, User};

/// User storage
///
/// Implementations must keep emails unique: `add_user` with an email that is
/// already stored fails with `Error::UserAlreadyExists`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Store a new user
    async fn add_user(&self, user: &User) -> Result<()>;

    /// Get user by ID
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Get user by email (exact match)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Append-only statement storage
#[async_trait]
pub trait StatementsRepository: Send + Sync {
    /// Append a statement
    async fn add_statement(&self, statement: &Statement) -> Result<()>;

    /// Get a statement by ID, only if it belongs to `user_id`
    async fn get_statement(&self, user_id: Uuid, statement_id: Uuid) -> Result<Option<Statement>>;

    /// Get every statement of a user, oldest first
    async fn get_statements_by_user(&self, user_id: Uuid) -> Result<Vec<Statement>>;
}
