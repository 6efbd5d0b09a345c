//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// The first five variants are the use-case failures callers are expected to
/// match on. The rest describe infrastructure problems.
#[derive(Error, Debug)]
pub enum Error {
    #[error("User already exists")]
    UserAlreadyExists,

    /// Returned for both an unknown email and a wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Statement not found")]
    StatementNotFound,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Validation error: {0}")]
    Validation(String),

    /// The statement history sums past what a decimal can represent.
    #[error("Balance exceeds the representable range")]
    BalanceOverflow,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable name, used for JSON output and the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UserAlreadyExists => "user_already_exists",
            Error::InvalidCredentials => "invalid_credentials",
            Error::UserNotFound => "user_not_found",
            Error::StatementNotFound => "statement_not_found",
            Error::InsufficientFunds => "insufficient_funds",
            Error::InvalidToken => "invalid_token",
            Error::Validation(_) => "validation",
            Error::BalanceOverflow => "balance_overflow",
            Error::Database(_) => "database",
            Error::Token(_) => "token",
            Error::Hashing(_) => "hashing",
            Error::Config(_) => "config",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
