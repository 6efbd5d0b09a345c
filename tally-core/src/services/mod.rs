//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

mod auth;
pub mod logging;
pub mod migration;
mod password;
mod statements;
mod token;
mod users;

pub use auth::{AuthService, AuthenticateRequest};
pub use logging::{LogEntry, LogEvent, LoggingService, Outcome};
pub use migration::{MigrationResult, MigrationService, MigrationSet};
pub use password::PasswordHasher;
pub use statements::{CreateStatementRequest, StatementService};
pub use token::TokenService;
pub use users::{CreateUserRequest, UserService};
