//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod balance;
pub mod result;
mod session;
mod statement;
mod user;

pub use balance::{compute_balance, Balance};
pub use session::{Argon2Params, Claims, Session, DEFAULT_TOKEN_TTL_SECONDS};
pub use statement::{validate_amount, OperationType, Statement, AMOUNT_SCALE, MAX_AMOUNT};
pub use user::{User, UserProfile};
