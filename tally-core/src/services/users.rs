//! User service - registration and profile lookup

use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{User, UserProfile};
use crate::ports::UsersRepository;

use super::PasswordHasher;

/// Input for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct UserService {
    users: Arc<dyn UsersRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(users: Arc<dyn UsersRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Register a new user
    ///
    /// Fails with `UserAlreadyExists` when the email is taken.
    #[instrument(name = "UserService: create user", skip(self, request))]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserProfile> {
        if request.password.is_empty() {
            return Err(Error::validation("password must not be empty"));
        }

        let email = request.email.trim();
        if self.users.get_user_by_email(email).await?.is_some() {
            tracing::warn!("Registration rejected: email already in use");
            return Err(Error::UserAlreadyExists);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(request.name, email, password_hash)?;
        self.users.add_user(&user).await?;

        tracing::info!(user_id = %user.id, "User created");
        Ok(user.profile())
    }

    /// Look up the profile of an existing user
    #[instrument(name = "UserService: show profile", skip(self))]
    pub async fn show_user_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = self
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or(Error::UserNotFound)?;
        Ok(user.profile())
    }
}
