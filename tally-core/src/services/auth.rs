//! Auth service - email/password authentication

use std::sync::{Arc, OnceLock};

use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::Session;
use crate::ports::UsersRepository;

use super::{PasswordHasher, TokenService};

/// Input for authentication
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

pub struct AuthService {
    users: Arc<dyn UsersRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    /// Hash verified when the email is unknown, so both failure paths cost
    /// one Argon2 verification
    dummy_hash: OnceLock<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Authenticate and issue a session token
    ///
    /// Unknown email and wrong password both fail with `InvalidCredentials`.
    #[instrument(name = "AuthService: authenticate", skip(self, request))]
    pub async fn authenticate(&self, request: AuthenticateRequest) -> Result<Session> {
        let user = self.users.get_user_by_email(request.email.trim()).await?;

        let Some(user) = user else {
            self.burn_verification(&request.password)?;
            tracing::warn!("Authentication failed");
            return Err(Error::InvalidCredentials);
        };

        if !self.hasher.verify(&request.password, &user.password_hash)? {
            tracing::warn!("Authentication failed");
            return Err(Error::InvalidCredentials);
        }

        let (token, expires_at) = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, "User authenticated");

        Ok(Session {
            user: user.profile(),
            token,
            expires_at,
        })
    }

    /// Resolve the user id carried by a session token
    pub fn verify_session(&self, token: &str) -> Result<Uuid> {
        self.tokens.verify(token)
    }

    fn burn_verification(&self, password: &str) -> Result<()> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hasher.hash("tally-dummy-password")?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };
        let _ = self.hasher.verify(password, hash)?;
        Ok(())
    }
}
