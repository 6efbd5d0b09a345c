//! Token service - signed, time-limited session credentials (JWT, HS256)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::Claims;

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Config("token secret must not be empty".to_string()));
        }
        if ttl <= Duration::zero() {
            return Err(Error::Config("token lifetime must be positive".to_string()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    /// Issue a token for a user, returning it with its expiry time
    pub fn issue(&self, user_id: Uuid) -> Result<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Token("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Token(e.to_string()))?;
        Ok((token, expires_at))
    }

    /// Verify a token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            Error::InvalidToken
        })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| Error::InvalidToken)
    }
}
