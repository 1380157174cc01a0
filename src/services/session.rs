use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthSettings;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Malformed subject in session token")]
    MalformedSubject,
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub mobile: String,
    pub iat: i64,
    pub exp: i64,
}

/// The logged-in user a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub mobile: String,
}

/// Issues and verifies HS256 session tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.as_bytes();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::hours(settings.token_ttl_hours.max(1)),
        }
    }

    /// Sign a token for a user, returning it with its expiry
    pub fn issue(&self, user_id: i64, mobile: &str) -> Result<(String, DateTime<Utc>), TokenError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            mobile: mobile.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok((token, expires_at))
    }

    /// Verify signature and expiry
    pub fn verify(&self, token: &str) -> Result<Session, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        let user_id = data
            .claims
            .sub
            .parse()
            .map_err(|_| TokenError::MalformedSubject)?;

        Ok(Session {
            user_id,
            mobile: data.claims.mobile,
        })
    }
}
