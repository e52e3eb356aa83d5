use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

pub mod password;

/// Bearer token claims: subject id and email, expiring a fixed number of
/// hours after issuance. Stateless - there is no revocation list, so a
/// token stays valid until natural expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: i64, email: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.token_expiry_hours;

        Self {
            sub,
            email,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT_SECRET is not configured")]
    MissingSecret,

    #[error("token generation failed: {0}")]
    Encode(String),

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Sign a token for the given subject. Refuses to sign when no secret is
/// configured rather than issuing an unverifiable token.
pub fn issue_token(subject_id: i64, email: &str) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let claims = Claims::new(subject_id, email.to_string());
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Encode(e.to_string()))
}

/// Verify signature and expiry, returning the embedded claims. A payload
/// that does not verify is never partially trusted.
pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}
