use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Hex id of the user the token was issued to.
    pub sub: String,
    /// Expiration (Unix seconds).
    pub exp: i64,
    /// Issued at (Unix seconds).
    pub iat: i64,
}

/// Sign an HS256 access token for `user_id`, valid for `ttl`.
pub fn issue_token(user_id: &ObjectId, secret: &str, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_hex(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign access token: {e}")))
}

/// Verify signature and expiry, returning the user id the token names.
pub fn verify_token(token: &str, secret: &str) -> Result<ObjectId, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| AppError::Auth(format!("Invalid access token: {e}")))?;

    ObjectId::parse_str(&data.claims.sub)
        .map_err(|_| AppError::Auth("Access token names an invalid user id".into()))
}
