//! services/api/src/web/token.rs
//!
//! Bearer identity tokens (JWT) issued at signup/login and verified by the
//! auth middleware on every protected request.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Email, carried for convenience; never used for authorization.
    pub email: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
}

/// Creates a signed token for a user.
pub fn create_token(
    secret: &str,
    ttl_days: i64,
    user_id: Uuid,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies a token's signature and expiry, returning its claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Extracts the verified user id from a token.
pub fn user_id_from_token(secret: &str, token: &str) -> Option<Uuid> {
    let claims = verify_token(secret, token).ok()?;
    Uuid::parse_str(&claims.sub).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips_identity() {
        let user_id = Uuid::new_v4();
        let token = create_token(SECRET, 30, user_id, "test@example.com").unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(user_id_from_token(SECRET, &token), Some(user_id));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(SECRET, "invalid.token.here").is_err());
        assert!(user_id_from_token(SECRET, "invalid.token.here").is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(SECRET, 30, Uuid::new_v4(), "a@b.c").unwrap();
        assert!(verify_token("another-secret", &token).is_err());
    }
}
