// JWT token creation and verification
// Tokens carry the user id and role; lifetime comes from configuration

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserRole;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user_id)
/// * `role` - Access level at the time the token was issued
/// * `iat` - Issue time (seconds since epoch)
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

/// Creates a signed HS256 token for a user
///
/// # Example
/// ```
/// use tienda_api::auth::jwt::{create_token, verify_token};
/// use tienda_api::domain::user::UserRole;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = create_token(user_id, UserRole::Customer, "secret", 8).unwrap();
/// let claims = verify_token(&token, "secret").expect("valid token");
/// assert_eq!(claims.sub, user_id);
/// ```
pub fn create_token(
    user_id: Uuid,
    role: UserRole,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, String> {
    let issued_at = Utc::now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: issued_at.timestamp() as usize,
        exp: (issued_at + Duration::hours(ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies signature and expiry, returning the decoded claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn create_and_verify_token() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, UserRole::Admin, TEST_SECRET, 8).expect("valid token");

        let claims = verify_token(&token, TEST_SECRET).expect("valid verification");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn wrong_secret_fails() {
        let token =
            create_token(Uuid::new_v4(), UserRole::Customer, TEST_SECRET, 8).expect("valid token");
        assert!(verify_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn invalid_token_fails() {
        assert!(verify_token("invalid.token.string", TEST_SECRET).is_err());
    }

    #[test]
    fn expired_token_fails() {
        // Default validation allows 60s of leeway
        let token =
            create_token(Uuid::new_v4(), UserRole::Customer, TEST_SECRET, -2).expect("valid token");
        assert!(verify_token(&token, TEST_SECRET).is_err());
    }

    #[test]
    fn token_expiry_follows_ttl() {
        let token =
            create_token(Uuid::new_v4(), UserRole::Customer, TEST_SECRET, 24).expect("valid token");

        let claims = verify_token(&token, TEST_SECRET).expect("valid verification");
        let expiry_time = claims.exp as i64;
        let in_23_hours = (Utc::now() + Duration::hours(23)).timestamp();
        let in_24_hours = (Utc::now() + Duration::hours(24)).timestamp();

        assert!(expiry_time > in_23_hours);
        assert!(expiry_time <= in_24_hours + 10);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }
}
