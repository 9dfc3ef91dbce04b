// Password hashing utilities
// Uses bcrypt for secure password hashing

use bcrypt::{hash, verify, DEFAULT_COST};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks the password policy before hashing
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password.trim().is_empty() {
        return Err("Password cannot be blank".to_string());
    }
    Ok(())
}

/// Hashes a password using bcrypt
///
/// # Example
/// ```
/// use tienda_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("contraseña-segura").unwrap();
/// assert!(verify_password("contraseña-segura", &hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<String, String> {
    hash(password, DEFAULT_COST).map_err(|e| e.to_string())
}

/// Verifies a password against a bcrypt hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    verify(password, hash).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_password() {
        let password = "test_password_123";
        let hash = hash_password(password).expect("valid hash");

        assert!(verify_password(password, &hash).expect("valid verification"));
        assert!(!verify_password("wrong_password", &hash).expect("valid verification"));
    }

    #[test]
    fn hashes_are_salted() {
        let password = "test_password_123";
        let hash1 = hash_password(password).expect("valid hash");
        let hash2 = hash_password(password).expect("valid hash");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn password_policy() {
        assert!(validate_password("corta").is_err());
        assert!(validate_password("        ").is_err());
        assert!(validate_password("suficiente").is_ok());
        // Length counts characters, not bytes
        assert!(validate_password("ñandú").is_err());
    }
}
