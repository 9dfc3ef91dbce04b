use serde::{Deserialize, Serialize};
use std::fmt;

/// Email value object representing a normalized email address
///
/// # Invariants
/// - Stored trimmed and lower-cased
/// - Exactly one '@' with non-empty local and domain parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use tienda_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("  Cliente@Example.COM ").expect("valid email");
    /// assert_eq!(email.as_str(), "cliente@example.com");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let email = email.into().trim().to_lowercase();
        if Self::is_valid(&email) {
            Ok(Email(email))
        } else {
            Err(format!("Invalid email: {}", email))
        }
    }

    fn is_valid(email: &str) -> bool {
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !email.contains(char::is_whitespace)
            }
            None => false,
        }
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access level of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Customer => write!(f, "customer"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email() {
        assert!(Email::new("test@example.com").is_ok());
    }

    #[test]
    fn email_is_normalized() {
        let email = Email::new(" Ana.Gomez@Correo.CO ").unwrap();
        assert_eq!(email.as_str(), "ana.gomez@correo.co");
    }

    #[test]
    fn invalid_email_no_at_symbol() {
        assert!(Email::new("invalid").is_err());
    }

    #[test]
    fn invalid_email_missing_domain() {
        assert!(Email::new("a@").is_err());
    }

    #[test]
    fn invalid_email_missing_local_part() {
        assert!(Email::new("@example.com").is_err());
    }

    #[test]
    fn invalid_email_two_at_symbols() {
        assert!(Email::new("a@b@c").is_err());
    }

    #[test]
    fn invalid_email_inner_whitespace() {
        assert!(Email::new("ana gomez@correo.co").is_err());
    }

    #[test]
    fn invalid_email_empty() {
        assert!(Email::new("").is_err());
    }

    #[test]
    fn role_display() {
        assert_eq!(UserRole::Customer.to_string(), "customer");
        assert_eq!(UserRole::Admin.to_string(), "admin");
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Customer.is_admin());
    }
}
