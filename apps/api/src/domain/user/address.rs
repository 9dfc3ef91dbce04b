use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Delivery address saved in a customer's address book
///
/// # Invariants
/// - Recipient, line1, city and department are non-empty
/// - At most one default address per user (enforced by the repository)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub label: Option<String>,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub department: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Input data for a new address
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub label: Option<String>,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub department: String,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Validates the input and builds an address owned by `user_id`
    pub fn new(user_id: Uuid, input: NewAddress) -> DomainResult<Self> {
        let required = [
            ("recipient", &input.recipient),
            ("line1", &input.line1),
            ("city", &input.city),
            ("department", &input.department),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{} is required", field)));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            label: blank_to_none(input.label),
            recipient: input.recipient.trim().to_string(),
            line1: input.line1.trim().to_string(),
            line2: blank_to_none(input.line2),
            city: input.city.trim().to_string(),
            department: input.department.trim().to_string(),
            postal_code: blank_to_none(input.postal_code),
            phone: blank_to_none(input.phone),
            is_default: input.is_default,
            created_at: Utc::now(),
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewAddress {
        NewAddress {
            label: Some("Casa".to_string()),
            recipient: "Laura Pérez".to_string(),
            line1: "Calle 10 # 43-12".to_string(),
            line2: Some("  ".to_string()),
            city: "Medellín".to_string(),
            department: "Antioquia".to_string(),
            postal_code: None,
            phone: Some("3001234567".to_string()),
            is_default: true,
        }
    }

    #[test]
    fn builds_valid_address() {
        let user_id = Uuid::new_v4();
        let address = Address::new(user_id, input()).unwrap();
        assert_eq!(address.user_id, user_id);
        assert_eq!(address.city, "Medellín");
        assert_eq!(address.line2, None);
        assert!(address.is_default);
    }

    #[test]
    fn rejects_missing_city() {
        let mut data = input();
        data.city = " ".to_string();
        let err = Address::new(Uuid::new_v4(), data).unwrap_err();
        assert_eq!(err.to_string(), "city is required");
    }
}
