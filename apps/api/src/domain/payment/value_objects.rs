use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// PSE bank transfer (Colombia)
    Pse,
    /// Card payment; only a stub intent is created
    Stripe,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Pse => write!(f, "pse"),
            PaymentMethod::Stripe => write!(f, "stripe"),
        }
    }
}

/// Local payment status
///
/// # Status Transitions
/// ```text
/// Pending -> Approved
///         -> Rejected
///         -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Failed,
}

impl PaymentStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Approved => write!(f, "approved"),
            PaymentStatus::Rejected => write!(f, "rejected"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Transaction state as reported by the PSE gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseStatus {
    Known(PaymentStatus),
    Unrecognized(String),
}

impl PseStatus {
    /// Maps a gateway status code to a local status
    ///
    /// # Example
    /// ```
    /// use tienda_api::domain::payment::value_objects::{PaymentStatus, PseStatus};
    ///
    /// assert_eq!(PseStatus::from_code(" approved "), PseStatus::Known(PaymentStatus::Approved));
    /// assert_eq!(PseStatus::from_code("NOT_AUTHORIZED"), PseStatus::Known(PaymentStatus::Rejected));
    /// ```
    pub fn from_code(code: &str) -> Self {
        let normalized = code.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "APPROVED" | "OK" => PseStatus::Known(PaymentStatus::Approved),
            "PENDING" | "PROCESSING" | "IN_PROGRESS" => PseStatus::Known(PaymentStatus::Pending),
            "REJECTED" | "DECLINED" | "NOT_AUTHORIZED" => PseStatus::Known(PaymentStatus::Rejected),
            "FAILED" | "ERROR" | "EXPIRED" => PseStatus::Known(PaymentStatus::Failed),
            _ => PseStatus::Unrecognized(normalized),
        }
    }

    /// Local status to apply; unrecognised codes leave the payment pending
    pub fn effective(&self) -> PaymentStatus {
        match self {
            PseStatus::Known(status) => *status,
            PseStatus::Unrecognized(_) => PaymentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonType {
    Natural,
    Juridica,
}

impl PersonType {
    /// Single-letter code expected by the gateway
    pub fn code(&self) -> &'static str {
        match self {
            PersonType::Natural => "N",
            PersonType::Juridica => "J",
        }
    }
}

/// Colombian identity document kinds accepted by PSE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    /// Cédula de ciudadanía
    Cc,
    /// Cédula de extranjería
    Ce,
    Nit,
    /// Tarjeta de identidad
    Ti,
    /// Pasaporte
    Pp,
}

impl DocumentType {
    pub fn code(&self) -> &'static str {
        match self {
            DocumentType::Cc => "CC",
            DocumentType::Ce => "CE",
            DocumentType::Nit => "NIT",
            DocumentType::Ti => "TI",
            DocumentType::Pp => "PP",
        }
    }
}

/// Payer identification for a PSE transfer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PsePayer {
    pub bank_code: String,
    pub person_type: PersonType,
    pub document_type: DocumentType,
    pub document_number: String,
}

impl PsePayer {
    pub fn validate(&self) -> DomainResult<()> {
        if self.bank_code.trim().is_empty() {
            return Err(DomainError::validation("Bank code is required"));
        }
        let number = self.document_number.trim();
        let digits_ok = number.chars().all(|c| c.is_ascii_digit());
        if !digits_ok || !(5..=15).contains(&number.len()) {
            return Err(DomainError::validation(
                "Document number must have between 5 and 15 digits",
            ));
        }
        Ok(())
    }
}
