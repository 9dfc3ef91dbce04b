use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::{PaymentMethod, PaymentStatus};
use crate::domain::errors::{DomainError, DomainResult};

/// Result of applying a gateway status to a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentUpdate {
    /// Same status seen again; nothing changed
    Unchanged,
    /// Still pending; only the raw gateway status was recorded
    Recorded,
    /// Payment reached a final status
    Finalized(PaymentStatus),
}

/// Payment attempt for an order
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub currency: String,
    /// Gateway transaction id (PSE) or intent id (Stripe)
    pub provider_reference: Option<String>,
    /// Bank redirect URL (PSE) or client secret (Stripe)
    pub redirect_url: Option<String>,
    pub raw_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn pending(
        order_id: Uuid,
        method: PaymentMethod,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount(amount));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            order_id,
            method,
            status: PaymentStatus::Pending,
            amount,
            currency: currency.into(),
            provider_reference: None,
            redirect_url: None,
            raw_status: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a status reported by the provider
    ///
    /// A final payment ignores late non-final codes and rejects a different
    /// final status.
    pub fn apply_status(&mut self, next: PaymentStatus, raw: &str) -> DomainResult<PaymentUpdate> {
        if self.status == next && (next.is_final() || self.raw_status.as_deref() == Some(raw)) {
            return Ok(PaymentUpdate::Unchanged);
        }
        if self.status.is_final() {
            if !next.is_final() {
                return Ok(PaymentUpdate::Unchanged);
            }
            return Err(DomainError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        self.raw_status = Some(raw.to_string());
        self.updated_at = Utc::now();
        if next.is_final() {
            self.status = next;
            Ok(PaymentUpdate::Finalized(next))
        } else {
            Ok(PaymentUpdate::Recorded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> Payment {
        Payment::pending(Uuid::new_v4(), PaymentMethod::Pse, Decimal::new(50000, 0), "COP").unwrap()
    }

    #[test]
    fn zero_amount_rejected() {
        assert!(Payment::pending(Uuid::new_v4(), PaymentMethod::Pse, Decimal::ZERO, "COP").is_err());
    }

    #[test]
    fn approval_finalizes() {
        let mut p = payment();
        let update = p.apply_status(PaymentStatus::Approved, "APPROVED").unwrap();
        assert_eq!(update, PaymentUpdate::Finalized(PaymentStatus::Approved));
        assert_eq!(p.status, PaymentStatus::Approved);
        assert_eq!(p.raw_status.as_deref(), Some("APPROVED"));
    }

    #[test]
    fn replay_is_noop() {
        let mut p = payment();
        p.apply_status(PaymentStatus::Rejected, "REJECTED").unwrap();
        let update = p.apply_status(PaymentStatus::Rejected, "DECLINED").unwrap();
        assert_eq!(update, PaymentUpdate::Unchanged);
        assert_eq!(p.raw_status.as_deref(), Some("REJECTED"));
    }

    #[test]
    fn final_status_cannot_change() {
        let mut p = payment();
        p.apply_status(PaymentStatus::Approved, "APPROVED").unwrap();
        assert!(matches!(
            p.apply_status(PaymentStatus::Failed, "FAILED"),
            Err(DomainError::InvalidTransition { .. })
        ));
        assert_eq!(p.status, PaymentStatus::Approved);
    }

    #[test]
    fn late_pending_code_after_final_is_ignored() {
        let mut p = payment();
        p.apply_status(PaymentStatus::Approved, "APPROVED").unwrap();
        let update = p.apply_status(PaymentStatus::Pending, "PROCESSING").unwrap();
        assert_eq!(update, PaymentUpdate::Unchanged);
        assert_eq!(p.status, PaymentStatus::Approved);
        assert_eq!(p.raw_status.as_deref(), Some("APPROVED"));
    }

    #[test]
    fn pending_codes_are_recorded() {
        let mut p = payment();
        assert_eq!(
            p.apply_status(PaymentStatus::Pending, "PROCESSING").unwrap(),
            PaymentUpdate::Recorded
        );
        assert_eq!(
            p.apply_status(PaymentStatus::Pending, "PROCESSING").unwrap(),
            PaymentUpdate::Unchanged
        );
        assert_eq!(p.status, PaymentStatus::Pending);
    }
}
