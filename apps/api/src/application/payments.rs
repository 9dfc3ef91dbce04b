use serde::Deserialize;
use uuid::Uuid;

use super::orders::change_order_status;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::payment::{
    Payment, PaymentMethod, PaymentStatus, PaymentUpdate, PseBank, PseGateway, PsePayer,
    PseStatus, PseTransactionRequest,
};
use crate::domain::repositories::{OrderRepository, PaymentRepository, ProductRepository, User};
use crate::infrastructure::payments::StripeStub;

/// Body of a PSE webhook call
#[derive(Debug, Clone, Deserialize)]
pub struct PseNotification {
    pub transaction_id: String,
    #[serde(default)]
    pub reference: Option<String>,
    pub status: String,
}

/// Payment initiation, gateway notifications and status refresh
pub struct PaymentService<'a> {
    pub orders: &'a dyn OrderRepository,
    pub products: &'a dyn ProductRepository,
    pub payments: &'a dyn PaymentRepository,
    pub pse: &'a dyn PseGateway,
    pub stripe: &'a StripeStub,
    pub return_url: &'a str,
}

impl PaymentService<'_> {
    pub async fn list_banks(&self) -> DomainResult<Vec<PseBank>> {
        self.pse.list_banks().await
    }

    /// Opens a PSE transfer for `buyer`'s pending order
    pub async fn initiate_pse(
        &self,
        buyer: &User,
        order_id: Uuid,
        payer: PsePayer,
    ) -> DomainResult<Payment> {
        payer.validate()?;
        let order = self.payable_order(buyer.id, order_id).await?;
        let mut payment = Payment::pending(
            order.id(),
            PaymentMethod::Pse,
            order.total(),
            order.currency(),
        )?;

        let request = PseTransactionRequest {
            reference: order.reference().to_string(),
            amount: order.total(),
            currency: order.currency().to_string(),
            description: format!("Pedido {}", order.reference()),
            payer,
            buyer_email: buyer.email.as_str().to_string(),
            buyer_name: buyer.full_name.clone(),
            return_url: self.return_url.to_string(),
        };
        let transaction = self.pse.create_transaction(&request).await?;

        payment.provider_reference = Some(transaction.transaction_id.clone());
        payment.redirect_url = Some(transaction.bank_url);
        self.payments.create(&payment).await?;

        self.orders
            .set_payment_method(order.id(), PaymentMethod::Pse)
            .await?;

        tracing::info!(
            order_id = %order.id(),
            payment_id = %payment.id,
            transaction_id = %transaction.transaction_id,
            "PSE payment initiated"
        );

        self.apply_gateway_status(&mut payment, &transaction.status_code)
            .await?;
        Ok(payment)
    }

    /// Creates a local placeholder intent; nothing is charged
    pub async fn initiate_stripe(&self, user_id: Uuid, order_id: Uuid) -> DomainResult<Payment> {
        let order = self.payable_order(user_id, order_id).await?;
        let mut payment = Payment::pending(
            order.id(),
            PaymentMethod::Stripe,
            order.total(),
            order.currency(),
        )?;

        let intent = self.stripe.create_intent();
        payment.provider_reference = Some(intent.id);
        payment.redirect_url = Some(intent.client_secret);
        self.payments.create(&payment).await?;

        self.orders
            .set_payment_method(order.id(), PaymentMethod::Stripe)
            .await?;

        tracing::info!(order_id = %order.id(), payment_id = %payment.id, "Stripe stub payment created");
        Ok(payment)
    }

    /// Applies a signature-verified PSE notification
    pub async fn handle_pse_notification(&self, notification: &PseNotification) -> DomainResult<Payment> {
        let mut payment = self
            .payments
            .find_by_provider_reference(PaymentMethod::Pse, &notification.transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Payment", &notification.transaction_id))?;

        tracing::info!(
            transaction_id = %notification.transaction_id,
            reference = ?notification.reference,
            status = %notification.status,
            "PSE webhook received"
        );

        self.apply_gateway_status(&mut payment, &notification.status)
            .await?;
        Ok(payment)
    }

    /// Re-reads a PSE payment's status from the gateway
    pub async fn refresh(&self, user_id: Uuid, payment_id: Uuid) -> DomainResult<Payment> {
        let mut payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Payment", payment_id))?;
        match self.own_order(user_id, payment.order_id).await {
            Err(DomainError::NotFound { .. }) => {
                return Err(DomainError::not_found("Payment", payment_id))
            }
            other => other.map(|_| ())?,
        }

        if payment.method != PaymentMethod::Pse || payment.status.is_final() {
            return Ok(payment);
        }
        let Some(transaction_id) = payment.provider_reference.clone() else {
            return Ok(payment);
        };

        let code = self.pse.transaction_status(&transaction_id).await?;
        self.apply_gateway_status(&mut payment, &code).await?;
        Ok(payment)
    }

    pub async fn list_for_order(&self, user_id: Uuid, order_id: Uuid) -> DomainResult<Vec<Payment>> {
        self.own_order(user_id, order_id).await?;
        self.payments.list_for_order(order_id).await
    }

    /// Maps a gateway code onto the payment and settles the order when final
    ///
    /// Replays are no-ops for the payment but still reconcile an order left
    /// pending by an earlier partial failure.
    async fn apply_gateway_status(&self, payment: &mut Payment, code: &str) -> DomainResult<()> {
        let status = PseStatus::from_code(code);
        if let PseStatus::Unrecognized(raw) = &status {
            tracing::warn!(payment_id = %payment.id, code = %raw, "Unrecognized PSE status, keeping payment pending");
        }
        let raw = code.trim().to_ascii_uppercase();
        if payment.status.is_final() && !status.effective().is_final() {
            tracing::warn!(
                payment_id = %payment.id,
                status = %payment.status,
                code = %raw,
                "Ignoring non-final PSE status for a settled payment"
            );
        }

        match payment.apply_status(status.effective(), &raw)? {
            PaymentUpdate::Unchanged => {}
            PaymentUpdate::Recorded => self.payments.update(payment).await?,
            PaymentUpdate::Finalized(final_status) => {
                self.payments.update(payment).await?;
                tracing::info!(payment_id = %payment.id, status = %final_status, "Payment finalized");
            }
        }

        if payment.status.is_final() {
            self.settle_order(payment).await?;
        }
        Ok(())
    }

    async fn settle_order(&self, payment: &Payment) -> DomainResult<()> {
        let mut order = self
            .orders
            .find_by_id(payment.order_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", payment.order_id))?;

        if order.status() != OrderStatus::Pending {
            if payment.status == PaymentStatus::Approved && !order.status().is_paid() {
                tracing::warn!(
                    order_id = %order.id(),
                    status = %order.status(),
                    "Payment approved for an order that is no longer pending"
                );
            }
            return Ok(());
        }

        let next = match payment.status {
            PaymentStatus::Approved => OrderStatus::Paid,
            PaymentStatus::Rejected | PaymentStatus::Failed => OrderStatus::Cancelled,
            PaymentStatus::Pending => return Ok(()),
        };
        match change_order_status(self.orders, self.products, &mut order, next).await {
            Ok(_) => Ok(()),
            Err(DomainError::Conflict(message)) => {
                tracing::warn!(order_id = %order.id(), %message, "Order settled by another request");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn own_order(&self, user_id: Uuid, order_id: Uuid) -> DomainResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id() == user_id)
            .ok_or_else(|| DomainError::not_found("Order", order_id))
    }

    /// Own order that is `Pending` and has no live payment attempt
    async fn payable_order(&self, user_id: Uuid, order_id: Uuid) -> DomainResult<Order> {
        let order = self.own_order(user_id, order_id).await?;
        if order.status() != OrderStatus::Pending {
            return Err(DomainError::conflict(format!(
                "Order is not awaiting payment (status: {})",
                order.status()
            )));
        }

        let existing = self.payments.list_for_order(order_id).await?;
        if existing
            .iter()
            .any(|p| matches!(p.status, PaymentStatus::Pending | PaymentStatus::Approved))
        {
            return Err(DomainError::conflict("Order already has an active payment"));
        }
        Ok(order)
    }
}
