use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::application::PseNotification;
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus, PseBank, PsePayer};
use crate::infrastructure::payments::signature::{self, SIGNATURE_HEADER};

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub currency: String,
    pub provider_reference: Option<String>,
    /// Bank page for PSE transfers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Client secret of a Stripe intent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub raw_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        let (redirect_url, client_secret) = match payment.method {
            PaymentMethod::Pse => (payment.redirect_url.clone(), None),
            PaymentMethod::Stripe => (None, payment.redirect_url.clone()),
        };
        Self {
            id: payment.id,
            order_id: payment.order_id,
            method: payment.method,
            status: payment.status,
            amount: payment.amount,
            currency: payment.currency.clone(),
            provider_reference: payment.provider_reference.clone(),
            redirect_url,
            client_secret,
            raw_status: payment.raw_status.clone(),
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

/// GET /api/payments/pse/banks
pub async fn list_banks(State(state): State<AppState>) -> Result<Json<Vec<PseBank>>, ApiError> {
    Ok(Json(state.payment_service().list_banks().await?))
}

/// Start a PSE transfer; the response carries the bank redirect URL
///
/// POST /api/orders/:id/payments/pse
pub async fn initiate_pse(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(payer): Json<PsePayer>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let buyer = state
        .users
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account not found"))?;
    let payment = state
        .payment_service()
        .initiate_pse(&buyer, order_id, payer)
        .await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(&payment))))
}

/// POST /api/orders/:id/payments/stripe
pub async fn initiate_stripe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let payment = state
        .payment_service()
        .initiate_stripe(auth.id, order_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(&payment))))
}

/// Gateway notification; authenticated by `X-PSE-Signature` over the raw body
///
/// POST /api/payments/pse/webhook
pub async fn pse_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PaymentResponse>, ApiError> {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing webhook signature"))?;

    if !signature::verify(&state.config.pse.webhook_secret, &body, provided) {
        tracing::warn!("Rejected PSE webhook with invalid signature");
        return Err(ApiError::unauthorized("Invalid webhook signature"));
    }

    let notification: PseNotification = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid webhook payload: {}", e)))?;

    let payment = state
        .payment_service()
        .handle_pse_notification(&notification)
        .await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// POST /api/payments/:id/refresh
pub async fn refresh_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let payment = state.payment_service().refresh(auth.id, id).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// GET /api/orders/:id/payments
pub async fn list_order_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state
        .payment_service()
        .list_for_order(auth.id, order_id)
        .await?;
    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}
