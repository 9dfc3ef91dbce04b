use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::application::orders::cancel_own_order;
use crate::application::CreateOrderInput;
use crate::domain::order::{Order, OrderItem, OrderStatus, ShippingAddress, Totals};
use crate::domain::payment::PaymentMethod;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub address_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub totals: Totals,
    pub currency: String,
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            reference: order.reference().to_string(),
            user_id: order.user_id(),
            status: order.status(),
            items: order.items().to_vec(),
            totals: order.totals(),
            currency: order.currency().to_string(),
            shipping_address: order.shipping_address().clone(),
            payment_method: order.payment_method(),
            notes: order.notes().map(str::to_string),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

/// Place an order from the current cart
///
/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let order = state
        .create_order()
        .execute(
            auth.id,
            CreateOrderInput {
                address_id: req.address_id,
                notes: req.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list_for_user(auth.id).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .filter(|o| o.user_id() == auth.id)
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {}", id)))?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /api/orders/:id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = cancel_own_order(state.orders.as_ref(), state.products.as_ref(), auth.id, id).await?;
    Ok(Json(OrderResponse::from(&order)))
}
