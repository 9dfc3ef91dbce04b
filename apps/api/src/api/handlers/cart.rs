use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::{AuthUser, RequestLocale};
use crate::api::state::AppState;
use crate::domain::cart::Cart;
use crate::domain::catalog::{Locale, Product};
use crate::domain::errors::DomainError;
use crate::domain::order::{compute_totals, Totals};

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartProduct {
    pub id: Uuid,
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product: CartProduct,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub available: i32,
}

/// Cart priced against the current catalog
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub totals: Totals,
    pub currency: String,
}

async fn render(state: &AppState, cart: &Cart, locale: Locale) -> Result<CartView, ApiError> {
    let ids: Vec<Uuid> = cart.items().iter().map(|i| i.product_id).collect();
    let products: HashMap<Uuid, Product> = state
        .products
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id(), p))
        .collect();

    // Lines for deleted products are dropped
    let items: Vec<CartLineView> = cart
        .items()
        .iter()
        .filter_map(|line| {
            let product = products.get(&line.product_id)?;
            Some(CartLineView {
                product: CartProduct {
                    id: product.id(),
                    sku: product.sku().to_string(),
                    slug: product.slug().as_str().to_string(),
                    name: product.name().get(locale).to_string(),
                    image_url: product.image_url().map(str::to_string),
                    is_active: product.is_active(),
                },
                quantity: line.quantity,
                unit_price: product.price(),
                line_total: product.price() * Decimal::from(line.quantity),
                available: product.available(),
            })
        })
        .collect();

    let totals = compute_totals(
        items.iter().map(|i| (i.unit_price, i.quantity)),
        &state.config.pricing,
    );

    Ok(CartView {
        items,
        totals,
        currency: state.config.pricing.currency.clone(),
    })
}

/// Active product with at least `wanted` units available
async fn sellable(state: &AppState, product_id: Uuid, wanted: i32) -> Result<Product, ApiError> {
    let product = state
        .products
        .find_by_id(product_id)
        .await?
        .filter(|p| p.is_active())
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", product_id)))?;

    if product.available() < wanted {
        return Err(DomainError::InsufficientStock {
            sku: product.sku().to_string(),
            requested: wanted,
            available: product.available(),
        }
        .into());
    }
    Ok(product)
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: AuthUser,
) -> Result<Json<CartView>, ApiError> {
    let cart = state.carts.get(auth.id).await?;
    Ok(Json(render(&state, &cart, locale).await?))
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: AuthUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let mut cart = state.carts.get(auth.id).await?;
    // Quantity rules are checked on the local copy before stock is consulted
    let wanted = cart.add_item(req.product_id, req.quantity)?;
    sellable(&state, req.product_id, wanted).await?;

    state.carts.save(&cart).await?;
    Ok(Json(render(&state, &cart, locale).await?))
}

/// PATCH /api/cart/items/:product_id
pub async fn update_item(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let mut cart = state.carts.get(auth.id).await?;
    cart.update_quantity(product_id, req.quantity)?;
    if req.quantity > 0 {
        sellable(&state, product_id, req.quantity).await?;
    }

    state.carts.save(&cart).await?;
    Ok(Json(render(&state, &cart, locale).await?))
}

/// DELETE /api/cart/items/:product_id
pub async fn remove_item(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CartView>, ApiError> {
    let mut cart = state.carts.get(auth.id).await?;
    cart.remove_item(product_id)?;
    state.carts.save(&cart).await?;
    Ok(Json(render(&state, &cart, locale).await?))
}

/// DELETE /api/cart
pub async fn clear_cart(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode, ApiError> {
    let mut cart = state.carts.get(auth.id).await?;
    cart.clear();
    state.carts.save(&cart).await?;
    Ok(StatusCode::NO_CONTENT)
}
