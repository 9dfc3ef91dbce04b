use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::UserResponse;
use super::catalog::AdminProductView;
use super::orders::OrderResponse;
use crate::api::errors::ApiError;
use crate::api::middleware::AdminUser;
use crate::api::state::AppState;
use crate::application::change_order_status;
use crate::domain::catalog::{Category, LocalizedText, Product, ProductDraft};
use crate::domain::order::OrderStatus;
use crate::domain::user::UserRole;

// ===== Dashboard =====

#[derive(Debug, Serialize)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub available: i32,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub paid_revenue: Decimal,
    pub total_products: u64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub total_customers: u64,
}

/// GET /api/admin/stats
pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<DashboardStats>, ApiError> {
    let orders = state.orders.stats().await?;
    let low_stock = state
        .products
        .low_stock(state.config.low_stock_threshold)
        .await?;

    Ok(Json(DashboardStats {
        total_orders: orders.total_orders,
        pending_orders: orders.pending_orders,
        paid_revenue: orders.paid_revenue,
        total_products: state.products.count().await?,
        low_stock_products: low_stock
            .iter()
            .map(|p| LowStockProduct {
                id: p.id(),
                sku: p.sku().to_string(),
                name: p.name().es.clone(),
                available: p.available(),
            })
            .collect(),
        total_customers: state.users.count_by_role(UserRole::Customer).await?,
    }))
}

// ===== Orders =====

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.list(query.status).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// PATCH /api/admin/orders/:id/status
pub async fn update_order_status(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let mut order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {}", id)))?;

    change_order_status(
        state.orders.as_ref(),
        state.products.as_ref(),
        &mut order,
        req.status,
    )
    .await?;
    tracing::info!(order_id = %id, admin_id = %admin.id, status = %req.status, "Order status updated by admin");
    Ok(Json(OrderResponse::from(&order)))
}

// ===== Users =====

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// PATCH /api/admin/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if id == admin.id
        && (req.role == Some(UserRole::Customer) || req.is_active == Some(false))
    {
        return Err(ApiError::conflict(
            "Administrators cannot demote or deactivate themselves",
        ));
    }

    let mut user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User not found: {}", id)))?;
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(is_active) = req.is_active {
        user.is_active = is_active;
    }

    state.users.update(&user).await?;
    tracing::info!(user_id = %id, admin_id = %admin.id, role = %user.role, is_active = user.is_active, "User updated by admin");
    Ok(Json(UserResponse::from(&user)))
}

// ===== Categories =====

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name_es: String,
    pub name_en: Option<String>,
    pub description_es: Option<String>,
    pub description_en: Option<String>,
    pub slug: Option<String>,
}

impl CategoryRequest {
    fn into_parts(self) -> (LocalizedText, Option<LocalizedText>, Option<String>) {
        let name = LocalizedText::new(self.name_es, self.name_en);
        let description = match (self.description_es, self.description_en) {
            (None, None) => None,
            (es, en) => Some(LocalizedText::new(es.unwrap_or_default(), en)),
        };
        let slug = self.slug.filter(|s| !s.trim().is_empty());
        (name, description, slug)
    }
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let (name, description, slug) = req.into_parts();
    let category = Category::new(name, description, slug.as_deref())?;
    state.categories.create(&category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/admin/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let mut category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {}", id)))?;
    let (name, description, slug) = req.into_parts();
    category.update(name, description, slug.as_deref())?;
    state.categories.update(&category).await?;
    Ok(Json(category))
}

/// DELETE /api/admin/categories/:id
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let in_use = state.products.count_in_category(id).await?;
    if in_use > 0 {
        return Err(ApiError::conflict(format!(
            "Category still has {} products",
            in_use
        )));
    }
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Products =====

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub sku: String,
    pub slug: Option<String>,
    pub name_es: String,
    pub name_en: Option<String>,
    #[serde(default)]
    pub description_es: String,
    pub description_en: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    /// Initial stock; ignored on update
    #[serde(default)]
    pub stock: i32,
}

fn default_true() -> bool {
    true
}

impl ProductRequest {
    fn into_draft(self) -> ProductDraft {
        ProductDraft {
            sku: self.sku,
            slug: self.slug.filter(|s| !s.trim().is_empty()),
            name: LocalizedText::new(self.name_es, self.name_en),
            description: LocalizedText::new(self.description_es, self.description_en),
            price: self.price,
            compare_at_price: self.compare_at_price,
            category_id: self.category_id,
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            is_active: self.is_active,
            is_featured: self.is_featured,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub stock: i32,
}

async fn ensure_category(state: &AppState, category_id: Option<Uuid>) -> Result<(), ApiError> {
    if let Some(id) = category_id {
        if state.categories.find_by_id(id).await?.is_none() {
            return Err(ApiError::not_found(format!("Category not found: {}", id)));
        }
    }
    Ok(())
}

/// POST /api/admin/products
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<AdminProductView>), ApiError> {
    ensure_category(&state, req.category_id).await?;
    let stock = req.stock;
    let product = Product::new(req.into_draft(), stock)?;
    state.products.create(&product).await?;
    tracing::info!(product_id = %product.id(), sku = product.sku(), "Product created");
    Ok((StatusCode::CREATED, Json(AdminProductView::from(&product))))
}

/// PUT /api/admin/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<AdminProductView>, ApiError> {
    ensure_category(&state, req.category_id).await?;
    let mut product = state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))?;
    product.update(req.into_draft())?;
    state.products.update(&product).await?;
    Ok(Json(AdminProductView::from(&product)))
}

/// DELETE /api/admin/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.products.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set absolute stock; must stay at or above the reserved units
///
/// PATCH /api/admin/products/:id/stock
pub async fn adjust_stock(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StockRequest>,
) -> Result<Json<AdminProductView>, ApiError> {
    let product = state.products.set_stock(id, req.stock).await?;
    tracing::info!(product_id = %id, admin_id = %admin.id, stock = req.stock, "Stock adjusted");
    Ok(Json(AdminProductView::from(&product)))
}
