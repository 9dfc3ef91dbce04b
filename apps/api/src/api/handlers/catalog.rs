use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::{AuthUser, RequestLocale};
use crate::api::state::AppState;
use crate::domain::catalog::{Category, Locale, LocalizedText, Page, Product, ProductFilter, Slug};

/// Category in the caller's language
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
}

impl CategoryView {
    pub fn localized(category: &Category, locale: Locale) -> Self {
        Self {
            id: category.id,
            slug: category.slug.as_str().to_string(),
            name: category.name.get(locale).to_string(),
            description: category.description.as_ref().map(|d| d.get(locale).to_string()),
        }
    }
}

/// Product in the caller's language
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub sku: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub available: i32,
    pub in_stock: bool,
    pub is_active: bool,
    pub is_featured: bool,
}

impl ProductView {
    pub fn localized(product: &Product, locale: Locale) -> Self {
        Self {
            id: product.id(),
            sku: product.sku().to_string(),
            slug: product.slug().as_str().to_string(),
            name: product.name().get(locale).to_string(),
            description: product.description().get(locale).to_string(),
            price: product.price(),
            compare_at_price: product.compare_at_price(),
            category_id: product.category_id(),
            image_url: product.image_url().map(str::to_string),
            available: product.available(),
            in_stock: product.available() > 0,
            is_active: product.is_active(),
            is_featured: product.is_featured(),
        }
    }
}

/// Product with both languages and inventory counters
#[derive(Debug, Serialize)]
pub struct AdminProductView {
    pub id: Uuid,
    pub sku: String,
    pub slug: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub stock: i32,
    pub reserved: i32,
    pub available: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for AdminProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id(),
            sku: product.sku().to_string(),
            slug: product.slug().as_str().to_string(),
            name: product.name().clone(),
            description: product.description().clone(),
            price: product.price(),
            compare_at_price: product.compare_at_price(),
            category_id: product.category_id(),
            image_url: product.image_url().map(str::to_string),
            stock: product.stock(),
            reserved: product.reserved(),
            available: product.available(),
            is_active: product.is_active(),
            is_featured: product.is_featured(),
            created_at: product.created_at(),
            updated_at: product.updated_at(),
        }
    }
}

/// Query string of `GET /api/products`
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub featured: Option<bool>,
    pub include_inactive: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn is_admin(auth: &Option<AuthUser>) -> bool {
    auth.map_or(false, |a| a.role.is_admin())
}

fn parse_slug(raw: &str) -> Result<Slug, ApiError> {
    Slug::parse(raw).map_err(|e| ApiError::bad_request(format!("Invalid slug: {}", e)))
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Result<Json<Vec<CategoryView>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(
        categories
            .iter()
            .map(|c| CategoryView::localized(c, locale))
            .collect(),
    ))
}

/// GET /api/categories/:slug
pub async fn get_category(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(slug): Path<String>,
) -> Result<Json<CategoryView>, ApiError> {
    let slug = parse_slug(&slug)?;
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {}", slug)))?;
    Ok(Json(CategoryView::localized(&category, locale)))
}

/// List products with filters and paging
///
/// GET /api/products
///
/// `include_inactive` is honoured for admins only.
pub async fn list_products(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: Option<AuthUser>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Page<ProductView>>, ApiError> {
    let filter = ProductFilter {
        category_slug: query.category,
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
        featured: query.featured,
        include_inactive: query.include_inactive.unwrap_or(false) && is_admin(&auth),
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(0),
    }
    .normalized();

    let category_id = match filter.category_slug.as_deref() {
        Some(raw) => {
            let found = match Slug::parse(raw) {
                Ok(slug) => state.categories.find_by_slug(&slug).await?,
                Err(_) => None,
            };
            match found {
                Some(category) => Some(category.id),
                // Unknown category: nothing can match
                None => {
                    return Ok(Json(Page {
                        items: Vec::new(),
                        total: 0,
                        page: filter.page,
                        per_page: filter.per_page,
                    }))
                }
            }
        }
        None => None,
    };

    let page = state.products.list(&filter, category_id).await?;
    Ok(Json(page.map(|p| ProductView::localized(&p, locale))))
}

fn visible(product: Option<Product>, auth: &Option<AuthUser>) -> Option<Product> {
    product.filter(|p| p.is_active() || is_admin(auth))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductView>, ApiError> {
    let product = visible(state.products.find_by_id(id).await?, &auth)
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))?;
    Ok(Json(ProductView::localized(&product, locale)))
}

/// GET /api/products/slug/:slug
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    auth: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let slug = parse_slug(&slug)?;
    let product = visible(state.products.find_by_slug(&slug).await?, &auth)
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", slug)))?;
    Ok(Json(ProductView::localized(&product, locale)))
}
