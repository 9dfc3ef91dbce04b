use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{addresses, admin, auth, cart, catalog, orders, payments};
use super::state::AppState;

/// Builds the full HTTP router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(auth::health_check))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me).patch(auth::update_me))
        .route(
            "/api/addresses",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route("/api/addresses/:id", delete(addresses::delete_address))
        // Catalog
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/categories/:slug", get(catalog::get_category))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/:id", get(catalog::get_product))
        .route("/api/products/slug/:slug", get(catalog::get_product_by_slug))
        // Cart
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/:product_id",
            patch(cart::update_item).delete(cart::remove_item),
        )
        // Orders
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/orders/:id/cancel", post(orders::cancel_order))
        .route("/api/orders/:id/payments", get(payments::list_order_payments))
        // Payments
        .route("/api/orders/:id/payments/pse", post(payments::initiate_pse))
        .route("/api/orders/:id/payments/stripe", post(payments::initiate_stripe))
        .route("/api/payments/pse/banks", get(payments::list_banks))
        .route("/api/payments/pse/webhook", post(payments::pse_webhook))
        .route("/api/payments/:id/refresh", post(payments::refresh_payment))
        // Admin
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/orders", get(admin::list_orders))
        .route("/api/admin/orders/:id/status", patch(admin::update_order_status))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:id", patch(admin::update_user))
        .route("/api/admin/categories", post(admin::create_category))
        .route(
            "/api/admin/categories/:id",
            put(admin::update_category).delete(admin::delete_category),
        )
        .route("/api/admin/products", post(admin::create_product))
        .route(
            "/api/admin/products/:id",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/api/admin/products/:id/stock", patch(admin::adjust_stock))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
