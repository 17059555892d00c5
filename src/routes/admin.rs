use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// CRUD endpoints for the panel, nested under the configured protected prefix
/// (default `/admin-secret-xyz`). Requests only reach these handlers after the
/// access guard has resolved a valid session; unauthenticated traffic is
/// redirected to the sign-in path before routing gets here.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET {prefix}/stats
        // Dashboard counters (products, categories, banners, drafts).
        .route("/stats", get(handlers::get_admin_stats))
        // --- Products ---
        // GET lists everything including drafts; POST derives the
        // locale-prefixed slug and creates the product.
        .route(
            "/products",
            get(handlers::get_admin_products).post(handlers::create_product),
        )
        // PUT/DELETE {prefix}/products/{id}
        // Partial update (slug immutable) and removal.
        .route(
            "/products/{id}",
            axum::routing::put(handlers::update_product).delete(handlers::delete_product),
        )
        // --- Categories ---
        // POST derives the unprefixed slug (categories span both locales).
        .route(
            "/categories",
            get(handlers::get_admin_categories).post(handlers::create_category),
        )
        .route(
            "/categories/{id}",
            axum::routing::put(handlers::update_category).delete(handlers::delete_category),
        )
        // --- Banners ---
        .route(
            "/banners",
            get(handlers::get_admin_banners).post(handlers::create_banner),
        )
        .route(
            "/banners/{id}",
            axum::routing::put(handlers::update_banner).delete(handlers::delete_banner),
        )
        // POST {prefix}/uploads/presigned
        // Short-lived, content-type-pinned upload URL for product imagery.
        .route("/uploads/presigned", post(handlers::get_presigned_url))
}
