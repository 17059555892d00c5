use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated** and accessible to any client. These
/// cover storefront reads, the session entry/exit points, and the locale
/// switcher. The access guard ignores everything here: paths outside the
/// protected prefix bypass the session check entirely.
///
/// Security Mandate:
/// All catalog retrieval handlers in this module must enforce visibility
/// (`published = true` for products, `active = true` for banners) at the
/// repository level, so drafts never leak to anonymous clients.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /sign-in  — the guard's redirect target.
        // POST /sign-in — credential verification via the identity provider;
        // on success the session cookie is set.
        .route(
            "/sign-in",
            get(handlers::sign_in_page).post(handlers::sign_in),
        )
        // POST /sign-out
        // Destroys the current session and clears the cookie. Idempotent.
        .route("/sign-out", post(handlers::sign_out))
        // POST /locale
        // Persists the visitor's catalog language choice in a cookie.
        .route("/locale", post(handlers::set_locale))
        // GET /products?category=...&search=...
        // Lists published products with filtering and search.
        .route("/products", get(handlers::get_products))
        // GET /products/{slug}
        // Detailed view of a single published product, addressed by the
        // identifier the slug deriver minted at creation time.
        .route("/products/{slug}", get(handlers::get_product_by_slug))
        // GET /categories
        .route("/categories", get(handlers::get_categories))
        // GET /banners — active banners only, in display order.
        .route("/banners", get(handlers::get_banners))
}
