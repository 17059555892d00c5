use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod slug;
pub mod storage;

// Module for routing segregation (Public, Admin).
pub mod routes;
use routes::{admin, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use auth::{MockSessionStore, PostgresSessionStore, SessionState};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the panel API.
/// Aggregates all paths and schemas decorated with `#[utoipa::path]` and
/// `#[derive(utoipa::ToSchema)]`. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_products, handlers::get_product_by_slug, handlers::get_categories,
        handlers::get_banners, handlers::sign_in_page, handlers::sign_in, handlers::sign_out,
        handlers::set_locale, handlers::get_admin_stats, handlers::get_admin_products,
        handlers::create_product, handlers::update_product, handlers::delete_product,
        handlers::get_admin_categories, handlers::create_category, handlers::update_category,
        handlers::delete_category, handlers::get_admin_banners, handlers::create_banner,
        handlers::update_banner, handlers::delete_banner, handlers::get_presigned_url,
    ),
    components(
        schemas(
            models::Product, models::Category, models::Banner, models::AdminUser,
            models::CreateProductRequest, models::UpdateProductRequest,
            models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::CreateBannerRequest, models::UpdateBannerRequest,
            models::SignInRequest, models::SetLocaleRequest,
            models::PresignedUrlRequest, models::PresignedUrlResponse, models::AdminStats,
            slug::Locale,
        )
    ),
    tags(
        (name = "storefront-admin", description = "Storefront Admin Panel API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all essential
/// application services and configuration, shared across incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Session layer: resolves, creates, and destroys admin sessions.
    pub sessions: SessionState,
    /// Storage layer: abstracts S3/MinIO access and presigned URL generation.
    pub storage: StorageState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow handlers and middleware to selectively pull components from AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies the access
/// guard plus global middleware, and registers the application state.
///
/// The guard layer wraps the whole router rather than only the admin subtree:
/// its first move is a path-prefix check, so unprotected paths pass through
/// without a session lookup, and the prefix match itself stays the guard's
/// own unit-testable decision instead of an artifact of route nesting.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: storefront reads, session entry/exit, locale.
        .merge(public::public_routes())
        // Admin routes: nested under the configured protected prefix.
        .nest(&state.config.admin_prefix, admin::admin_routes())
        // The access guard. Redirects unauthenticated traffic under the
        // protected prefix to the sign-in path; everything else passes.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::admin_guard,
        ))
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in
                // a span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer (applied last).
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: extracts the
/// `x-request-id` header (if present) and includes it alongside the HTTP
/// method and URI so every log line for a request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
