use crate::{
    AppState,
    auth::SESSION_COOKIE,
    models::{
        self, AdminStats, AdminUser, Banner, Category, CreateBannerRequest, CreateCategoryRequest,
        CreateProductRequest, PresignedUrlRequest, PresignedUrlResponse, Product, SetLocaleRequest,
        SignInRequest, UpdateBannerRequest, UpdateCategoryRequest, UpdateProductRequest,
    },
    repository::CreateError,
    slug::{derive_slug, slugify},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use uuid::Uuid;

/// Name of the cookie carrying the visitor's chosen catalog language.
pub const LOCALE_COOKIE: &str = "locale";

// --- Filter Structs ---

/// ProductFilter
///
/// Accepted query parameters for the storefront product listing
/// (GET /products). Bound safely by Axum's Query extractor.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProductFilter {
    /// Optional filter for products in a specific category.
    pub category: Option<Uuid>,
    /// Optional search string matched against name and description.
    pub search: Option<String>,
}

/// IdentityTokenResponse
///
/// Minimal struct to deserialize the external identity provider's password
/// sign-in response: the session token and the canonical user record.
#[derive(Deserialize)]
struct IdentityTokenResponse {
    access_token: String,
    user: IdentityUser,
}

#[derive(Deserialize)]
struct IdentityUser {
    id: Uuid,
    email: String,
}

// --- Public Catalog Handlers ---

/// get_products
///
/// [Public Route] Lists published products with category filtering and search.
///
/// *Security*: The repository applies `published=true` **unconditionally** so
/// drafts never leak to the storefront.
#[utoipa::path(
    get,
    path = "/products",
    params(ProductFilter),
    responses((status = 200, description = "List published products", body = [Product]))
)]
pub async fn get_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Json<Vec<models::Product>> {
    let products = state.repo.get_products(filter.category, filter.search).await;
    Json(products)
}

/// get_product_by_slug
///
/// [Public Route] Retrieves a single published product by its slug — the
/// identifier minted by the slug deriver at creation time.
#[utoipa::path(
    get,
    path = "/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses((status = 200, description = "Found", body = Product))
)]
pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<models::Product>, StatusCode> {
    match state.repo.get_product_by_slug(&slug).await {
        Some(product) => Ok(Json(product)),
        // Not found OR not published — indistinguishable on purpose.
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// get_categories
///
/// [Public Route] Lists all catalog categories.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn get_categories(State(state): State<AppState>) -> Json<Vec<models::Category>> {
    Json(state.repo.get_categories().await)
}

/// get_banners
///
/// [Public Route] Lists active storefront banners in display order.
#[utoipa::path(
    get,
    path = "/banners",
    responses((status = 200, description = "Active banners", body = [Banner]))
)]
pub async fn get_banners(State(state): State<AppState>) -> Json<Vec<models::Banner>> {
    Json(state.repo.get_active_banners().await)
}

// --- Session & Locale Handlers ---

/// sign_in_page
///
/// [Public Route] The guard's redirect target. The panel frontend renders the
/// actual form; the backend only needs the path to resolve.
#[utoipa::path(
    get,
    path = "/sign-in",
    responses((status = 200, description = "Sign-in entry point"))
)]
pub async fn sign_in_page() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "sign in required" }))
}

/// sign_in
///
/// [Public Route] Verifies credentials against the external identity provider,
/// mirrors the admin user locally, records the returned token in the session
/// store, and sets the session cookie.
///
/// *Flow*: password grant at the identity provider → access token + user id →
/// local `admin_users` upsert → session row → HttpOnly cookie.
#[utoipa::path(
    post,
    path = "/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AdminUser),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> Result<(CookieJar, Json<AdminUser>), StatusCode> {
    // Step 1: Delegate password verification to the identity provider.
    let client = reqwest::Client::new();
    let token_url = format!(
        "{}/auth/v1/token?grant_type=password",
        state.config.identity_url
    );

    let response = client
        .post(token_url)
        .header("apikey", &state.config.identity_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !response.status().is_success() {
        // Wrong password, unknown user — the provider does not say which.
        return Err(StatusCode::UNAUTHORIZED);
    }

    let identity = response
        .json::<IdentityTokenResponse>()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Step 2: Mirror the operator record locally.
    let user = state
        .repo
        .upsert_admin_user(AdminUser {
            id: identity.user.id,
            email: identity.user.email,
        })
        .await
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    // Step 3: Record the session and hand the token to the browser.
    state
        .sessions
        .create(user.id, &identity.access_token)
        .await
        .map_err(|e| {
            tracing::error!("session create failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let cookie = Cookie::build((SESSION_COOKIE, identity.access_token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(user)))
}

/// sign_out
///
/// [Public Route] Destroys the current session (if any) and clears the cookie.
/// Idempotent: signing out without a session still returns 204.
#[utoipa::path(
    post,
    path = "/sign-out",
    responses((status = 204, description = "Signed out"))
)]
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.sessions.destroy(cookie.value()).await {
            // The cookie is cleared regardless; the row can be reaped later.
            tracing::warn!("session destroy failed: {e}");
        }
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), StatusCode::NO_CONTENT)
}

/// set_locale
///
/// [Public Route] Stores the visitor's catalog language in a cookie. The
/// chosen locale travels with every request as explicit context — there is no
/// server-side locale state.
#[utoipa::path(
    post,
    path = "/locale",
    request_body = SetLocaleRequest,
    responses((status = 204, description = "Locale set"))
)]
pub async fn set_locale(
    jar: CookieJar,
    Json(payload): Json<SetLocaleRequest>,
) -> (CookieJar, StatusCode) {
    let cookie = Cookie::build((LOCALE_COOKIE, payload.locale.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), StatusCode::NO_CONTENT)
}

// --- Admin Handlers (behind the access guard) ---

/// get_admin_stats
///
/// [Admin Route] Dashboard counters for the panel landing page.
#[utoipa::path(
    get,
    path = "/admin-secret-xyz/stats",
    responses((status = 200, description = "Stats", body = AdminStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Json<AdminStats> {
    Json(state.repo.get_stats().await)
}

/// get_admin_products
///
/// [Admin Route] Lists ALL products, drafts included.
#[utoipa::path(
    get,
    path = "/admin-secret-xyz/products",
    responses((status = 200, description = "All products", body = [Product]))
)]
pub async fn get_admin_products(State(state): State<AppState>) -> Json<Vec<models::Product>> {
    Json(state.repo.get_all_products().await)
}

/// create_product
///
/// [Admin Route] Creates a product. The identifier is derived server-side
/// from the display name and locale (`derive_slug`), so `br`-catalog products
/// land in their own namespace.
///
/// *Validation*: a name that normalizes to nothing (all punctuation, all
/// diacritics) is a 400 — an empty identifier is never persisted. A duplicate
/// identifier surfaces from the unique constraint as a 409; the admin picks a
/// different name rather than the server silently minting a suffix.
#[utoipa::path(
    post,
    path = "/admin-secret-xyz/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Name yields an empty identifier"),
        (status = 409, description = "Identifier already exists")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<models::CreateProductRequest>,
) -> Result<(StatusCode, Json<models::Product>), StatusCode> {
    let slug = derive_slug(&payload.name, payload.locale);
    if slug.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.repo.create_product(payload, &slug).await {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(CreateError::Conflict) => Err(StatusCode::CONFLICT),
        Err(e) => {
            tracing::error!("create_product failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// update_product
///
/// [Admin Route] Partial update. Renaming does not regenerate the slug;
/// identifiers are fixed at creation time.
#[utoipa::path(
    put,
    path = "/admin-secret-xyz/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses((status = 200, description = "Updated", body = Product))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<models::Product>, StatusCode> {
    match state.repo.update_product(id, payload).await {
        Some(product) => Ok(Json(product)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_product
///
/// [Admin Route] Removes a product.
#[utoipa::path(
    delete,
    path = "/admin-secret-xyz/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.delete_product(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_admin_categories
///
/// [Admin Route] Lists categories for the panel.
#[utoipa::path(
    get,
    path = "/admin-secret-xyz/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn get_admin_categories(State(state): State<AppState>) -> Json<Vec<models::Category>> {
    Json(state.repo.get_categories().await)
}

/// create_category
///
/// [Admin Route] Creates a category. Category identifiers use the plain
/// `slugify` variant — no locale prefix, because categories span both
/// language catalogs.
#[utoipa::path(
    post,
    path = "/admin-secret-xyz/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 400, description = "Name yields an empty identifier"),
        (status = 409, description = "Identifier already exists")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<models::Category>), StatusCode> {
    let slug = slugify(&payload.name);
    if slug.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.repo.create_category(&payload.name, &slug).await {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(CreateError::Conflict) => Err(StatusCode::CONFLICT),
        Err(e) => {
            tracing::error!("create_category failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// update_category
///
/// [Admin Route] Renames a category. The slug is untouched.
#[utoipa::path(
    put,
    path = "/admin-secret-xyz/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses((status = 200, description = "Updated", body = Category))
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<models::Category>, StatusCode> {
    match state.repo.update_category(id, payload).await {
        Some(category) => Ok(Json(category)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_category
///
/// [Admin Route] Removes a category.
#[utoipa::path(
    delete,
    path = "/admin-secret-xyz/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_category(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.delete_category(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_admin_banners
///
/// [Admin Route] Lists all banners, inactive included.
#[utoipa::path(
    get,
    path = "/admin-secret-xyz/banners",
    responses((status = 200, description = "All banners", body = [Banner]))
)]
pub async fn get_admin_banners(State(state): State<AppState>) -> Json<Vec<models::Banner>> {
    Json(state.repo.get_all_banners().await)
}

/// create_banner
///
/// [Admin Route] Creates a banner. Banners carry no slug.
#[utoipa::path(
    post,
    path = "/admin-secret-xyz/banners",
    request_body = CreateBannerRequest,
    responses((status = 201, description = "Created", body = Banner))
)]
pub async fn create_banner(
    State(state): State<AppState>,
    Json(payload): Json<CreateBannerRequest>,
) -> Result<(StatusCode, Json<models::Banner>), StatusCode> {
    match state.repo.create_banner(payload).await {
        Ok(banner) => Ok((StatusCode::CREATED, Json(banner))),
        Err(e) => {
            tracing::error!("create_banner failed: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// update_banner
///
/// [Admin Route] Partial update, including the active toggle.
#[utoipa::path(
    put,
    path = "/admin-secret-xyz/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner ID")),
    request_body = UpdateBannerRequest,
    responses((status = 200, description = "Updated", body = Banner))
)]
pub async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBannerRequest>,
) -> Result<Json<models::Banner>, StatusCode> {
    match state.repo.update_banner(id, payload).await {
        Some(banner) => Ok(Json(banner)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// delete_banner
///
/// [Admin Route] Removes a banner.
#[utoipa::path(
    delete,
    path = "/admin-secret-xyz/banners/{id}",
    params(("id" = Uuid, Path, description = "Banner ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_banner(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    if state.repo.delete_banner(id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// get_presigned_url
///
/// [Admin Route] Generates a temporary, secure URL for direct client-to-storage
/// image upload.
///
/// *Security*: the URL is short-lived, constrained to the declared image MIME
/// type, and uses a unique object key under the `products/` namespace.
#[utoipa::path(
    post,
    path = "/admin-secret-xyz/uploads/presigned",
    request_body = PresignedUrlRequest,
    responses((status = 200, description = "URL", body = PresignedUrlResponse))
)]
pub async fn get_presigned_url(
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> impl IntoResponse {
    // Unique, structured object key (e.g., 'products/UUID.ext').
    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let unique_id = Uuid::new_v4();
    let object_key = format!("products/{}.{}", unique_id, extension);

    match state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
    {
        Ok(url) => {
            let response = PresignedUrlResponse {
                upload_url: url,
                resource_key: object_key,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            // Log the underlying storage error but return a generic failure.
            tracing::error!("storage error: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed").into_response()
        }
    }
}
