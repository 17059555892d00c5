use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;
use storefront_admin::{
    AppConfig, AppState, MockSessionStore, MockStorageService, create_router,
    auth::SessionState,
    models::{
        AdminStats, AdminUser, Banner, Category, CreateBannerRequest, CreateProductRequest,
        PresignedUrlRequest, PresignedUrlResponse, Product, UpdateBannerRequest,
        UpdateCategoryRequest, UpdateProductRequest,
    },
    repository::{CreateError, Repository, RepositoryState},
    storage::StorageState,
};
use tower::util::ServiceExt;
use uuid::Uuid;

/// Repository stub that echoes created resources back and simulates a unique
/// violation for one configured slug, so the 409 mapping is testable without
/// a database.
#[derive(Default)]
struct StubRepository {
    conflict_slug: Option<String>,
}

#[async_trait]
impl Repository for StubRepository {
    async fn get_products(&self, _c: Option<Uuid>, _s: Option<String>) -> Vec<Product> {
        vec![]
    }
    async fn get_all_products(&self) -> Vec<Product> {
        vec![]
    }
    async fn get_product_by_slug(&self, slug: &str) -> Option<Product> {
        (slug == "espresso").then(|| Product {
            slug: slug.to_string(),
            name: "Espresso".to_string(),
            published: true,
            ..Product::default()
        })
    }
    async fn get_product(&self, _id: Uuid) -> Option<Product> {
        None
    }
    async fn create_product(
        &self,
        req: CreateProductRequest,
        slug: &str,
    ) -> Result<Product, CreateError> {
        if self.conflict_slug.as_deref() == Some(slug) {
            return Err(CreateError::Conflict);
        }
        Ok(Product {
            id: Uuid::new_v4(),
            name: req.name,
            slug: slug.to_string(),
            description: req.description,
            price_cents: req.price_cents,
            locale: req.locale.as_str().to_string(),
            ..Product::default()
        })
    }
    async fn update_product(&self, _id: Uuid, _req: UpdateProductRequest) -> Option<Product> {
        None
    }
    async fn delete_product(&self, _id: Uuid) -> bool {
        false
    }
    async fn get_categories(&self) -> Vec<Category> {
        vec![]
    }
    async fn get_category_by_slug(&self, _slug: &str) -> Option<Category> {
        None
    }
    async fn create_category(&self, name: &str, slug: &str) -> Result<Category, CreateError> {
        if self.conflict_slug.as_deref() == Some(slug) {
            return Err(CreateError::Conflict);
        }
        Ok(Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            ..Category::default()
        })
    }
    async fn update_category(&self, _id: Uuid, _req: UpdateCategoryRequest) -> Option<Category> {
        None
    }
    async fn delete_category(&self, _id: Uuid) -> bool {
        false
    }
    async fn get_active_banners(&self) -> Vec<Banner> {
        vec![]
    }
    async fn get_all_banners(&self) -> Vec<Banner> {
        vec![]
    }
    async fn create_banner(&self, req: CreateBannerRequest) -> Result<Banner, CreateError> {
        Ok(Banner {
            id: Uuid::new_v4(),
            title: req.title,
            image: req.image_key,
            link: req.link,
            position: req.position,
            ..Banner::default()
        })
    }
    async fn update_banner(&self, _id: Uuid, _req: UpdateBannerRequest) -> Option<Banner> {
        None
    }
    async fn delete_banner(&self, _id: Uuid) -> bool {
        false
    }
    async fn get_admin_user(&self, _id: Uuid) -> Option<AdminUser> {
        None
    }
    async fn upsert_admin_user(&self, user: AdminUser) -> Option<AdminUser> {
        Some(user)
    }
    async fn get_stats(&self) -> AdminStats {
        AdminStats {
            total_products: 3,
            total_categories: 1,
            total_banners: 2,
            unpublished_products: 1,
        }
    }
}

const VALID_TOKEN: &str = "valid-session-token";

fn app_with(repo: StubRepository, storage: MockStorageService) -> axum::Router {
    let state = AppState {
        repo: Arc::new(repo) as RepositoryState,
        sessions: Arc::new(MockSessionStore::with_token(VALID_TOKEN)) as SessionState,
        storage: Arc::new(storage) as StorageState,
        config: AppConfig::default(),
    };
    create_router(state)
}

fn app() -> axum::Router {
    app_with(StubRepository::default(), MockStorageService::new())
}

fn admin_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header(header::COOKIE, format!("session={VALID_TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- Slug wiring ---

#[tokio::test]
async fn test_create_category_derives_unprefixed_slug() {
    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/categories",
            serde_json::json!({ "name": "Café com Leite" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let category: Category = body_json(response).await;
    // Categories use the plain variant: no locale prefix, ever.
    assert_eq!(category.slug, "cafe-com-leite");
    assert_eq!(category.name, "Café com Leite");
}

#[tokio::test]
async fn test_create_product_secondary_locale_prefixes_slug() {
    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/products",
            serde_json::json!({
                "name": "Café com Leite",
                "description": "Milky coffee",
                "price_cents": 950,
                "locale": "br"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let product: Product = body_json(response).await;
    assert_eq!(product.slug, "br-cafe-com-leite");
    assert_eq!(product.locale, "br");
}

#[tokio::test]
async fn test_create_product_defaults_to_primary_locale() {
    // Omitted locale falls back to the primary catalog: bare slug.
    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/products",
            serde_json::json!({
                "name": "Espresso Machine",
                "description": "9 bar",
                "price_cents": 129900
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let product: Product = body_json(response).await;
    assert_eq!(product.slug, "espresso-machine");
    assert_eq!(product.locale, "en");
}

#[tokio::test]
async fn test_create_with_degenerate_name_is_rejected() {
    // "!!!" normalizes to an empty identifier; nothing gets persisted.
    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/categories",
            serde_json::json!({ "name": "!!!" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/products",
            serde_json::json!({
                "name": "???",
                "description": "",
                "price_cents": 0
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_slug_maps_to_conflict() {
    let repo = StubRepository {
        conflict_slug: Some("cafe-com-leite".to_string()),
    };
    let response = app_with(repo, MockStorageService::new())
        .oneshot(admin_post(
            "/admin-secret-xyz/categories",
            serde_json::json!({ "name": "Café com Leite" }),
        ))
        .await
        .unwrap();

    // The unique-violation surfaces as 409, not a generic failure.
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// --- Public catalog ---

#[tokio::test]
async fn test_public_product_detail_by_slug() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/products/espresso")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let product: Product = body_json(response).await;
    assert_eq!(product.slug, "espresso");
}

#[tokio::test]
async fn test_public_product_detail_unknown_slug_is_404() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/products/never-created")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- Locale switching ---

#[tokio::test]
async fn test_set_locale_writes_cookie() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/locale")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"locale":"br"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("locale cookie must be set")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("locale=br"));
}

// --- Session exit ---

#[tokio::test]
async fn test_sign_out_is_idempotent_and_clears_cookie() {
    // No session at all: still 204, cookie removal still issued.
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/sign-out")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// --- Admin dashboard ---

#[tokio::test]
async fn test_admin_stats_round_trip() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/admin-secret-xyz/stats")
                .header(header::COOKIE, format!("session={VALID_TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stats: AdminStats = body_json(response).await;
    assert_eq!(stats.total_products, 3);
    assert_eq!(stats.unpublished_products, 1);
}

// --- Upload pipeline ---

#[tokio::test]
async fn test_presigned_url_success() {
    let payload = PresignedUrlRequest {
        filename: "espresso.jpg".to_string(),
        file_type: "image/jpeg".to_string(),
    };

    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/uploads/presigned",
            serde_json::to_value(&payload).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: PresignedUrlResponse = body_json(response).await;
    assert!(body.upload_url.contains("signature=fake"));
    assert!(body.resource_key.starts_with("products/"));
    assert!(body.resource_key.ends_with(".jpg"));
}

#[tokio::test]
async fn test_presigned_url_sanitization() {
    let payload = PresignedUrlRequest {
        filename: "../../etc/passwd.png".to_string(),
        file_type: "image/png".to_string(),
    };

    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/uploads/presigned",
            serde_json::to_value(&payload).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: PresignedUrlResponse = body_json(response).await;
    assert!(!body.resource_key.contains(".."));
    assert!(body.resource_key.ends_with(".png"));
}

#[tokio::test]
async fn test_presigned_url_rejects_non_image_types() {
    let payload = PresignedUrlRequest {
        filename: "malware.exe".to_string(),
        file_type: "application/octet-stream".to_string(),
    };

    let response = app()
        .oneshot(admin_post(
            "/admin-secret-xyz/uploads/presigned",
            serde_json::to_value(&payload).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_presigned_url_storage_failure() {
    let payload = PresignedUrlRequest {
        filename: "valid.jpg".to_string(),
        file_type: "image/jpeg".to_string(),
    };

    let response = app_with(StubRepository::default(), MockStorageService::new_failing())
        .oneshot(admin_post(
            "/admin-secret-xyz/uploads/presigned",
            serde_json::to_value(&payload).unwrap(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
