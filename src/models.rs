use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::slug::Locale;

// --- Core Catalog Schemas (Mapped to Database) ---

/// AdminUser
///
/// The canonical identity record for a panel operator, stored in the
/// `public.admin_users` table. Only presence matters to the access guard;
/// the email is carried for the profile endpoint and audit logs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AdminUser {
    // Primary key, mirrors the identity provider's user id.
    pub id: Uuid,
    pub email: String,
}

/// Product
///
/// A catalog product row from `public.products`. The `slug` is derived once at
/// creation time from the name and locale, persisted under a unique constraint,
/// and never rewritten by updates.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Product {
    pub id: Uuid,
    // FK to public.categories.id. Optional: a product may be uncategorized.
    pub category_id: Option<Uuid>,
    pub name: String,
    /// Locale-namespaced identifier, e.g. `cafe-com-leite` or `br-cafe-com-leite`.
    pub slug: String,
    pub description: String,
    /// Price in the smallest currency unit. Integer cents avoid float drift.
    pub price_cents: i64,
    // Storage key for the product image, set after the presigned upload flow.
    pub image: Option<String>,
    /// The catalog language this product belongs to ("en" or "br").
    pub locale: String,
    // Controls storefront visibility (enforced at the repository layer).
    pub published: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Category
///
/// A catalog category row from `public.categories`. Category slugs are
/// normalized but deliberately *not* locale-prefixed — categories span both
/// language catalogs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Banner
///
/// A storefront banner row from `public.banners`. Banners have no slug; they
/// are addressed by id and ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    // Storage key for the banner artwork.
    pub image: String,
    // Optional click-through target.
    pub link: Option<String>,
    pub position: i32,
    // Only active banners are served to the storefront.
    pub active: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// CreateProductRequest
///
/// Input payload for POST {admin}/products. The slug is never accepted from
/// the client; it is derived server-side from `name` and `locale`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category_id: Option<Uuid>,
    // Storage key resulting from the presigned upload flow.
    pub image_key: Option<String>,
    /// Catalog language. Defaults to the primary locale when omitted.
    #[serde(default)]
    pub locale: Locale,
}

/// UpdateProductRequest
///
/// Partial update payload for PUT {admin}/products/{id}. The slug is absent
/// on purpose: identifiers are fixed at creation time.
///
/// Uses `Option<T>` plus `#[serde(skip_serializing_if = "Option::is_none")]`
/// so only provided fields travel in the JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

/// CreateCategoryRequest
///
/// Input payload for POST {admin}/categories. Only a display name: the slug
/// is derived server-side (no locale prefix for categories).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// UpdateCategoryRequest
///
/// Partial update for PUT {admin}/categories/{id}. Renaming a category does
/// not regenerate its slug — published URLs keep working.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// CreateBannerRequest
///
/// Input payload for POST {admin}/banners.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBannerRequest {
    pub title: String,
    pub image_key: String,
    pub link: Option<String>,
    #[serde(default)]
    pub position: i32,
}

/// UpdateBannerRequest
///
/// Partial update for PUT {admin}/banners/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateBannerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// SignInRequest
///
/// Input payload for POST /sign-in. The password is passed through to the
/// external identity provider and never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// SetLocaleRequest
///
/// Input payload for POST /locale. The chosen locale is written to a cookie
/// and read back per request — explicit context, not server-side state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SetLocaleRequest {
    pub locale: Locale,
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived image upload URL.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "espresso.jpg")]
    pub filename: String,
    /// The MIME type, used to constrain the upload to the allowed type.
    #[schema(example = "image/jpeg")]
    pub file_type: String,
}

/// PresignedUrlResponse
///
/// Output schema containing the temporary URL for client-to-storage transfer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The object key where the file lands (referenced by image fields).
    pub resource_key: String,
}

// --- Dashboard Schemas (Output) ---

/// AdminStats
///
/// Output schema for the admin dashboard (GET {admin}/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminStats {
    pub total_products: i64,
    pub total_categories: i64,
    pub total_banners: i64,
    /// Products not yet visible on the storefront.
    pub unpublished_products: i64,
}
