use crate::models::{
    AdminStats, AdminUser, Banner, Category, CreateBannerRequest, CreateProductRequest, Product,
    UpdateBannerRequest, UpdateCategoryRequest, UpdateProductRequest,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// CreateError
///
/// Failure modes for resource creation. `Conflict` is surfaced as a
/// distinguishable variant because slug columns carry unique constraints and
/// handlers must be able to answer 409 instead of a generic 500. The slug
/// deriver itself never guarantees uniqueness; the database does.
#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("identifier already exists")]
    Conflict,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for CreateError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CreateError::Conflict,
            _ => CreateError::Database(e),
        }
    }
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// interact with the data layer without knowing the implementation (Postgres,
/// stub, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Products ---
    // Storefront listing with filtering. Must enforce published=true.
    async fn get_products(&self, category: Option<Uuid>, search: Option<String>) -> Vec<Product>;
    // Admin access: retrieves all products regardless of publish state.
    async fn get_all_products(&self) -> Vec<Product>;
    // Storefront detail: published products only, addressed by slug.
    async fn get_product_by_slug(&self, slug: &str) -> Option<Product>;
    async fn get_product(&self, id: Uuid) -> Option<Product>;
    // The slug is derived by the caller; a duplicate surfaces as Conflict.
    async fn create_product(
        &self,
        req: CreateProductRequest,
        slug: &str,
    ) -> Result<Product, CreateError>;
    // Partial update via COALESCE. The slug column is never touched.
    async fn update_product(&self, id: Uuid, req: UpdateProductRequest) -> Option<Product>;
    async fn delete_product(&self, id: Uuid) -> bool;

    // --- Categories ---
    async fn get_categories(&self) -> Vec<Category>;
    async fn get_category_by_slug(&self, slug: &str) -> Option<Category>;
    async fn create_category(&self, name: &str, slug: &str) -> Result<Category, CreateError>;
    async fn update_category(&self, id: Uuid, req: UpdateCategoryRequest) -> Option<Category>;
    async fn delete_category(&self, id: Uuid) -> bool;

    // --- Banners ---
    // Storefront listing: active banners only, in display order.
    async fn get_active_banners(&self) -> Vec<Banner>;
    async fn get_all_banners(&self) -> Vec<Banner>;
    async fn create_banner(&self, req: CreateBannerRequest) -> Result<Banner, CreateError>;
    async fn update_banner(&self, id: Uuid, req: UpdateBannerRequest) -> Option<Banner>;
    async fn delete_banner(&self, id: Uuid) -> bool;

    // --- Admin users & dashboard ---
    async fn get_admin_user(&self, id: Uuid) -> Option<AdminUser>;
    async fn upsert_admin_user(&self, user: AdminUser) -> Option<AdminUser>;
    async fn get_stats(&self) -> AdminStats;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price_cents, image, \
                               locale, published, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    /// get_products
    ///
    /// Flexible storefront listing using QueryBuilder for safe
    /// parameterization. **Security**: strictly enforces `published = true`
    /// in the base query.
    async fn get_products(&self, category: Option<Uuid>, search: Option<String>) -> Vec<Product> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE published = true "
        ));

        if let Some(c) = category {
            builder.push(" AND category_id = ");
            builder.push_bind(c);
        }

        if let Some(s) = search {
            // Case-insensitive search across name and description.
            let search_pattern = format!("%{}%", s);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(search_pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(search_pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY created_at DESC");

        let query = builder.build_query_as::<Product>();

        match query.fetch_all(&self.pool).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("get_products error: {:?}", e);
                vec![]
            }
        }
    }

    /// get_all_products
    ///
    /// Administrative listing. Does *not* include the `published = true`
    /// restriction; unpublished products sort first for review.
    async fn get_all_products(&self) -> Vec<Product> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY published ASC, created_at DESC"
        );
        match sqlx::query_as::<_, Product>(&sql).fetch_all(&self.pool).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("get_all_products error: {:?}", e);
                vec![]
            }
        }
    }

    /// get_product_by_slug
    ///
    /// Storefront detail lookup. Only published products resolve.
    async fn get_product_by_slug(&self, slug: &str) -> Option<Product> {
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1 AND published = true");
        sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_product_by_slug error: {:?}", e);
                None
            })
    }

    /// get_product
    ///
    /// Retrieval by id with no visibility check, for admin use.
    async fn get_product(&self, id: Uuid) -> Option<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_product error: {:?}", e);
                None
            })
    }

    /// create_product
    ///
    /// Inserts a new product with the caller-derived slug. New products start
    /// unpublished. A unique violation on the slug column maps to
    /// `CreateError::Conflict`.
    async fn create_product(
        &self,
        req: CreateProductRequest,
        slug: &str,
    ) -> Result<Product, CreateError> {
        let sql = format!(
            "INSERT INTO products \
             (id, category_id, name, slug, description, price_cents, image, locale, published, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, NOW(), NOW()) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.category_id)
            .bind(&req.name)
            .bind(slug)
            .bind(&req.description)
            .bind(req.price_cents)
            .bind(&req.image_key)
            .bind(req.locale.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(product)
    }

    /// update_product
    ///
    /// Partial update via COALESCE: a column changes only when the matching
    /// request field is `Some`. The slug column is deliberately absent from
    /// the SET list — identifiers are fixed at creation.
    async fn update_product(&self, id: Uuid, req: UpdateProductRequest) -> Option<Product> {
        let sql = format!(
            "UPDATE products \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price_cents = COALESCE($4, price_cents), \
                 category_id = COALESCE($5, category_id), \
                 image = COALESCE($6, image), \
                 published = COALESCE($7, published), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(req.price_cents)
            .bind(req.category_id)
            .bind(&req.image_key)
            .bind(req.published)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_product error: {:?}", e);
                None
            })
    }

    /// delete_product
    ///
    /// Returns true only if a row was removed.
    async fn delete_product(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_product error: {:?}", e);
                false
            }
        }
    }

    // --- CATEGORIES ---

    async fn get_categories(&self) -> Vec<Category> {
        match sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, created_at, updated_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("get_categories error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_category_by_slug(&self, slug: &str) -> Option<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, created_at, updated_at FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_category_by_slug error: {:?}", e);
            None
        })
    }

    /// create_category
    ///
    /// Inserts a new category with the caller-derived (unprefixed) slug.
    async fn create_category(&self, name: &str, slug: &str) -> Result<Category, CreateError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, slug, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             RETURNING id, name, slug, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    /// update_category
    ///
    /// Renames only; the slug survives so published category URLs keep working.
    async fn update_category(&self, id: Uuid, req: UpdateCategoryRequest) -> Option<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = COALESCE($2, name), updated_at = NOW() \
             WHERE id = $1 RETURNING id, name, slug, created_at, updated_at",
        )
        .bind(id)
        .bind(&req.name)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_category error: {:?}", e);
            None
        })
    }

    async fn delete_category(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_category error: {:?}", e);
                false
            }
        }
    }

    // --- BANNERS ---

    async fn get_active_banners(&self) -> Vec<Banner> {
        match sqlx::query_as::<_, Banner>(
            "SELECT id, title, image, link, position, active, created_at, updated_at \
             FROM banners WHERE active = true ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("get_active_banners error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_all_banners(&self) -> Vec<Banner> {
        match sqlx::query_as::<_, Banner>(
            "SELECT id, title, image, link, position, active, created_at, updated_at \
             FROM banners ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(b) => b,
            Err(e) => {
                tracing::error!("get_all_banners error: {:?}", e);
                vec![]
            }
        }
    }

    /// create_banner
    ///
    /// New banners start inactive until an admin flips them on.
    async fn create_banner(&self, req: CreateBannerRequest) -> Result<Banner, CreateError> {
        let banner = sqlx::query_as::<_, Banner>(
            "INSERT INTO banners (id, title, image, link, position, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, false, NOW(), NOW()) \
             RETURNING id, title, image, link, position, active, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&req.title)
        .bind(&req.image_key)
        .bind(&req.link)
        .bind(req.position)
        .fetch_one(&self.pool)
        .await?;
        Ok(banner)
    }

    async fn update_banner(&self, id: Uuid, req: UpdateBannerRequest) -> Option<Banner> {
        sqlx::query_as::<_, Banner>(
            "UPDATE banners \
             SET title = COALESCE($2, title), \
                 image = COALESCE($3, image), \
                 link = COALESCE($4, link), \
                 position = COALESCE($5, position), \
                 active = COALESCE($6, active), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, title, image, link, position, active, created_at, updated_at",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.image_key)
        .bind(&req.link)
        .bind(req.position)
        .bind(req.active)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_banner error: {:?}", e);
            None
        })
    }

    async fn delete_banner(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_banner error: {:?}", e);
                false
            }
        }
    }

    // --- ADMIN USERS & DASHBOARD ---

    /// get_admin_user
    ///
    /// Retrieves the operator record needed to attribute admin actions.
    async fn get_admin_user(&self, id: Uuid) -> Option<AdminUser> {
        sqlx::query_as::<_, AdminUser>("SELECT id, email FROM admin_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or(None)
    }

    /// upsert_admin_user
    ///
    /// Mirrors the identity provider's record locally after a successful
    /// sign-in, so later lookups need no external call.
    async fn upsert_admin_user(&self, user: AdminUser) -> Option<AdminUser> {
        sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admin_users (id, email) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email \
             RETURNING id, email",
        )
        .bind(user.id)
        .bind(&user.email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("upsert_admin_user error: {:?}", e);
            None
        })
    }

    /// get_stats
    ///
    /// Compiles the counters for the admin dashboard in a single call.
    async fn get_stats(&self) -> AdminStats {
        let total_products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_categories = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let total_banners = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM banners")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let unpublished_products =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE published = false")
                .fetch_one(&self.pool)
                .await
                .unwrap_or(0);
        AdminStats {
            total_products,
            total_categories,
            total_banners,
            unpublished_products,
        }
    }
}
