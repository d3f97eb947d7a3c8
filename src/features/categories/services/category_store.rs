use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, PositionUpdate};

const CATEGORY_COLUMNS: &str =
    "id, parent_id, name, slug, description, image_url, position, is_active, created_at, updated_at";

/// Persistence boundary for the category tree.
///
/// Keeps the tree logic independent of any concrete backend: the production
/// implementation is Postgres-backed, tests run against an in-memory store.
/// `update_positions` is the one batch operation and must be all-or-nothing;
/// partial application would leave ties or gaps in a sibling group.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Category>>;

    /// Fetch one page of categories plus the total count.
    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<(Vec<Category>, i64)>;

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Category>>;

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    async fn insert(&self, category: Category) -> Result<Category>;

    /// Update editable fields (name, slug, description, image_url, is_active).
    /// Parent and position are only changed through `update_parent` and
    /// `update_positions`.
    async fn update_fields(&self, category: &Category) -> Result<Category>;

    /// Re-parent a category and assign its position in the new sibling group.
    async fn update_parent(
        &self,
        id: Uuid,
        parent_id: Option<Uuid>,
        position: i32,
    ) -> Result<Category>;

    /// Atomically apply a batch of position assignments for one sibling group.
    async fn update_positions(&self, updates: &[PositionUpdate]) -> Result<()>;

    /// Delete a category and every descendant. Returns the number of
    /// categories removed.
    async fn delete_subtree(&self, id: Uuid) -> Result<u64>;

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool>;
}

/// Postgres-backed category store
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn fetch_all(&self) -> Result<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY position, name");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(categories)
    }

    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<(Vec<Category>, i64)> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY position, name LIMIT $1 OFFSET $2"
        );
        let categories = sqlx::query_as::<_, Category>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch category page: {:?}", e);
                AppError::Database(e)
            })?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((categories, total))
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch category by id: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(category)
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch category by slug: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(category)
    }

    async fn insert(&self, category: Category) -> Result<Category> {
        let sql = format!(
            r#"
            INSERT INTO categories
                (id, parent_id, name, slug, description, image_url, position, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CATEGORY_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Category>(&sql)
            .bind(category.id)
            .bind(category.parent_id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.image_url)
            .bind(category.position)
            .bind(category.is_active)
            .bind(category.created_at)
            .bind(category.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert category: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(created)
    }

    async fn update_fields(&self, category: &Category) -> Result<Category> {
        let sql = format!(
            r#"
            UPDATE categories
            SET name = $1, slug = $2, description = $3, image_url = $4, is_active = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING {CATEGORY_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Category>(&sql)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.image_url)
            .bind(category.is_active)
            .bind(category.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update category: {:?}", e);
                AppError::Database(e)
            })?;

        updated.ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", category.id)))
    }

    async fn update_parent(
        &self,
        id: Uuid,
        parent_id: Option<Uuid>,
        position: i32,
    ) -> Result<Category> {
        let sql = format!(
            r#"
            UPDATE categories
            SET parent_id = $1, position = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {CATEGORY_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Category>(&sql)
            .bind(parent_id)
            .bind(position)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to re-parent category: {:?}", e);
                AppError::Database(e)
            })?;

        updated.ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))
    }

    async fn update_positions(&self, updates: &[PositionUpdate]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin position update transaction: {:?}", e);
            AppError::Database(e)
        })?;

        for update in updates {
            sqlx::query("UPDATE categories SET position = $1, updated_at = NOW() WHERE id = $2")
                .bind(update.position)
                .bind(update.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to update category position: {:?}", e);
                    AppError::Database(e)
                })?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit position updates: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn delete_subtree(&self, id: Uuid) -> Result<u64> {
        // Collect the whole subtree so the returned count covers descendants;
        // the FK ON DELETE CASCADE alone would not report them.
        let result = sqlx::query(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id FROM categories WHERE id = $1
                UNION ALL
                SELECT c.id FROM categories c
                JOIN subtree s ON c.parent_id = s.id
            )
            DELETE FROM categories WHERE id IN (SELECT id FROM subtree)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete category subtree: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        let exists: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM categories WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check slug uniqueness: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(exists.is_some())
    }
}
