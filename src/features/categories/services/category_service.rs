use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;
use crate::features::categories::services::{CategoryMoveService, CategoryStore};
use crate::shared::types::PaginationQuery;

/// Service for category CRUD and storefront reads
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// List all active categories (flat list)
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.fetch_all().await?;

        Ok(categories
            .into_iter()
            .filter(|c| c.is_active)
            .map(|c| c.into())
            .collect())
    }

    /// List all active categories as tree structure.
    ///
    /// An inactive category hides its whole subtree on the storefront, so
    /// pruning happens after the tree is built on the full record set.
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.store.fetch_all().await?;
        let tree = CategoryTreeDto::build_tree(categories);

        Ok(Self::prune_inactive(tree))
    }

    fn prune_inactive(nodes: Vec<CategoryTreeDto>) -> Vec<CategoryTreeDto> {
        nodes
            .into_iter()
            .filter(|n| n.is_active)
            .map(|mut n| {
                n.children = Self::prune_inactive(std::mem::take(&mut n.children));
                n
            })
            .collect()
    }

    /// Get active category by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let category = self.store.fetch_by_slug(slug).await?;

        category
            .filter(|c| c.is_active)
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))
    }

    /// List all categories for the admin dashboard, inactive included
    pub async fn list_admin(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<CategoryResponseDto>, i64)> {
        let (categories, total) = self
            .store
            .fetch_page(pagination.limit(), pagination.offset())
            .await?;

        Ok((categories.into_iter().map(|c| c.into()).collect(), total))
    }

    /// Create a new category, appended at the end of its sibling group
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        if self.store.slug_exists(&dto.slug, None).await? {
            return Err(AppError::Conflict(format!(
                "Category slug '{}' is already in use",
                dto.slug
            )));
        }

        let all = self.store.fetch_all().await?;
        if let Some(parent_id) = dto.parent_id {
            if !all.iter().any(|c| c.id == parent_id) {
                return Err(AppError::Validation(format!(
                    "Parent category '{}' does not exist",
                    parent_id
                )));
            }
        }

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            parent_id: dto.parent_id,
            name: dto.name,
            slug: dto.slug,
            description: dto.description,
            image_url: dto.image_url,
            position: CategoryMoveService::next_position(&all, dto.parent_id),
            is_active: dto.is_active,
            created_at: now,
            updated_at: now,
        };

        let created = self.store.insert(category).await?;

        tracing::info!("Category created: id={}, slug={}", created.id, created.slug);

        Ok(created.into())
    }

    /// Update a category's editable fields (name, slug, description,
    /// image_url, is_active). Re-parenting goes through the move service.
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let mut category = self
            .store
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))?;

        if let Some(slug) = &dto.slug {
            if slug != &category.slug && self.store.slug_exists(slug, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Category slug '{}' is already in use",
                    slug
                )));
            }
            category.slug = slug.clone();
        }
        if let Some(name) = dto.name {
            category.name = name;
        }
        // Omitted fields stay unchanged; an empty string clears the field.
        if let Some(description) = dto.description {
            category.description = (!description.is_empty()).then_some(description);
        }
        if let Some(image_url) = dto.image_url {
            category.image_url = (!image_url.is_empty()).then_some(image_url);
        }
        if let Some(is_active) = dto.is_active {
            category.is_active = is_active;
        }

        let updated = self.store.update_fields(&category).await?;

        tracing::info!("Category updated: id={}, slug={}", updated.id, updated.slug);

        Ok(updated.into())
    }

    /// Delete a category and every descendant. Returns the number removed.
    pub async fn delete(&self, id: Uuid) -> Result<u64> {
        if self.store.fetch_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category '{}' not found", id)));
        }

        let deleted = self.store.delete_subtree(id).await?;

        tracing::info!(
            "Category {} deleted ({} categories including descendants)",
            id,
            deleted
        );

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{category, InMemoryCategoryStore};

    fn service(categories: Vec<Category>) -> (CategoryService, Arc<InMemoryCategoryStore>) {
        let store = Arc::new(InMemoryCategoryStore::new(categories));
        (CategoryService::new(store.clone()), store)
    }

    fn create_dto(name: &str, slug: &str, parent_id: Option<Uuid>) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            slug: slug.to_string(),
            description: None,
            image_url: None,
            parent_id,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_appends_to_sibling_group() {
        let root = category("Kurthis", "kurthis", None, 0);
        let child = category("Silk Kurthis", "silk-kurthis", Some(root.id), 0);
        let (service, _) = service(vec![root.clone(), child]);

        let created = service
            .create(create_dto("Cotton Kurthis", "cotton-kurthis", Some(root.id)))
            .await
            .unwrap();

        assert_eq!(created.parent_id, Some(root.id));
        assert_eq!(created.position, 1);
    }

    #[tokio::test]
    async fn test_create_defaults_to_root() {
        let existing = category("Sarees", "sarees", None, 0);
        let (service, _) = service(vec![existing]);

        let created = service
            .create(create_dto("Kurthis", "kurthis", None))
            .await
            .unwrap();

        assert_eq!(created.parent_id, None);
        assert_eq!(created.position, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_slug() {
        let existing = category("Sarees", "sarees", None, 0);
        let (service, store) = service(vec![existing]);

        let result = service.create(create_dto("Other Sarees", "sarees", None)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_parent() {
        let (service, store) = service(vec![]);

        let result = service
            .create(create_dto("Kurthis", "kurthis", Some(Uuid::new_v4())))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_slug_collision() {
        let a = category("Sarees", "sarees", None, 0);
        let b = category("Kurthis", "kurthis", None, 1);
        let (service, _) = service(vec![a, b.clone()]);

        let dto = UpdateCategoryDto {
            name: None,
            slug: Some("sarees".to_string()),
            description: None,
            image_url: None,
            is_active: None,
        };
        let result = service.update(b.id, dto).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let existing = category("Sarees", "sarees", None, 0);
        let (service, _) = service(vec![existing.clone()]);

        let dto = UpdateCategoryDto {
            name: Some("Silk Sarees".to_string()),
            slug: None,
            description: Some("Handwoven silk".to_string()),
            image_url: None,
            is_active: Some(false),
        };
        let updated = service.update(existing.id, dto).await.unwrap();

        assert_eq!(updated.name, "Silk Sarees");
        assert_eq!(updated.slug, "sarees");
        assert_eq!(updated.description.as_deref(), Some("Handwoven silk"));
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn test_update_leaves_omitted_fields_unchanged() {
        let mut existing = category("Sarees", "sarees", None, 0);
        existing.description = Some("Handwoven silk".to_string());
        existing.image_url = Some("https://cdn.example.com/sarees.jpg".to_string());
        let (service, _) = service(vec![existing.clone()]);

        let dto = UpdateCategoryDto {
            name: Some("Silk Sarees".to_string()),
            slug: None,
            description: None,
            image_url: None,
            is_active: None,
        };
        let updated = service.update(existing.id, dto).await.unwrap();

        assert_eq!(updated.name, "Silk Sarees");
        assert_eq!(updated.description.as_deref(), Some("Handwoven silk"));
        assert_eq!(
            updated.image_url.as_deref(),
            Some("https://cdn.example.com/sarees.jpg")
        );
    }

    #[tokio::test]
    async fn test_update_empty_string_clears_optional_fields() {
        let mut existing = category("Sarees", "sarees", None, 0);
        existing.description = Some("Handwoven silk".to_string());
        existing.image_url = Some("https://cdn.example.com/sarees.jpg".to_string());
        let (service, _) = service(vec![existing.clone()]);

        let dto = UpdateCategoryDto {
            name: None,
            slug: None,
            description: Some(String::new()),
            image_url: Some(String::new()),
            is_active: None,
        };
        let updated = service.update(existing.id, dto).await.unwrap();

        assert_eq!(updated.description, None);
        assert_eq!(updated.image_url, None);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_descendants() {
        let root = category("Kurthis", "kurthis", None, 0);
        let child = category("Silk Kurthis", "silk-kurthis", Some(root.id), 0);
        let grandchild = category("Banarasi", "banarasi", Some(child.id), 0);
        let sibling = category("Sarees", "sarees", None, 1);
        let (service, store) = service(vec![root.clone(), child.clone(), grandchild, sibling.clone()]);

        let deleted = service.delete(root.id).await.unwrap();

        assert_eq!(deleted, 3);
        let remaining = store.snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, sibling.id);
        // no dangling parent references survive the cascade
        assert!(remaining.iter().all(|c| c.parent_id.is_none()));
    }

    #[tokio::test]
    async fn test_delete_missing_category_is_not_found() {
        let (service, _) = service(vec![]);

        let result = service.delete(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_tree_prunes_inactive_subtrees() {
        let mut hidden = category("Archive", "archive", None, 0);
        hidden.is_active = false;
        let visible_child = category("Old Stock", "old-stock", Some(hidden.id), 0);
        let root = category("Sarees", "sarees", None, 1);
        let (service, _) = service(vec![hidden, visible_child, root.clone()]);

        let tree = service.list_tree().await.unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, root.id);
    }

    #[tokio::test]
    async fn test_get_by_slug_hides_inactive() {
        let mut hidden = category("Archive", "archive", None, 0);
        hidden.is_active = false;
        let (service, _) = service(vec![hidden]);

        let result = service.get_by_slug("archive").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_admin_paginates_and_counts() {
        let categories: Vec<Category> = (0..15)
            .map(|i| category(&format!("Category {i}"), &format!("category-{i}"), None, i))
            .collect();
        let (service, _) = service(categories);

        let query = PaginationQuery { page: 2, page_size: 10 };
        let (page, total) = service.list_admin(&query).await.unwrap();

        assert_eq!(total, 15);
        assert_eq!(page.len(), 5);
    }
}
