#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use chrono::Utc;
#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
use crate::core::error::{AppError, Result};
#[cfg(test)]
use crate::features::categories::models::{Category, PositionUpdate};
#[cfg(test)]
use crate::features::categories::services::CategoryStore;

#[cfg(test)]
pub fn category(name: &str, slug: &str, parent_id: Option<Uuid>, position: i32) -> Category {
    let now = Utc::now();
    Category {
        id: Uuid::new_v4(),
        parent_id,
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        image_url: None,
        position,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory `CategoryStore` for tests. Mirrors the Postgres store's
/// observable behavior, including the all-or-nothing batch position update.
#[cfg(test)]
pub struct InMemoryCategoryStore {
    categories: Mutex<Vec<Category>>,
    fail_next_write: AtomicBool,
}

#[cfg(test)]
impl InMemoryCategoryStore {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Mutex::new(categories),
            fail_next_write: AtomicBool::new(false),
        }
    }

    /// Make the next write operation fail without applying anything.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Category> {
        self.categories.lock().unwrap().clone()
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal("simulated store failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn fetch_all(&self) -> Result<Vec<Category>> {
        let mut categories = self.categories.lock().unwrap().clone();
        categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn fetch_page(&self, limit: i64, offset: i64) -> Result<(Vec<Category>, i64)> {
        let all = self.fetch_all().await?;
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn insert(&self, category: Category) -> Result<Category> {
        self.check_write()?;
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn update_fields(&self, category: &Category) -> Result<Category> {
        self.check_write()?;
        let mut categories = self.categories.lock().unwrap();
        let existing = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", category.id)))?;
        existing.name = category.name.clone();
        existing.slug = category.slug.clone();
        existing.description = category.description.clone();
        existing.image_url = category.image_url.clone();
        existing.is_active = category.is_active;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn update_parent(
        &self,
        id: Uuid,
        parent_id: Option<Uuid>,
        position: i32,
    ) -> Result<Category> {
        self.check_write()?;
        let mut categories = self.categories.lock().unwrap();
        let existing = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))?;
        existing.parent_id = parent_id;
        existing.position = position;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn update_positions(&self, updates: &[PositionUpdate]) -> Result<()> {
        self.check_write()?;
        let mut categories = self.categories.lock().unwrap();
        for update in updates {
            if let Some(existing) = categories.iter_mut().find(|c| c.id == update.id) {
                existing.position = update.position;
                existing.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete_subtree(&self, id: Uuid) -> Result<u64> {
        self.check_write()?;
        let mut categories = self.categories.lock().unwrap();
        let mut doomed = vec![id];
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in categories.iter().filter(|c| c.parent_id == Some(current)) {
                doomed.push(child.id);
                frontier.push(child.id);
            }
        }
        let before = categories.len();
        categories.retain(|c| !doomed.contains(&c.id));
        Ok((before - categories.len()) as u64)
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.slug == slug && Some(c.id) != exclude_id))
    }
}
