use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::validate_slug;

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub position: i32,
    pub is_active: bool,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image_url: c.image_url,
            position: c.position,
            is_active: c.is_active,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from flat list of categories.
    ///
    /// Every level is ordered by ascending position. A category whose
    /// parent_id does not resolve to any record is surfaced as a root with a
    /// warning rather than dropped silently.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeDto> {
        let known: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

        let mut roots: Vec<&Category> = categories
            .iter()
            .filter(|c| match c.parent_id {
                None => true,
                Some(parent_id) => {
                    let orphaned = !known.contains(&parent_id);
                    if orphaned {
                        tracing::warn!(
                            "Category {} references missing parent {}; treating as root",
                            c.id,
                            parent_id
                        );
                    }
                    orphaned
                }
            })
            .collect();
        roots.sort_by_key(|c| c.position);

        roots
            .into_iter()
            .map(|root| Self::build_node(root, &categories))
            .collect()
    }

    fn build_node(category: &Category, all_categories: &[Category]) -> CategoryTreeDto {
        let mut children: Vec<&Category> = all_categories
            .iter()
            .filter(|c| c.parent_id == Some(category.id))
            .collect();
        children.sort_by_key(|c| c.position);

        let children = children
            .into_iter()
            .map(|child| Self::build_node(child, all_categories))
            .collect();

        CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
            position: category.position,
            is_active: category.is_active,
            children,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Display label
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// URL-safe identifier, unique across all categories
    #[validate(
        length(min = 1, max = 255, message = "Slug must be 1-255 characters"),
        custom(function = validate_slug)
    )]
    pub slug: String,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    /// Reference to an externally stored image
    #[validate(length(max = 2048, message = "Image URL must not exceed 2048 characters"))]
    pub image_url: Option<String>,

    /// Parent category; omit for a root-level category
    pub parent_id: Option<Uuid>,

    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Request DTO for updating a category's editable fields.
/// Parent and position are changed through the move endpoint instead.
///
/// Merge-patch semantics: a field that is omitted (or null) is left
/// unchanged, so `description` and `image_url` cannot be cleared through
/// this DTO. Send an empty string to blank them out.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Slug must be 1-255 characters"),
        custom(function = validate_slug)
    )]
    pub slug: Option<String>,

    #[validate(length(max = 2000, message = "Description must not exceed 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 2048, message = "Image URL must not exceed 2048 characters"))]
    pub image_url: Option<String>,

    pub is_active: Option<bool>,
}

/// Where a dragged category row was dropped.
///
/// Decoded once at the HTTP boundary; the move service never sees the
/// sentinel strings the admin UI's drag library uses internally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropTargetDto {
    /// Dropped onto another row: reorder within the shared sibling group
    Reorder { over_id: Uuid },
    /// Dropped onto a category's descendant drop zone: re-parent under it
    MoveInto { parent_id: Uuid },
    /// Dropped onto the root drop zone: re-parent to the root group
    MoveToRoot,
}

/// Request DTO for a drag-end event from the admin category tree
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MoveCategoryDto {
    /// The dragged category
    pub active_id: Uuid,
    pub target: DropTargetDto,
}

/// Response DTO for a cascading category delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteCategoryResponseDto {
    /// Number of categories removed, descendants included
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::category;

    fn flatten(nodes: &[CategoryTreeDto], out: &mut Vec<Uuid>) {
        for node in nodes {
            out.push(node.id);
            flatten(&node.children, out);
        }
    }

    #[test]
    fn test_build_tree_orders_every_level_by_position() {
        let root_a = category("Kurthis", "kurthis", None, 1);
        let root_b = category("Sarees", "sarees", None, 0);
        let child_a = category("Silk Kurthis", "silk-kurthis", Some(root_a.id), 1);
        let child_b = category("Cotton Kurthis", "cotton-kurthis", Some(root_a.id), 0);

        let tree = CategoryTreeDto::build_tree(vec![
            root_a.clone(),
            root_b.clone(),
            child_a.clone(),
            child_b.clone(),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, root_b.id);
        assert_eq!(tree[1].id, root_a.id);
        let children: Vec<Uuid> = tree[1].children.iter().map(|c| c.id).collect();
        assert_eq!(children, vec![child_b.id, child_a.id]);
    }

    #[test]
    fn test_build_tree_treats_orphan_as_root() {
        let root = category("Sarees", "sarees", None, 0);
        let orphan = category("Lost", "lost", Some(Uuid::new_v4()), 1);

        let tree = CategoryTreeDto::build_tree(vec![root.clone(), orphan.clone()]);

        let root_ids: Vec<Uuid> = tree.iter().map(|n| n.id).collect();
        assert_eq!(root_ids, vec![root.id, orphan.id]);
    }

    #[test]
    fn test_build_tree_round_trip_preserves_ids() {
        let root = category("Kurthis", "kurthis", None, 0);
        let child = category("Silk Kurthis", "silk-kurthis", Some(root.id), 0);
        let grandchild = category("Banarasi", "banarasi", Some(child.id), 0);
        let flat = vec![root, child, grandchild];
        let expected: std::collections::HashSet<Uuid> = flat.iter().map(|c| c.id).collect();

        let tree = CategoryTreeDto::build_tree(flat);

        let mut ids = Vec::new();
        flatten(&tree, &mut ids);
        assert_eq!(ids.len(), expected.len());
        assert_eq!(ids.into_iter().collect::<std::collections::HashSet<_>>(), expected);
    }

    #[test]
    fn test_drop_target_wire_format() {
        let reorder: DropTargetDto =
            serde_json::from_value(serde_json::json!({ "kind": "reorder", "over_id": Uuid::nil() }))
                .unwrap();
        assert!(matches!(reorder, DropTargetDto::Reorder { .. }));

        let to_root: DropTargetDto =
            serde_json::from_value(serde_json::json!({ "kind": "move_to_root" })).unwrap();
        assert!(matches!(to_root, DropTargetDto::MoveToRoot));
    }

    #[test]
    fn test_create_dto_rejects_bad_slug() {
        let dto = CreateCategoryDto {
            name: "Silk Kurthis".to_string(),
            slug: "Silk Kurthis".to_string(),
            description: None,
            image_url: None,
            parent_id: None,
            is_active: true,
        };
        assert!(dto.validate().is_err());
    }
}
