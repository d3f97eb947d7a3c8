use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, DropTargetDto};
use crate::features::categories::models::{Category, PositionUpdate};
use crate::features::categories::services::CategoryStore;

/// Result of a classified drag-end event
#[derive(Debug)]
pub enum MoveOutcome {
    /// The tree changed; carries the refreshed flat list from the store
    Applied(Vec<CategoryResponseDto>),
    /// Nothing to do (dropped onto self, already-correct parent, or a
    /// cross-level reorder attempt)
    NoOp,
}

/// Coordinates drag-and-drop mutations on the category tree.
///
/// Classifies each drag-end event as a reorder, a re-parent, or a no-op,
/// rejects self-parenting and cycles before anything reaches the store, and
/// renumbers sibling positions so each group keeps a strict total order.
pub struct CategoryMoveService {
    store: Arc<dyn CategoryStore>,
}

impl CategoryMoveService {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// True iff `candidate_id` is reachable from `ancestor_id` via child
    /// edges, at any depth. Moving `ancestor_id` under such a candidate would
    /// create a cycle.
    pub fn is_descendant(all: &[Category], ancestor_id: Uuid, candidate_id: Uuid) -> bool {
        let mut frontier: Vec<Uuid> = all
            .iter()
            .filter(|c| c.parent_id == Some(ancestor_id))
            .map(|c| c.id)
            .collect();

        while let Some(current) = frontier.pop() {
            if current == candidate_id {
                return true;
            }
            frontier.extend(
                all.iter()
                    .filter(|c| c.parent_id == Some(current))
                    .map(|c| c.id),
            );
        }

        false
    }

    /// Sibling group of `parent_id`, sorted by ascending position
    pub fn siblings(all: &[Category], parent_id: Option<Uuid>) -> Vec<&Category> {
        let mut siblings: Vec<&Category> =
            all.iter().filter(|c| c.parent_id == parent_id).collect();
        siblings.sort_by_key(|c| c.position);
        siblings
    }

    /// Position that appends a category at the end of a sibling group
    pub fn next_position(all: &[Category], parent_id: Option<Uuid>) -> i32 {
        Self::siblings(all, parent_id)
            .last()
            .map(|c| c.position + 1)
            .unwrap_or(0)
    }

    /// Move `active_id` to the index of `over_id` within the position-sorted
    /// sibling list and renumber the group 0..n. Returns None when the move
    /// changes nothing.
    fn reorder_positions(
        sibling_ids: &[Uuid],
        active_id: Uuid,
        over_id: Uuid,
    ) -> Option<Vec<PositionUpdate>> {
        let old_index = sibling_ids.iter().position(|&id| id == active_id)?;
        let new_index = sibling_ids.iter().position(|&id| id == over_id)?;
        if old_index == new_index {
            return None;
        }

        let mut reordered = sibling_ids.to_vec();
        let moved = reordered.remove(old_index);
        reordered.insert(new_index, moved);

        Some(
            reordered
                .into_iter()
                .enumerate()
                .map(|(index, id)| PositionUpdate {
                    id,
                    position: index as i32,
                })
                .collect(),
        )
    }

    /// Apply one drag-end event from the admin category tree.
    ///
    /// Validation failures never reach the store; store failures propagate
    /// without any partial application (re-parenting is a single update,
    /// reorders a single transactional batch).
    pub async fn apply_drag(&self, active_id: Uuid, target: DropTargetDto) -> Result<MoveOutcome> {
        let all = self.store.fetch_all().await?;
        let dragged = all
            .iter()
            .find(|c| c.id == active_id)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", active_id)))?;

        match target {
            DropTargetDto::Reorder { over_id } => {
                if over_id == active_id {
                    return Ok(MoveOutcome::NoOp);
                }
                let over = all.iter().find(|c| c.id == over_id).ok_or_else(|| {
                    AppError::NotFound(format!("Category '{}' not found", over_id))
                })?;
                if over.parent_id != dragged.parent_id {
                    // crossing levels requires the explicit drop zones
                    return Ok(MoveOutcome::NoOp);
                }

                let sibling_ids: Vec<Uuid> = Self::siblings(&all, dragged.parent_id)
                    .iter()
                    .map(|c| c.id)
                    .collect();
                match Self::reorder_positions(&sibling_ids, active_id, over_id) {
                    Some(updates) => {
                        self.store.update_positions(&updates).await?;
                        tracing::info!(
                            "Category {} reordered within its sibling group",
                            active_id
                        );
                    }
                    None => return Ok(MoveOutcome::NoOp),
                }
            }
            DropTargetDto::MoveInto { parent_id } => {
                if parent_id == active_id {
                    return Err(AppError::Validation(
                        "A category cannot be its own parent".to_string(),
                    ));
                }
                if !all.iter().any(|c| c.id == parent_id) {
                    return Err(AppError::NotFound(format!(
                        "Category '{}' not found",
                        parent_id
                    )));
                }
                if Self::is_descendant(&all, active_id, parent_id) {
                    return Err(AppError::Validation(
                        "Cannot move a category into its own subtree".to_string(),
                    ));
                }
                if dragged.parent_id == Some(parent_id) {
                    return Ok(MoveOutcome::NoOp);
                }

                let position = Self::next_position(&all, Some(parent_id));
                self.store
                    .update_parent(active_id, Some(parent_id), position)
                    .await?;
                tracing::info!("Category {} moved under {}", active_id, parent_id);
            }
            DropTargetDto::MoveToRoot => {
                if dragged.parent_id.is_none() {
                    return Ok(MoveOutcome::NoOp);
                }

                let position = Self::next_position(&all, None);
                self.store.update_parent(active_id, None, position).await?;
                tracing::info!("Category {} moved to root", active_id);
            }
        }

        // respond with persisted truth rather than the pre-mutation snapshot
        let refreshed = self.store.fetch_all().await?;
        Ok(MoveOutcome::Applied(
            refreshed.into_iter().map(|c| c.into()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{category, InMemoryCategoryStore};
    use std::collections::HashSet;

    struct Fixture {
        service: CategoryMoveService,
        store: Arc<InMemoryCategoryStore>,
        kurthis: Category,
        dresses: Category,
        silk_kurthis: Category,
    }

    /// Two roots and one child: Kurthis (pos 0), Dresses (pos 1),
    /// Silk Kurthis under Kurthis (pos 0).
    fn fixture() -> Fixture {
        let kurthis = category("Kurthis", "kurthis", None, 0);
        let dresses = category("Dresses", "dresses", None, 1);
        let silk_kurthis = category("Silk Kurthis", "silk-kurthis", Some(kurthis.id), 0);
        let store = Arc::new(InMemoryCategoryStore::new(vec![
            kurthis.clone(),
            dresses.clone(),
            silk_kurthis.clone(),
        ]));
        Fixture {
            service: CategoryMoveService::new(store.clone()),
            store,
            kurthis,
            dresses,
            silk_kurthis,
        }
    }

    fn find(categories: &[Category], id: Uuid) -> Category {
        categories.iter().find(|c| c.id == id).cloned().unwrap()
    }

    #[test]
    fn test_is_descendant_direct_and_transitive() {
        let root = category("Kurthis", "kurthis", None, 0);
        let child = category("Silk Kurthis", "silk-kurthis", Some(root.id), 0);
        let grandchild = category("Banarasi", "banarasi", Some(child.id), 0);
        let all = vec![root.clone(), child.clone(), grandchild.clone()];

        assert!(CategoryMoveService::is_descendant(&all, root.id, child.id));
        assert!(CategoryMoveService::is_descendant(&all, root.id, grandchild.id));
        assert!(!CategoryMoveService::is_descendant(&all, child.id, root.id));
        assert!(!CategoryMoveService::is_descendant(&all, root.id, root.id));
    }

    #[test]
    fn test_next_position_empty_group_starts_at_zero() {
        let root = category("Kurthis", "kurthis", None, 0);
        let all = vec![root.clone()];

        assert_eq!(CategoryMoveService::next_position(&all, Some(root.id)), 0);
        assert_eq!(CategoryMoveService::next_position(&all, None), 1);
    }

    #[tokio::test]
    async fn test_move_into_appends_after_existing_children() {
        let f = fixture();

        let outcome = f
            .service
            .apply_drag(
                f.dresses.id,
                DropTargetDto::MoveInto {
                    parent_id: f.kurthis.id,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::Applied(_)));
        let state = f.store.snapshot();
        let moved = find(&state, f.dresses.id);
        assert_eq!(moved.parent_id, Some(f.kurthis.id));
        assert_eq!(moved.position, 1);

        let children: Vec<Uuid> = CategoryMoveService::siblings(&state, Some(f.kurthis.id))
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(children, vec![f.silk_kurthis.id, f.dresses.id]);
    }

    #[tokio::test]
    async fn test_move_to_root_appends_to_root_group() {
        let f = fixture();

        f.service
            .apply_drag(f.silk_kurthis.id, DropTargetDto::MoveToRoot)
            .await
            .unwrap();

        let state = f.store.snapshot();
        let moved = find(&state, f.silk_kurthis.id);
        assert_eq!(moved.parent_id, None);
        assert_eq!(moved.position, 2);
        assert!(CategoryMoveService::siblings(&state, Some(f.kurthis.id)).is_empty());
    }

    #[tokio::test]
    async fn test_move_into_own_descendant_is_rejected() {
        let f = fixture();
        let before = f.store.snapshot();

        let result = f
            .service
            .apply_drag(
                f.kurthis.id,
                DropTargetDto::MoveInto {
                    parent_id: f.silk_kurthis.id,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(f.store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_self_parenting_is_rejected() {
        let f = fixture();
        let before = f.store.snapshot();

        let result = f
            .service
            .apply_drag(
                f.kurthis.id,
                DropTargetDto::MoveInto {
                    parent_id: f.kurthis.id,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(f.store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_reorder_swaps_siblings_and_keeps_total_order() {
        let f = fixture();

        f.service
            .apply_drag(
                f.dresses.id,
                DropTargetDto::Reorder {
                    over_id: f.kurthis.id,
                },
            )
            .await
            .unwrap();

        let state = f.store.snapshot();
        let roots = CategoryMoveService::siblings(&state, None);
        let ids: Vec<Uuid> = roots.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![f.dresses.id, f.kurthis.id]);

        let positions: Vec<i32> = roots.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1]);
        let unique: HashSet<i32> = positions.iter().copied().collect();
        assert_eq!(unique.len(), positions.len());
    }

    #[tokio::test]
    async fn test_reorder_preserves_sibling_membership() {
        let f = fixture();
        let before: HashSet<Uuid> = CategoryMoveService::siblings(&f.store.snapshot(), None)
            .iter()
            .map(|c| c.id)
            .collect();

        f.service
            .apply_drag(
                f.dresses.id,
                DropTargetDto::Reorder {
                    over_id: f.kurthis.id,
                },
            )
            .await
            .unwrap();

        let after: HashSet<Uuid> = CategoryMoveService::siblings(&f.store.snapshot(), None)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_reorder_onto_self_is_noop() {
        let f = fixture();
        let before = f.store.snapshot();

        let outcome = f
            .service
            .apply_drag(
                f.kurthis.id,
                DropTargetDto::Reorder {
                    over_id: f.kurthis.id,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::NoOp));
        assert_eq!(f.store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_reorder_across_levels_is_noop() {
        let f = fixture();
        let before = f.store.snapshot();

        let outcome = f
            .service
            .apply_drag(
                f.silk_kurthis.id,
                DropTargetDto::Reorder {
                    over_id: f.dresses.id,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::NoOp));
        assert_eq!(f.store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_move_into_current_parent_is_noop() {
        let f = fixture();

        let outcome = f
            .service
            .apply_drag(
                f.silk_kurthis.id,
                DropTargetDto::MoveInto {
                    parent_id: f.kurthis.id,
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::NoOp));
    }

    #[tokio::test]
    async fn test_move_to_root_when_already_root_is_noop() {
        let f = fixture();

        let outcome = f
            .service
            .apply_drag(f.kurthis.id, DropTargetDto::MoveToRoot)
            .await
            .unwrap();

        assert!(matches!(outcome, MoveOutcome::NoOp));
    }

    #[tokio::test]
    async fn test_move_preserves_count_and_fields() {
        let f = fixture();
        let before = f.store.snapshot();

        f.service
            .apply_drag(
                f.dresses.id,
                DropTargetDto::MoveInto {
                    parent_id: f.kurthis.id,
                },
            )
            .await
            .unwrap();

        let after = f.store.snapshot();
        assert_eq!(after.len(), before.len());
        let moved = find(&after, f.dresses.id);
        assert_eq!(moved.name, f.dresses.name);
        assert_eq!(moved.slug, f.dresses.slug);
        assert_eq!(moved.is_active, f.dresses.is_active);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_state_unchanged() {
        let f = fixture();
        let before = f.store.snapshot();
        f.store.fail_next_write();

        let result = f
            .service
            .apply_drag(
                f.dresses.id,
                DropTargetDto::MoveInto {
                    parent_id: f.kurthis.id,
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(f.store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_unknown_dragged_category_is_not_found() {
        let f = fixture();

        let result = f
            .service
            .apply_drag(Uuid::new_v4(), DropTargetDto::MoveToRoot)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
