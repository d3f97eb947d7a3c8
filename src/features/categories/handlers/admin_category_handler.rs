use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, DeleteCategoryResponseDto, MoveCategoryDto,
    UpdateCategoryDto,
};
use crate::features::categories::services::{CategoryMoveService, CategoryService, MoveOutcome};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Shared state for the admin category handlers
#[derive(Clone)]
pub struct AdminCategoryState {
    pub category_service: Arc<CategoryService>,
    pub move_service: Arc<CategoryMoveService>,
}

/// List all categories for the admin dashboard, inactive included
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "admin-categories"
)]
pub async fn list_categories(
    State(state): State<AdminCategoryState>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let (categories, total) = state.category_service.list_admin(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Create a category
///
/// The new category is appended at the end of its sibling group (root group
/// when no parent is given).
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "admin-categories"
)]
pub async fn create_category(
    State(state): State<AdminCategoryState>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = state.category_service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// Update a category's editable fields
///
/// Parent and position are changed through the move endpoint, not here.
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "admin-categories"
)]
pub async fn update_category(
    State(state): State<AdminCategoryState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = state.category_service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated".to_string()),
        None,
    )))
}

/// Delete a category and all of its descendants
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeleteCategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-categories"
)]
pub async fn delete_category(
    State(state): State<AdminCategoryState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteCategoryResponseDto>>> {
    let deleted = state.category_service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteCategoryResponseDto { deleted }),
        Some("Category deleted".to_string()),
        None,
    )))
}

/// Apply a drag-and-drop move from the admin category tree
///
/// Classifies the drag-end event as a reorder within a sibling group, a
/// re-parent, or a no-op. Self-parenting and cyclic moves are rejected with a
/// validation error and leave the tree unchanged.
#[utoipa::path(
    post,
    path = "/api/admin/categories/move",
    request_body = MoveCategoryDto,
    responses(
        (status = 200, description = "Move applied (or no-op)", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 400, description = "Self-parenting or cyclic move"),
        (status = 404, description = "Category not found")
    ),
    tag = "admin-categories"
)]
pub async fn move_category(
    State(state): State<AdminCategoryState>,
    AppJson(dto): AppJson<MoveCategoryDto>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let outcome = state
        .move_service
        .apply_drag(dto.active_id, dto.target)
        .await?;

    match outcome {
        MoveOutcome::Applied(categories) => Ok(Json(ApiResponse::success(
            Some(categories),
            Some("Category moved".to_string()),
            None,
        ))),
        MoveOutcome::NoOp => Ok(Json(ApiResponse::success(
            None,
            Some("No changes".to_string()),
            None,
        ))),
    }
}
