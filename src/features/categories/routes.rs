use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::categories::handlers::{self, admin_category_handler, AdminCategoryState};
use crate::features::categories::services::{CategoryMoveService, CategoryService};

/// Create routes for the storefront side of the categories feature
///
/// Note: These routes are public (no authentication required)
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/tree", get(handlers::get_category_tree))
        .route("/api/categories/{slug}", get(handlers::get_category))
        .with_state(service)
}

/// Create routes for the admin dashboard side of the categories feature
pub fn admin_routes(
    category_service: Arc<CategoryService>,
    move_service: Arc<CategoryMoveService>,
) -> Router {
    let state = AdminCategoryState {
        category_service,
        move_service,
    };

    Router::new()
        .route(
            "/api/admin/categories",
            get(admin_category_handler::list_categories)
                .post(admin_category_handler::create_category),
        )
        .route(
            "/api/admin/categories/{id}",
            put(admin_category_handler::update_category)
                .delete(admin_category_handler::delete_category),
        )
        .route(
            "/api/admin/categories/move",
            post(admin_category_handler::move_category),
        )
        .with_state(state)
}
