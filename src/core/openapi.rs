use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories (public)
        categories_handlers::category_handler::list_categories,
        categories_handlers::category_handler::get_category_tree,
        categories_handlers::category_handler::get_category,
        // Categories (admin)
        categories_handlers::admin_category_handler::list_categories,
        categories_handlers::admin_category_handler::create_category,
        categories_handlers::admin_category_handler::update_category,
        categories_handlers::admin_category_handler::delete_category,
        categories_handlers::admin_category_handler::move_category,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::MoveCategoryDto,
            categories_dtos::DropTargetDto,
            categories_dtos::DeleteCategoryResponseDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<categories_dtos::DeleteCategoryResponseDto>,
        )
    ),
    tags(
        (name = "categories", description = "Storefront category tree (public)"),
        (name = "admin-categories", description = "Category management for the admin dashboard"),
    ),
    info(
        title = "Vastra Catalog API",
        version = "0.1.0",
        description = "Catalog category API for the Vastra storefront",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
