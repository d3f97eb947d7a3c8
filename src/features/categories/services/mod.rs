mod category_move_service;
mod category_service;
mod category_store;

pub use category_move_service::{CategoryMoveService, MoveOutcome};
pub use category_service::CategoryService;
pub use category_store::{CategoryStore, PgCategoryStore};
