pub mod admin_category_handler;
pub mod category_handler;

pub use admin_category_handler::AdminCategoryState;
pub use category_handler::*;
