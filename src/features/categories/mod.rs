//! Catalog category tree feature.
//!
//! Categories form a forest linked by `parent_id`, with sibling ordering
//! maintained through an integer `position` per group. The storefront reads
//! the tree; the admin dashboard manages it, including drag-and-drop
//! reordering and re-parenting with cycle prevention.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List active categories (flat) |
//! | GET | `/api/categories/tree` | Active categories as a nested tree |
//! | GET | `/api/categories/{slug}` | Get active category by slug |
//! | GET | `/api/admin/categories` | Paginated list, inactive included |
//! | POST | `/api/admin/categories` | Create category |
//! | PUT | `/api/admin/categories/{id}` | Update editable fields |
//! | DELETE | `/api/admin/categories/{id}` | Delete with cascade to descendants |
//! | POST | `/api/admin/categories/move` | Apply a drag-and-drop move |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{CategoryMoveService, CategoryService, PgCategoryStore};
