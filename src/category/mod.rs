//! Categories that transactions are grouped by.

mod create;
mod db;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub(crate) use db::map_row_with_offset as map_category_row;
pub use db::{
    create_category, create_category_table, get_all_categories, get_categories_of_kind,
    seed_default_categories,
};
pub use domain::{Category, CategoryName, Color, DEFAULT_CATEGORIES, MAX_ORDER, NewCategory};
pub use list::list_categories_endpoint;
