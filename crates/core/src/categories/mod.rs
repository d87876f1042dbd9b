//! Categories module - domain models and filters.

mod categories_model;

pub use categories_model::{Category, CategoryFilter, NewCategory, CATEGORIES_DEFAULT_SORT};
