//! Shared model types: identifiers, pagination, filters and serde helpers.

pub mod calendar_date;
mod entity;
mod pagination;
mod query_params;
mod year_month;

pub use entity::{EntityId, EntityKind, EntityRef};
pub use pagination::{Page, PageRequest, SortInfo};
pub use query_params::{canonical_query, query_pairs, ListFilter};
pub use year_month::YearMonth;

use crate::errors::ValidationError;

/// Form-level validation run before a payload is sent to the API.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}
