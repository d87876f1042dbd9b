//! Finboard Core - domain models, formatting, debouncing and export.
//!
//! This crate holds the client-side representation of the finance API's
//! resources together with the pure utilities built around them. It does
//! no I/O beyond writing export files; HTTP access lives in `finboard-api`
//! and caching in `finboard-query`.

pub mod bills;
pub mod categories;
pub mod constants;
pub mod credit_cards;
pub mod debounce;
pub mod errors;
pub mod export;
pub mod format;
pub mod invoices;
pub mod models;
pub mod unified;

pub use models::Validate;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
