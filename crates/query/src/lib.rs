//! Finboard Query - cached, de-duplicated reads and invalidating mutations
//! over the Finboard API services.
//!
//! The cache is an explicit object: create one [`QueryCache`] per
//! application (or per test) and hand it to [`FinanceQueries`].

mod cache;
mod config;
mod key;
mod observer;
mod resources;
mod rules;
mod state;

pub use cache::{CacheStats, QueryCache};
pub use config::{CacheConfig, DEFAULT_GC_TIME, DEFAULT_STALE_TIME};
pub use key::{Invalidation, KeyScope, QueryKey};
pub use observer::QueryObserver;
pub use resources::{
    BillQueries, CategoryQueries, CreditCardQueries, FinanceQueries, InvoiceQueries,
    ResourceQueries,
};
pub use rules::{dependents, invalidations_for, Mutation};
pub use state::{QueryState, QueryStatus};
