//! Finboard API - HTTP client and resource services for the finance REST API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use finboard_api::{ApiClient, ApiConfig, BillService};
//! use finboard_core::bills::BillFilter;
//!
//! let client = ApiClient::new(ApiConfig::new("http://localhost:8080/api"))?;
//! let bills = BillService::new(client).get_all(&BillFilter::default()).await?;
//! ```

mod client;
mod config;
mod error;
pub mod mock;
pub mod services;
pub mod transport;

pub use client::{
    ApiClient, CredentialsProvider, NoopUnauthorizedHandler, StaticToken, UnauthorizedHandler,
};
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ApiError, Result, TransportCause, TransportError};
pub use services::{
    BillService, CategoryService, CreditCardService, CrudService, InvoiceService, Resource,
    UnifiedService,
};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
