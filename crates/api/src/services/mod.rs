//! Per-entity resource services.
//!
//! Every entity shares the same CRUD surface, implemented once in
//! [`CrudService`] and parameterized by a [`Resource`] descriptor.
//! Entity-specific endpoints live in the entity's own module as extra
//! methods on its service.

mod bills;
mod categories;
mod credit_cards;
mod invoices;
mod unified;

use std::marker::PhantomData;

use finboard_core::models::{query_pairs, EntityId, EntityKind, ListFilter, Page};
use finboard_core::Validate;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Result;

pub use bills::{BillResource, BillService};
pub use categories::{CategoryResource, CategoryService};
pub use credit_cards::{CreditCardResource, CreditCardService};
pub use invoices::{InvoiceResource, InvoiceService};
pub use unified::UnifiedService;

/// Describes one REST resource: its record, payload and filter types and
/// where it lives.
pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;
    type Payload: Serialize + Validate + Send + Sync;
    type Filter: ListFilter + Default;

    const KIND: EntityKind;
    /// Collection path below the base URL, e.g. `/bills`.
    const PATH: &'static str;
    /// Sort applied when a list filter has none.
    const DEFAULT_SORT: &'static str;
    /// Singular display name used in not-found errors.
    const NAME: &'static str;

    fn record_id(record: &Self::Record) -> EntityId;
}

/// CRUD operations for a [`Resource`].
pub struct CrudService<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for CrudService<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> std::fmt::Debug for CrudService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudService")
            .field("resource", &R::PATH)
            .finish()
    }
}

impl<R: Resource> CrudService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn record_path(id: EntityId) -> String {
        format!("{}/{}", R::PATH, id)
    }

    /// The filter as sent on the wire: default sort filled in.
    pub fn effective_filter(filter: &R::Filter) -> R::Filter {
        let mut filter = filter.clone();
        let page = filter.page_request_mut();
        *page = page.clone().sorted_or(R::DEFAULT_SORT);
        filter
    }

    /// GET {path}?{filter}
    pub async fn get_all(&self, filter: &R::Filter) -> Result<Page<R::Record>> {
        let query = query_pairs(&Self::effective_filter(filter));
        debug!("Listing {} with {:?}", R::KIND, query);
        self.client.get(R::PATH, query).await
    }

    /// GET {path}/{id}. A 404 becomes [`ApiError::NotFound`](crate::ApiError::NotFound).
    pub async fn get_by_id(&self, id: EntityId) -> Result<R::Record> {
        self.client
            .get(&Self::record_path(id), Vec::new())
            .await
            .map_err(|e| e.for_record(R::NAME, id))
    }

    /// POST {path}. The payload is validated before any request is sent.
    pub async fn create(&self, payload: &R::Payload) -> Result<R::Record> {
        payload.validate()?;
        self.client.post(R::PATH, payload).await
    }

    /// PUT {path}/{id}. The payload is validated before any request is sent.
    pub async fn update(&self, id: EntityId, payload: &R::Payload) -> Result<R::Record> {
        payload.validate()?;
        self.client
            .put(&Self::record_path(id), payload)
            .await
            .map_err(|e| e.for_record(R::NAME, id))
    }

    /// DELETE {path}/{id}
    pub async fn delete(&self, id: EntityId) -> Result<()> {
        self.client
            .delete(&Self::record_path(id))
            .await
            .map_err(|e| e.for_record(R::NAME, id))
    }
}
