//! Per-entity query facades: cached reads and invalidating mutations.

use std::sync::Arc;

use finboard_api::services::{CreditCardResource, InvoiceResource};
use finboard_api::{
    ApiClient, ApiError, BillService, CategoryService, CreditCardService, CrudService,
    InvoiceService, Resource, UnifiedService,
};
use finboard_core::credit_cards::AvailableLimit;
use finboard_core::invoices::{Invoice, InvoicePayment};
use finboard_core::models::{EntityId, EntityKind, Page};
use finboard_core::unified::{DuplicateStrategy, ImportResult, UnifiedExport};
use log::info;

use crate::cache::QueryCache;
use crate::key::{Invalidation, QueryKey};
use crate::observer::QueryObserver;
use crate::rules::{invalidations_for, Mutation};

/// Cached access to one resource.
pub struct ResourceQueries<R: Resource> {
    cache: QueryCache,
    service: CrudService<R>,
}

impl<R: Resource> Clone for ResourceQueries<R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            service: self.service.clone(),
        }
    }
}

impl<R: Resource> ResourceQueries<R> {
    pub fn new(cache: QueryCache, service: CrudService<R>) -> Self {
        Self { cache, service }
    }

    pub fn service(&self) -> &CrudService<R> {
        &self.service
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Cache key of a list query, after the default sort is applied.
    pub fn list_key(filter: &R::Filter) -> QueryKey {
        QueryKey::list(R::KIND, &CrudService::<R>::effective_filter(filter))
    }

    pub fn record_key(id: EntityId) -> QueryKey {
        QueryKey::detail(R::KIND, id)
    }

    pub async fn list(&self, filter: &R::Filter) -> Result<Arc<Page<R::Record>>, ApiError> {
        let service = self.service.clone();
        let filter = filter.clone();
        self.cache
            .fetch(Self::list_key(&filter), move || {
                let service = service.clone();
                let filter = filter.clone();
                async move { service.get_all(&filter).await }
            })
            .await
    }

    pub fn watch_list(&self, filter: &R::Filter) -> QueryObserver<Page<R::Record>> {
        let service = self.service.clone();
        let filter = filter.clone();
        self.cache.observe(Self::list_key(&filter), move || {
            let service = service.clone();
            let filter = filter.clone();
            async move { service.get_all(&filter).await }
        })
    }

    pub async fn get(&self, id: EntityId) -> Result<Arc<R::Record>, ApiError> {
        let service = self.service.clone();
        self.cache
            .fetch(Self::record_key(id), move || {
                let service = service.clone();
                async move { service.get_by_id(id).await }
            })
            .await
    }

    pub fn watch(&self, id: EntityId) -> QueryObserver<R::Record> {
        let service = self.service.clone();
        self.cache.observe(Self::record_key(id), move || {
            let service = service.clone();
            async move { service.get_by_id(id).await }
        })
    }

    /// Runs `on_success` and then applies the invalidation rules, so
    /// observers never see the invalidation before the callback has run.
    fn settle<T>(
        &self,
        mutation: Mutation,
        id: Option<EntityId>,
        value: T,
        on_success: impl FnOnce(&T),
    ) -> T {
        on_success(&value);
        for target in invalidations_for(R::KIND, mutation, id) {
            self.cache.invalidate(&target);
        }
        value
    }

    pub async fn create(&self, payload: &R::Payload) -> Result<R::Record, ApiError> {
        self.create_with(payload, |_| {}).await
    }

    pub async fn create_with(
        &self,
        payload: &R::Payload,
        on_success: impl FnOnce(&R::Record),
    ) -> Result<R::Record, ApiError> {
        let record = self.service.create(payload).await?;
        let id = R::record_id(&record);
        Ok(self.settle(Mutation::Create, Some(id), record, on_success))
    }

    pub async fn update(&self, id: EntityId, payload: &R::Payload) -> Result<R::Record, ApiError> {
        self.update_with(id, payload, |_| {}).await
    }

    pub async fn update_with(
        &self,
        id: EntityId,
        payload: &R::Payload,
        on_success: impl FnOnce(&R::Record),
    ) -> Result<R::Record, ApiError> {
        let record = self.service.update(id, payload).await?;
        Ok(self.settle(Mutation::Update, Some(id), record, on_success))
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), ApiError> {
        self.delete_with(id, || {}).await
    }

    pub async fn delete_with(
        &self,
        id: EntityId,
        on_success: impl FnOnce(),
    ) -> Result<(), ApiError> {
        self.service.delete(id).await?;
        self.settle(Mutation::Delete, Some(id), (), |_| on_success());
        Ok(())
    }
}

pub type BillQueries = ResourceQueries<finboard_api::services::BillResource>;
pub type CategoryQueries = ResourceQueries<finboard_api::services::CategoryResource>;
pub type CreditCardQueries = ResourceQueries<CreditCardResource>;
pub type InvoiceQueries = ResourceQueries<InvoiceResource>;

impl ResourceQueries<CreditCardResource> {
    pub fn available_limit_key(id: EntityId) -> QueryKey {
        QueryKey::detail(EntityKind::CreditCardLimits, id)
    }

    pub async fn available_limit(&self, id: EntityId) -> Result<Arc<AvailableLimit>, ApiError> {
        let service = self.service.clone();
        self.cache
            .fetch(Self::available_limit_key(id), move || {
                let service = service.clone();
                async move { service.available_limit(id).await }
            })
            .await
    }

    pub fn watch_available_limit(&self, id: EntityId) -> QueryObserver<AvailableLimit> {
        let service = self.service.clone();
        self.cache.observe(Self::available_limit_key(id), move || {
            let service = service.clone();
            async move { service.available_limit(id).await }
        })
    }
}

impl ResourceQueries<InvoiceResource> {
    /// Registers a payment; invalidates like an invoice update.
    pub async fn pay(&self, id: EntityId, payment: &InvoicePayment) -> Result<Invoice, ApiError> {
        let invoice = self.service.pay(id, payment).await?;
        Ok(self.settle(Mutation::Update, Some(id), invoice, |_| {}))
    }
}

/// Every resource behind one shared cache.
#[derive(Clone)]
pub struct FinanceQueries {
    cache: QueryCache,
    pub bills: BillQueries,
    pub categories: CategoryQueries,
    pub credit_cards: CreditCardQueries,
    pub invoices: InvoiceQueries,
    unified: UnifiedService,
}

impl FinanceQueries {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self {
            bills: ResourceQueries::new(cache.clone(), BillService::new(client.clone())),
            categories: ResourceQueries::new(
                cache.clone(),
                CategoryService::new(client.clone()),
            ),
            credit_cards: ResourceQueries::new(
                cache.clone(),
                CreditCardService::new(client.clone()),
            ),
            invoices: ResourceQueries::new(cache.clone(), InvoiceService::new(client.clone())),
            unified: UnifiedService::new(client),
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Full export. Not cached: every call reads the server.
    pub async fn export_data(&self) -> Result<UnifiedExport, ApiError> {
        self.unified.export_data().await
    }

    /// Imports a backup and invalidates the whole cache.
    pub async fn import_data(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        strategy: DuplicateStrategy,
    ) -> Result<ImportResult, ApiError> {
        let result = self.unified.import_data(file_name, bytes, strategy).await?;
        let invalidated = self.cache.invalidate(&Invalidation::All);
        info!("Import finished, invalidated {} cached queries", invalidated);
        Ok(result)
    }
}
