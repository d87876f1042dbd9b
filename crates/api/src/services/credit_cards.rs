use finboard_core::credit_cards::{
    AvailableLimit, CreditCard, CreditCardFilter, NewCreditCard, CREDIT_CARDS_DEFAULT_SORT,
};
use finboard_core::models::{EntityId, EntityKind};

use super::{CrudService, Resource};
use crate::error::Result;

pub struct CreditCardResource;

impl Resource for CreditCardResource {
    type Record = CreditCard;
    type Payload = NewCreditCard;
    type Filter = CreditCardFilter;

    const KIND: EntityKind = EntityKind::CreditCards;
    const PATH: &'static str = "/credit-cards";
    const DEFAULT_SORT: &'static str = CREDIT_CARDS_DEFAULT_SORT;
    const NAME: &'static str = "Credit card";

    fn record_id(record: &CreditCard) -> EntityId {
        record.id
    }
}

pub type CreditCardService = CrudService<CreditCardResource>;

impl CrudService<CreditCardResource> {
    /// GET /credit-cards/{id}/available-limit
    pub async fn available_limit(&self, id: EntityId) -> Result<AvailableLimit> {
        self.client()
            .get(&format!("/credit-cards/{}/available-limit", id), Vec::new())
            .await
            .map_err(|e| e.for_record(CreditCardResource::NAME, id))
    }
}
