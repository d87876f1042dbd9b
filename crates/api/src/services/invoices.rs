use finboard_core::invoices::{
    Invoice, InvoiceFilter, InvoicePayment, NewInvoice, INVOICES_DEFAULT_SORT,
};
use finboard_core::models::{EntityId, EntityKind};
use finboard_core::Validate;

use super::{CrudService, Resource};
use crate::error::Result;

pub struct InvoiceResource;

impl Resource for InvoiceResource {
    type Record = Invoice;
    type Payload = NewInvoice;
    type Filter = InvoiceFilter;

    const KIND: EntityKind = EntityKind::Invoices;
    const PATH: &'static str = "/invoices";
    const DEFAULT_SORT: &'static str = INVOICES_DEFAULT_SORT;
    const NAME: &'static str = "Invoice";

    fn record_id(record: &Invoice) -> EntityId {
        record.id
    }
}

pub type InvoiceService = CrudService<InvoiceResource>;

impl CrudService<InvoiceResource> {
    /// POST /invoices/{id}/pay
    ///
    /// Only the amount is checked here; use
    /// [`InvoicePayment::validate_for`] first when the card is at hand.
    pub async fn pay(&self, id: EntityId, payment: &InvoicePayment) -> Result<Invoice> {
        payment.validate()?;
        self.client()
            .post(&format!("/invoices/{}/pay", id), payment)
            .await
            .map_err(|e| e.for_record(InvoiceResource::NAME, id))
    }
}
