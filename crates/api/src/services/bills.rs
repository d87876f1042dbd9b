use finboard_core::bills::{Bill, BillFilter, NewBill, BILLS_DEFAULT_SORT};
use finboard_core::models::{EntityId, EntityKind};

use super::{CrudService, Resource};

pub struct BillResource;

impl Resource for BillResource {
    type Record = Bill;
    type Payload = NewBill;
    type Filter = BillFilter;

    const KIND: EntityKind = EntityKind::Bills;
    const PATH: &'static str = "/bills";
    const DEFAULT_SORT: &'static str = BILLS_DEFAULT_SORT;
    const NAME: &'static str = "Bill";

    fn record_id(record: &Bill) -> EntityId {
        record.id
    }
}

pub type BillService = CrudService<BillResource>;
