//! Bills module - domain models and filters.

mod bills_model;

pub use bills_model::{installment_amount, Bill, BillFilter, NewBill, BILLS_DEFAULT_SORT};
