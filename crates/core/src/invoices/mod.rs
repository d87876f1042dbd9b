//! Invoices module - domain models, status derivation and filters.

mod invoices_model;

pub use invoices_model::{
    Invoice, InvoiceFilter, InvoicePayment, InvoiceStatus, NewInvoice, INVOICES_DEFAULT_SORT,
};
