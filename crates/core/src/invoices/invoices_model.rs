//! Invoice domain models and status derivation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credit_cards::CreditCard;
use crate::errors::ValidationError;
use crate::models::{EntityId, ListFilter, PageRequest, Validate, YearMonth};

/// Default sort order for invoice lists.
pub const INVOICES_DEFAULT_SORT: &str = "referenceMonth,desc";

/// Derived invoice status. Exactly one applies; `Paid` takes precedence over
/// `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Closed,
    Open,
}

impl InvoiceStatus {
    pub fn from_flags(paid: bool, closed: bool) -> Self {
        if paid {
            InvoiceStatus::Paid
        } else if closed {
            InvoiceStatus::Closed
        } else {
            InvoiceStatus::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Closed => "closed",
            InvoiceStatus::Open => "open",
        }
    }

    /// Localized label shown in tables and exports.
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "Paga",
            InvoiceStatus::Closed => "Fechada",
            InvoiceStatus::Open => "Aberta",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credit card invoice as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: EntityId,
    pub credit_card_id: EntityId,
    pub reference_month: YearMonth,
    pub total_amount: Decimal,
    #[serde(default)]
    pub previous_balance: Decimal,
    #[serde(default, alias = "isPaid")]
    pub paid: bool,
    #[serde(default, alias = "isClosed")]
    pub closed: bool,
}

impl Invoice {
    pub fn status(&self) -> InvoiceStatus {
        InvoiceStatus::from_flags(self.paid, self.closed)
    }

    /// Total owed on this invoice including the carried-over balance.
    pub fn amount_due(&self) -> Decimal {
        self.total_amount.saturating_add(self.previous_balance)
    }
}

/// Payload for creating or updating an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub credit_card_id: EntityId,
    pub reference_month: YearMonth,
    pub total_amount: Decimal,
    #[serde(default)]
    pub previous_balance: Decimal,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub closed: bool,
}

impl Validate for NewInvoice {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.total_amount < Decimal::ZERO {
            return Err(ValidationError::out_of_range(
                "totalAmount",
                "cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Payment registered against an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayment {
    pub amount: Decimal,
}

impl InvoicePayment {
    pub fn new(amount: Decimal) -> Self {
        Self { amount }
    }

    /// Checks the payment against the invoice and the card's payment policy.
    /// A payment below the amount due is only accepted when the card allows
    /// partial payments.
    pub fn validate_for(
        &self,
        invoice: &Invoice,
        card: &CreditCard,
    ) -> Result<(), ValidationError> {
        self.validate()?;
        if invoice.status() == InvoiceStatus::Paid {
            return Err(ValidationError::out_of_range(
                "amount",
                "invoice is already paid",
            ));
        }
        if self.amount < invoice.amount_due() && !card.allows_partial_payment {
            return Err(ValidationError::out_of_range(
                "amount",
                "partial payments are not allowed for this card",
            ));
        }
        Ok(())
    }
}

impl Validate for InvoicePayment {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::out_of_range(
                "amount",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Filters for the invoice list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_month: Option<YearMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl InvoiceFilter {
    pub fn for_card(credit_card_id: EntityId) -> Self {
        Self {
            credit_card_id: Some(credit_card_id),
            ..Default::default()
        }
    }
}

impl ListFilter for InvoiceFilter {
    fn page_request(&self) -> &PageRequest {
        &self.page
    }

    fn page_request_mut(&mut self) -> &mut PageRequest {
        &mut self.page
    }
}
