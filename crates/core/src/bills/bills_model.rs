//! Bill domain models.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DISPLAY_DECIMAL_PRECISION, MAX_INSTALLMENTS};
use crate::errors::ValidationError;
use crate::models::{calendar_date, EntityId, EntityRef, ListFilter, PageRequest, Validate};

/// Default sort order for bill lists.
pub const BILLS_DEFAULT_SORT: &str = "executionDate,desc";

fn one_installment() -> u32 {
    1
}

fn installment_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = u32::deserialize(deserializer)?;
    if count > MAX_INSTALLMENTS {
        return Err(serde::de::Error::custom(format!(
            "numberOfInstallments {} exceeds {}",
            count, MAX_INSTALLMENTS
        )));
    }
    Ok(count)
}

/// A bill as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "calendar_date")]
    pub execution_date: NaiveDate,
    pub total_amount: Decimal,
    #[serde(default = "one_installment", deserialize_with = "installment_count")]
    pub number_of_installments: u32,
    #[serde(default)]
    pub category: Option<EntityRef>,
    #[serde(default)]
    pub credit_card: Option<EntityRef>,
    #[serde(default, alias = "isRecurring")]
    pub recurring: bool,
}

impl Bill {
    /// Amount of a single installment, rounded half away from zero to cents.
    ///
    /// This is the display value. It can differ by a cent from
    /// `total / installments` computed with more precision; see
    /// [`installment_schedule`](Self::installment_schedule) for amounts that
    /// add up to the total.
    pub fn installment_amount(&self) -> Decimal {
        installment_amount(self.total_amount, self.number_of_installments)
    }

    /// Splits the total into cent-rounded installments. Every installment
    /// equals [`installment_amount`](Self::installment_amount) except the last,
    /// which absorbs the rounding remainder so the sum is exactly the total.
    pub fn installment_schedule(&self) -> Vec<Decimal> {
        let count = self.number_of_installments.clamp(1, MAX_INSTALLMENTS);
        let regular = installment_amount(self.total_amount, count);
        let mut schedule = vec![regular; count as usize];
        let last = regular
            .checked_mul(Decimal::from(count - 1))
            .and_then(|paid| self.total_amount.checked_sub(paid))
            .unwrap_or(regular);
        if let Some(slot) = schedule.last_mut() {
            *slot = last;
        }
        schedule
    }

    pub fn is_installment_purchase(&self) -> bool {
        self.number_of_installments > 1
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn credit_card_name(&self) -> Option<&str> {
        self.credit_card.as_ref().and_then(|c| c.name.as_deref())
    }
}

/// `total / installments`, rounded half away from zero to display precision.
pub fn installment_amount(total: Decimal, installments: u32) -> Decimal {
    let count = Decimal::from(installments.max(1));
    (total / count).round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Payload for creating or updating a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "calendar_date")]
    pub execution_date: NaiveDate,
    pub total_amount: Decimal,
    pub number_of_installments: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<EntityId>,
    #[serde(default)]
    pub recurring: bool,
}

impl NewBill {
    pub fn new(name: impl Into<String>, execution_date: NaiveDate, total_amount: Decimal) -> Self {
        Self {
            name: name.into(),
            description: None,
            execution_date,
            total_amount,
            number_of_installments: 1,
            category_id: None,
            credit_card_id: None,
            recurring: false,
        }
    }
}

impl Validate for NewBill {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(ValidationError::out_of_range(
                "totalAmount",
                "must be greater than zero",
            ));
        }
        if self.number_of_installments < 1 {
            return Err(ValidationError::out_of_range(
                "numberOfInstallments",
                "must be at least 1",
            ));
        }
        if self.number_of_installments > MAX_INSTALLMENTS {
            return Err(ValidationError::out_of_range(
                "numberOfInstallments",
                format!("must be at most {}", MAX_INSTALLMENTS),
            ));
        }
        Ok(())
    }
}

impl From<&Bill> for NewBill {
    fn from(bill: &Bill) -> Self {
        Self {
            name: bill.name.clone(),
            description: bill.description.clone(),
            execution_date: bill.execution_date,
            total_amount: bill.total_amount,
            number_of_installments: bill.number_of_installments,
            category_id: bill.category.as_ref().map(|c| c.id),
            credit_card_id: bill.credit_card.as_ref().map(|c| c.id),
            recurring: bill.recurring,
        }
    }
}

/// Filters for the bill list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillFilter {
    /// Name substring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_installments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<bool>,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl BillFilter {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.trim().is_empty() {
            None
        } else {
            Some(name)
        };
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn with_category(mut self, category_id: EntityId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_credit_card(mut self, credit_card_id: EntityId) -> Self {
        self.credit_card_id = Some(credit_card_id);
        self
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

impl ListFilter for BillFilter {
    fn page_request(&self) -> &PageRequest {
        &self.page
    }

    fn page_request_mut(&mut self) -> &mut PageRequest {
        &mut self.page
    }
}
