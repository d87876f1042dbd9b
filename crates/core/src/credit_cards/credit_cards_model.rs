//! Credit card domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::models::{EntityId, ListFilter, PageRequest, Validate};

/// Default sort order for credit card lists.
pub const CREDIT_CARDS_DEFAULT_SORT: &str = "name,asc";

/// A credit card as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: EntityId,
    pub name: String,
    #[serde(alias = "limit")]
    pub credit_limit: Decimal,
    /// Day of month the invoice closes (1–31).
    pub closing_day: u8,
    /// Day of month the invoice is due (1–31).
    pub due_day: u8,
    #[serde(default, alias = "partialPaymentAllowed")]
    pub allows_partial_payment: bool,
}

/// Payload for creating or updating a credit card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCreditCard {
    pub name: String,
    pub credit_limit: Decimal,
    pub closing_day: u8,
    pub due_day: u8,
    #[serde(default)]
    pub allows_partial_payment: bool,
}

impl NewCreditCard {
    pub fn new(
        name: impl Into<String>,
        credit_limit: Decimal,
        closing_day: u8,
        due_day: u8,
    ) -> Self {
        Self {
            name: name.into(),
            credit_limit,
            closing_day,
            due_day,
            allows_partial_payment: false,
        }
    }
}

fn validate_day(field: &'static str, day: u8) -> Result<(), ValidationError> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(
            field,
            format!("{} is not between 1 and 31", day),
        ))
    }
}

impl Validate for NewCreditCard {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        if self.credit_limit <= Decimal::ZERO {
            return Err(ValidationError::out_of_range(
                "creditLimit",
                "must be greater than zero",
            ));
        }
        validate_day("closingDay", self.closing_day)?;
        validate_day("dueDay", self.due_day)?;
        Ok(())
    }
}

/// Limit usage of a credit card, served by a dedicated endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableLimit {
    pub credit_card_id: EntityId,
    pub credit_limit: Decimal,
    #[serde(default)]
    pub used_limit: Decimal,
    pub available_limit: Decimal,
}

impl AvailableLimit {
    /// Share of the limit in use, 0–100. Zero when the limit itself is zero.
    pub fn usage_percent(&self) -> Decimal {
        if self.credit_limit.is_zero() {
            return Decimal::ZERO;
        }
        let opposite_signs =
            self.used_limit.is_sign_negative() != self.credit_limit.is_sign_negative();
        match self.used_limit.checked_div(self.credit_limit) {
            Some(ratio) => ratio.saturating_mul(Decimal::ONE_HUNDRED).round_dp(2),
            None if opposite_signs => Decimal::MIN,
            None => Decimal::MAX,
        }
    }
}

/// Filters for the credit card list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub page: PageRequest,
}

impl ListFilter for CreditCardFilter {
    fn page_request(&self) -> &PageRequest {
        &self.page
    }

    fn page_request_mut(&mut self) -> &mut PageRequest {
        &mut self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_day_bounds() {
        assert!(NewCreditCard::new("Nubank", dec!(5000), 1, 31).validate().is_ok());

        let err = NewCreditCard::new("Nubank", dec!(5000), 0, 10)
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), "closingDay");

        let err = NewCreditCard::new("Nubank", dec!(5000), 3, 32)
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), "dueDay");
    }

    #[test]
    fn test_limit_must_be_positive() {
        let err = NewCreditCard::new("Inter", dec!(0), 5, 12)
            .validate()
            .unwrap_err();
        assert_eq!(err.field(), "creditLimit");
    }

    #[test]
    fn test_accepts_legacy_field_names() {
        let json = r#"{"id": 9, "name": "Visa", "limit": 3000, "closingDay": 5,
                       "dueDay": 12, "partialPaymentAllowed": true}"#;
        let card: CreditCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.credit_limit, dec!(3000));
        assert!(card.allows_partial_payment);
    }

    #[test]
    fn test_usage_percent() {
        let limit = AvailableLimit {
            credit_card_id: 1,
            credit_limit: dec!(2000),
            used_limit: dec!(500),
            available_limit: dec!(1500),
        };
        assert_eq!(limit.usage_percent(), dec!(25));
    }

    #[test]
    fn test_usage_percent_saturates() {
        let limit = AvailableLimit {
            credit_card_id: 1,
            credit_limit: dec!(0.0000000001),
            used_limit: Decimal::MAX,
            available_limit: Decimal::ZERO,
        };
        assert_eq!(limit.usage_percent(), Decimal::MAX);

        let zero = AvailableLimit {
            credit_limit: Decimal::ZERO,
            ..limit
        };
        assert_eq!(zero.usage_percent(), Decimal::ZERO);
    }
}
