//! Credit cards module - domain models and filters.

mod credit_cards_model;

pub use credit_cards_model::{
    AvailableLimit, CreditCard, CreditCardFilter, NewCreditCard, CREDIT_CARDS_DEFAULT_SORT,
};
