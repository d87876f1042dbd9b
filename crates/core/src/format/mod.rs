//! Locale formatting for amounts and dates.

mod currency;
mod dates;

pub use currency::{format_currency, format_currency_input, parse_currency, round_for_display};
pub use dates::{
    format_date, format_date_input, format_date_str, format_month_reference, parse_date_input,
};
