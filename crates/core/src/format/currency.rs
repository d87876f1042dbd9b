//! Currency formatting for the pt-BR display locale.
//!
//! Amounts are `Decimal`, so rounding happens on the exact decimal value and
//! not on a binary approximation: `10.995` always rounds up to `11,00`.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{
    CURRENCY_SPACING, CURRENCY_SYMBOL, DECIMAL_SEPARATOR, DISPLAY_DECIMAL_PRECISION,
    THOUSANDS_SEPARATOR,
};

/// Formats an amount as currency, e.g. `R$ 1.234,56` or `-R$ 1.234,56`.
pub fn format_currency(amount: Decimal) -> String {
    let (negative, digits) = grouped_parts(amount);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL}{CURRENCY_SPACING}{digits}")
}

/// Formats an amount for an editable input: same as [`format_currency`]
/// without the currency symbol, e.g. `1.234,56`.
pub fn format_currency_input(amount: Decimal) -> String {
    let (negative, digits) = grouped_parts(amount);
    if negative {
        format!("-{digits}")
    } else {
        digits
    }
}

/// Parses a localized currency string back into an amount.
///
/// The symbol and all whitespace are ignored, `.` is treated as the thousands
/// separator and `,` as the decimal separator. Anything that does not parse
/// yields zero.
pub fn parse_currency(text: &str) -> Decimal {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = compact
        .replace(CURRENCY_SYMBOL, "")
        .replace(THOUSANDS_SEPARATOR, "")
        .replace(DECIMAL_SEPARATOR, ".");

    if normalized.is_empty() || normalized.contains('_') {
        return Decimal::ZERO;
    }

    Decimal::from_str(&normalized).unwrap_or(Decimal::ZERO)
}

/// Rounds an amount to display precision (half away from zero).
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        DISPLAY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Returns the sign and the grouped absolute value (`1.234,56`).
fn grouped_parts(amount: Decimal) -> (bool, String) {
    let rounded = round_for_display(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let plain = format!("{:.2}", rounded.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(ch);
    }

    (negative, format!("{grouped}{DECIMAL_SEPARATOR}{fraction}"))
}
