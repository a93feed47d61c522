//! Utility functions for formatting and common operations
//!
//! Numbers follow the `es-PE` locale used on the statement: `,` groups
//! thousands and `.` separates decimals.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Currency;

/// America/Lima is UTC-5 all year
const LIMA_UTC_OFFSET_HOURS: i64 = -5;

/// Core formatting function with full control over output.
///
/// Rounds half away from zero to `max_frac` digits, then drops trailing
/// zeros down to `min_frac` digits.
///
/// # Examples
/// ```
/// use eecc::utils::format_number;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_number(dec!(1234.5), 2, 2), "1,234.50");
/// assert_eq!(format_number(dec!(52.356), 2, 8), "52.356");
/// assert_eq!(format_number(dec!(-1000000), 0, 0), "-1,000,000");
/// ```
pub fn format_number(value: Decimal, min_frac: u32, max_frac: u32) -> String {
    let max_frac = max_frac.max(min_frac);
    let rounded = value.round_dp_with_strategy(max_frac, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.*}", max_frac as usize, rounded.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, dec),
        None => (formatted.as_str(), ""),
    };

    let mut decimals = decimal_part.to_string();
    while decimals.len() > min_frac as usize && decimals.ends_with('0') {
        decimals.pop();
    }

    // Add thousands separators (,) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    if decimals.is_empty() {
        format!("{}{}", sign, with_separators)
    } else {
        format!("{}{}.{}", sign, with_separators, decimals)
    }
}

// ============ Convenience functions ============

/// Monetary amount with exactly two decimals: "1,234.56"
pub fn format_amount(value: Decimal) -> String {
    format_number(value, 2, 2)
}

/// Share counts and unit prices: two to eight decimals
///
/// # Examples
/// ```
/// use eecc::utils::format_shares;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_shares(dec!(100)), "100.00");
/// assert_eq!(format_shares(dec!(0.123456789)), "0.12345679");
/// ```
pub fn format_shares(value: Decimal) -> String {
    format_number(value, 2, 8)
}

/// Amount prefixed with the currency symbol, right-aligned to `width`
pub fn format_money_with_width(value: Decimal, currency: &Currency, width: usize) -> String {
    let result = format!("{} {}", currency.symbol(), format_amount(value));
    if width > 0 && result.chars().count() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

pub fn format_money(value: Decimal, currency: &Currency) -> String {
    format_money_with_width(value, currency, 0)
}

/// Percentage with two decimals, e.g. `50.00%`
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_number(value, 2, 2))
}

/// Calendar date in Lima time, `dd/mm/yyyy`
pub fn format_date(instant: DateTime<Utc>) -> String {
    (instant + Duration::hours(LIMA_UTC_OFFSET_HOURS))
        .date_naive()
        .format("%d/%m/%Y")
        .to_string()
}
