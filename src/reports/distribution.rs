use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::currency::CurrencyNormalizer;
use crate::models::{Currency, Holdings};

/// A labelled percentage, in chart legend order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub value: Decimal,
}

impl Share {
    fn new(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// `part` as a percentage of `total`, rounded to two places.
/// A zero total (nothing held, or balances that cancel out) gives 0.
fn percentage(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

/// Share of each currency in the USD-normalized total, excluding cash.
///
/// USD and PEN are always present; other currencies appear only when held.
/// Order is first occurrence in the portfolio, with missing USD/PEN appended.
pub fn by_currency(holdings: &Holdings, normalizer: &CurrencyNormalizer) -> Vec<Share> {
    let mut totals: Vec<(Currency, Decimal)> = Vec::new();
    for fund in holdings.invested_funds() {
        let currency = &fund.balance.currency;
        let usd = normalizer.to_usd(fund.balance.amount, currency);
        match totals.iter_mut().find(|(c, _)| c == currency) {
            Some((_, total)) => *total += usd,
            None => totals.push((currency.clone(), usd)),
        }
    }

    let grand_total: Decimal = totals.iter().map(|(_, v)| *v).sum();

    let mut shares: Vec<Share> = totals
        .iter()
        .map(|(currency, usd)| Share::new(currency.code(), percentage(*usd, grand_total)))
        .collect();

    for required in [Currency::Usd, Currency::Pen] {
        if !shares.iter().any(|s| s.label == required.code()) {
            shares.push(Share::new(required.code(), Decimal::ZERO));
        }
    }

    shares
}

/// Share of each non-cash fund in the USD-normalized total, in portfolio order
pub fn by_fund(holdings: &Holdings, normalizer: &CurrencyNormalizer) -> Vec<Share> {
    let normalized: Vec<(&str, Decimal)> = holdings
        .invested_funds()
        .map(|fund| {
            (
                fund.label(),
                normalizer.to_usd(fund.balance.amount, &fund.balance.currency),
            )
        })
        .collect();

    let total: Decimal = normalized.iter().map(|(_, v)| *v).sum();

    normalized
        .into_iter()
        .map(|(label, usd)| Share::new(label, percentage(usd, total)))
        .collect()
}
