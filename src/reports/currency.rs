use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Currency, ExchangeRate};

/// A condition the calculators recovered from with a fallback value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityIssue {
    pub message: String,
}

/// Converts fund balances to USD using the single rate of the reporting period
#[derive(Debug, Clone)]
pub struct CurrencyNormalizer {
    pen_per_usd: Decimal,
    issue: Option<DataQualityIssue>,
}

impl CurrencyNormalizer {
    /// Resolve the PEN-per-USD rate from the buy leg. A buy leg quoted in
    /// anything but PEN means the rate is already in USD terms (rate 1). A
    /// zero, negative or missing amount falls back to 1 and is flagged.
    pub fn new(rate: &ExchangeRate) -> Self {
        match &rate.buy {
            Some(leg) if leg.currency == Currency::Pen => Self::with_rate(leg.amount).dated(rate),
            Some(_) => Self {
                pen_per_usd: Decimal::ONE,
                issue: None,
            },
            None => Self::degraded(format!(
                "exchange rate for {} has no buy leg, using 1",
                rate.formatted_date
            )),
        }
    }

    /// Normalizer with an explicit PEN-per-USD rate
    pub fn with_rate(pen_per_usd: Decimal) -> Self {
        if pen_per_usd > Decimal::ZERO {
            Self {
                pen_per_usd,
                issue: None,
            }
        } else {
            Self::degraded(format!("non-positive exchange rate {}, using 1", pen_per_usd))
        }
    }

    fn dated(mut self, rate: &ExchangeRate) -> Self {
        if let Some(issue) = self.issue.as_mut() {
            issue.message = format!("exchange rate for {}: {}", rate.formatted_date, issue.message);
        }
        self
    }

    fn degraded(message: String) -> Self {
        warn!("{}", message);
        Self {
            pen_per_usd: Decimal::ONE,
            issue: Some(DataQualityIssue { message }),
        }
    }

    pub fn pen_per_usd(&self) -> Decimal {
        self.pen_per_usd
    }

    /// Set when the rate fell back to 1
    pub fn issue(&self) -> Option<&DataQualityIssue> {
        self.issue.as_ref()
    }

    /// USD-equivalent of `amount`. Currencies other than PEN pass through.
    /// A PEN amount too large to divide by the rate is kept as is.
    pub fn to_usd(&self, amount: Decimal, currency: &Currency) -> Decimal {
        match currency {
            Currency::Pen => amount.checked_div(self.pen_per_usd).unwrap_or_else(|| {
                warn!(
                    "PEN amount {} overflows at rate {}, using 1",
                    amount, self.pen_per_usd
                );
                amount
            }),
            Currency::Usd | Currency::Other(_) => amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateLeg;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn rate(buy: Option<RateLeg>) -> ExchangeRate {
        ExchangeRate {
            date: Utc.with_ymd_and_hms(2025, 10, 31, 0, 0, 0).unwrap(),
            formatted_date: "2025-10-31".to_string(),
            buy,
            sell: None,
        }
    }

    fn pen_leg(amount: Decimal) -> Option<RateLeg> {
        Some(RateLeg {
            amount,
            currency: Currency::Pen,
        })
    }

    #[test]
    fn test_usd_is_unchanged_for_any_rate() {
        for r in [dec!(3.53), dec!(0), dec!(-1), dec!(1)] {
            let normalizer = CurrencyNormalizer::new(&rate(pen_leg(r)));
            assert_eq!(normalizer.to_usd(dec!(1234.56), &Currency::Usd), dec!(1234.56));
        }
    }

    #[test]
    fn test_pen_is_divided_by_rate() {
        let normalizer = CurrencyNormalizer::new(&rate(pen_leg(dec!(3.53))));
        assert_eq!(normalizer.to_usd(dec!(3530), &Currency::Pen), dec!(1000));
        assert!(normalizer.issue().is_none());
    }

    #[test]
    fn test_zero_rate_falls_back_to_one_and_flags() {
        let normalizer = CurrencyNormalizer::new(&rate(pen_leg(dec!(0))));
        assert_eq!(normalizer.to_usd(dec!(3530), &Currency::Pen), dec!(3530));
        let issue = normalizer.issue().unwrap();
        assert!(issue.message.contains("2025-10-31"));
        assert!(issue.message.contains("non-positive"));
    }

    #[test]
    fn test_missing_buy_leg_falls_back_to_one() {
        let normalizer = CurrencyNormalizer::new(&rate(None));
        assert_eq!(normalizer.pen_per_usd(), Decimal::ONE);
        assert!(normalizer.issue().is_some());
    }

    #[test]
    fn test_buy_leg_in_usd_means_rate_one() {
        let normalizer = CurrencyNormalizer::new(&rate(Some(RateLeg {
            amount: dec!(0.28),
            currency: Currency::Usd,
        })));
        assert_eq!(normalizer.to_usd(dec!(100), &Currency::Pen), dec!(100));
        assert!(normalizer.issue().is_none());
    }

    #[test]
    fn test_other_currencies_pass_through() {
        let normalizer = CurrencyNormalizer::with_rate(dec!(3.7));
        let eur = Currency::Other("EUR".to_string());
        assert_eq!(normalizer.to_usd(dec!(42), &eur), dec!(42));
    }

    #[test]
    fn test_overflowing_pen_amount_is_kept() {
        let normalizer = CurrencyNormalizer::new(&rate(pen_leg(dec!(0.0000000001))));
        assert!(normalizer.issue().is_none());
        assert_eq!(normalizer.to_usd(Decimal::MAX, &Currency::Pen), Decimal::MAX);
        assert_eq!(normalizer.to_usd(dec!(1), &Currency::Pen), dec!(10000000000));
    }
}
