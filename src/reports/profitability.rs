use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::EeccError;

/// Period return between two unit prices, as a percentage
pub fn period_return(end_price: Decimal, start_price: Decimal) -> Result<Decimal, EeccError> {
    if start_price.is_zero() {
        return Err(EeccError::DataQuality(
            "start price is zero, return is undefined".to_string(),
        ));
    }
    Ok((end_price - start_price) / start_price * Decimal::ONE_HUNDRED)
}

/// Period return formatted with two decimals and a trailing `%`, e.g. `10.00%`
pub fn format_return(end_price: Decimal, start_price: Decimal) -> Result<String, EeccError> {
    let value = period_return(end_price, start_price)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!("{:.2}%", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_positive_return() {
        assert_eq!(format_return(dec!(110), dec!(100)).unwrap(), "10.00%");
    }

    #[test]
    fn test_negative_and_fractional_returns() {
        assert_eq!(format_return(dec!(95), dec!(100)).unwrap(), "-5.00%");
        assert_eq!(format_return(dec!(3.53), dec!(3.5)).unwrap(), "0.86%");
        assert_eq!(format_return(dec!(1), dec!(1)).unwrap(), "0.00%");
    }

    #[test]
    fn test_zero_start_price_is_an_error() {
        let err = format_return(dec!(110), dec!(0)).unwrap_err();
        assert!(matches!(err, EeccError::DataQuality(_)));
    }
}
