// Reports module - statement assembly and the calculators behind it

pub mod assembler;
pub mod currency;
pub mod distribution;
pub mod profitability;

pub use assembler::assemble;
pub use currency::{CurrencyNormalizer, DataQualityIssue};
pub use distribution::{by_currency, by_fund, Share};
pub use profitability::{format_return, period_return};
