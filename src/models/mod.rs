// Domain records read from the upstream stores

pub mod customer;
pub mod exchange;
pub mod period;
pub mod portfolio;
pub mod statement;
pub mod transaction;

pub use customer::{Customer, CustomerType, IdentityDocument};
pub use exchange::{ExchangeRate, FundPrice, RateLeg};
pub use period::Period;
pub use portfolio::{
    Balance, Currency, Fund, FundBalance, Holdings, Portfolio, PortfolioHistory, PortfolioStatus,
    CASH_FUND_ID,
};
pub use statement::{FundResume, Statement, PROFITABILITY_UNAVAILABLE};
pub use transaction::{Transaction, TransactionKind, TransactionStatus, TransactionType};
