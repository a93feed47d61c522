//! Lookup collaborators consumed by the statement assembler.
//!
//! Each trait mirrors one upstream store. Implementations must report absence
//! of a required record as [`EeccError::NotFound`] and any other failure as
//! [`EeccError::Upstream`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::EeccError;
use crate::models::{
    Customer, CustomerType, ExchangeRate, FundPrice, Period, Portfolio, PortfolioHistory,
    Transaction,
};

#[async_trait]
pub trait CustomerSource: Send + Sync {
    async fn find_customer(&self, customer_id: &str) -> Result<Customer, EeccError>;
}

#[async_trait]
pub trait PortfolioSource: Send + Sync {
    async fn find_portfolio(
        &self,
        customer_id: &str,
        customer_type: CustomerType,
    ) -> Result<Portfolio, EeccError>;
}

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Latest snapshot taken inside `period`, if any
    async fn find_snapshot(
        &self,
        portfolio_id: &str,
        period: Period,
    ) -> Result<Option<PortfolioHistory>, EeccError>;
}

#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Rate for `at`, or the nearest earlier one
    async fn find_rate(&self, at: DateTime<Utc>) -> Result<ExchangeRate, EeccError>;
}

#[async_trait]
pub trait FundPriceSource: Send + Sync {
    /// Unit price for the fund series at `at`, or the nearest earlier one
    async fn find_price(
        &self,
        fund_id: &str,
        series: &str,
        at: DateTime<Utc>,
    ) -> Result<FundPrice, EeccError>;
}

#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Every BUY/SELL created in `[start, end]`, ordered by creation date.
    /// Paginated sources must drain all pages before returning.
    async fn find_transactions(
        &self,
        customer_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, EeccError>;
}

/// Everything the assembler needs, in one bound
pub trait StatementStore:
    CustomerSource
    + PortfolioSource
    + SnapshotSource
    + ExchangeRateSource
    + FundPriceSource
    + TransactionSource
{
}

impl<T> StatementStore for T where
    T: CustomerSource
        + PortfolioSource
        + SnapshotSource
        + ExchangeRateSource
        + FundPriceSource
        + TransactionSource
{
}
