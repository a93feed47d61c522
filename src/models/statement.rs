use rust_decimal::Decimal;
use serde::Serialize;

use super::customer::Customer;
use super::exchange::ExchangeRate;
use super::period::Period;
use super::portfolio::{Currency, Portfolio, PortfolioHistory};
use super::transaction::Transaction;

/// Profitability cell shown when a fund's return cannot be computed
pub const PROFITABILITY_UNAVAILABLE: &str = "N/D";

/// One row of the portfolio summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundResume {
    pub name: String,
    pub currency: Currency,
    /// Current balance of the fund
    pub saves: Decimal,
    /// Original cost of the position
    pub contribution: Decimal,
    /// Period return, e.g. `10.00%`, or `N/D`
    pub profitability: String,
}

/// Everything a statement run needs, gathered once and rendered once
#[derive(Debug, Clone)]
pub struct Statement {
    pub period: Period,
    pub customer: Customer,
    pub portfolio: Portfolio,
    pub current_snapshot: PortfolioHistory,
    pub prior_snapshot: Option<PortfolioHistory>,
    pub exchange_rate: ExchangeRate,
    pub transactions: Vec<Transaction>,
    pub resume: Vec<FundResume>,
}

impl Statement {
    pub fn year(&self) -> i32 {
        self.period.year()
    }

    pub fn month(&self) -> u32 {
        self.period.month()
    }
}
