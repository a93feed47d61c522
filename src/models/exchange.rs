use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::portfolio::Currency;

/// One leg of the official rate: how many units of `currency` per USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLeg {
    pub amount: Decimal,
    pub currency: Currency,
}

/// Official USD/PEN exchange rate for a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub formatted_date: String,
    #[serde(default)]
    pub buy: Option<RateLeg>,
    #[serde(default)]
    pub sell: Option<RateLeg>,
}

/// Unit price of a fund series on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundPrice {
    pub id: String,
    #[serde(default)]
    pub series: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub price: Decimal,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_update: Option<DateTime<Utc>>,
}

impl FundPrice {
    /// Storage key combining fund id and series
    pub fn key(fund_id: &str, series: &str) -> String {
        format!("{}|{}", fund_id, series)
    }
}
