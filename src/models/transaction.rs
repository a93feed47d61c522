use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::portfolio::Currency;
use crate::error::EeccError;

/// Transaction type tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
        }
    }

    /// Movement label printed in the transactions table
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Buy => "Compra",
            TransactionType::Sell => "Venta",
        }
    }
}

impl FromStr for TransactionType {
    type Err = EeccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            other => Err(EeccError::Upstream(format!(
                "unknown transaction type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    OnHold,
    Requested,
    Confirmed,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SellSubType {
    Total,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankReference {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub id: String,
    #[serde(default)]
    pub transaction: Option<BankReference>,
}

/// Origin of a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransfer {
    pub bank: Bank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
}

/// Destination of a redemption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account: AccountRef,
}

/// Variant payload keyed by the transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy {
        #[serde(default)]
        origin: Option<BankTransfer>,
    },
    Sell {
        #[serde(default, rename = "destiny")]
        destination: Option<Account>,
        #[serde(default, rename = "subType")]
        sub_type: Option<SellSubType>,
    },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Buy { .. } => TransactionType::Buy,
            TransactionKind::Sell { .. } => TransactionType::Sell,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRef {
    pub id: String,
    #[serde(default)]
    pub series: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRef {
    pub id: String,
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// A purchase or redemption order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub customer: CustomerRef,
    pub fund: FundRef,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    #[serde(default)]
    pub currency: Option<Currency>,
    pub amount: Decimal,
    #[serde(default)]
    pub shares: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub taxes: Option<Decimal>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub creation_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub price_date: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub settlement_date: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub transaction_date: DateTime<Utc>,
}

impl Transaction {
    /// Build a transaction from a stored record. The `type` tag selects the
    /// variant; an unknown tag is rejected.
    pub fn from_record(record: serde_json::Value) -> Result<Self, EeccError> {
        let tag = record
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| EeccError::Upstream("transaction without type".to_string()))?;
        TransactionType::from_str(tag)?;
        Ok(serde_json::from_value(record)?)
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// Fund id followed by its series
    pub fn fund_label(&self) -> String {
        if self.fund.series.is_empty() {
            self.fund.id.clone()
        } else {
            format!("{} {}", self.fund.id, self.fund.series)
        }
    }
}
