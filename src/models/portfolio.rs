use chrono::{DateTime, Months, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::customer::CustomerType;

/// Pseudo-fund holding uninvested cash
pub const CASH_FUND_ID: &str = "cash";

/// Currency of a balance. Only USD and PEN have display rules; any other code
/// is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    Usd,
    Pen,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Pen => "PEN",
            Currency::Other(code) => code,
        }
    }

    /// Short symbol used in table cells
    pub fn symbol(&self) -> &str {
        match self {
            Currency::Usd => "$",
            Currency::Pen => "S/",
            Currency::Other(code) => code,
        }
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Currency::Usd,
            "PEN" => Currency::Pen,
            other => Currency::Other(other.to_string()),
        }
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Currency::from(code.to_string())
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundBalance {
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub shares: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Returns {
    pub realized: Decimal,
    #[serde(alias = "unRealized")]
    pub unrealized: Decimal,
}

/// A fund position inside a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    pub currency: Currency,
    pub balance: FundBalance,
    #[serde(default)]
    pub available_balance: Option<FundBalance>,
    #[serde(default)]
    pub cost_basis: Option<Decimal>,
    #[serde(default)]
    pub share_price: Option<Decimal>,
    #[serde(default)]
    pub returns: Option<Returns>,
}

impl Fund {
    pub fn is_cash(&self) -> bool {
        self.id == CASH_FUND_ID
    }

    /// Fund id followed by its series, e.g. `usa500USD SERIES_B`
    pub fn display_id(&self) -> String {
        match self.series.as_deref().filter(|s| !s.is_empty()) {
            Some(series) => format!("{} {}", self.id, series),
            None => self.id.clone(),
        }
    }

    /// Chart label: the fund name when present, else its id
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency: Currency,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortfolioStatus {
    Active,
    Deleted,
}

/// Funds and balances; shared by the live portfolio and its snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub id: String,
    #[serde(default)]
    pub funds: Vec<Fund>,
    #[serde(default)]
    pub balances: Vec<Balance>,
}

impl Holdings {
    /// Every fund except the cash pseudo-fund, in portfolio order
    pub fn invested_funds(&self) -> impl Iterator<Item = &Fund> {
        self.funds.iter().filter(|f| !f.is_cash())
    }
}

/// A customer's current portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub customer_id: String,
    pub customer_type: CustomerType,
    pub currency: Currency,
    #[serde(default)]
    pub funds: Vec<Fund>,
    #[serde(default)]
    pub balances: Vec<Balance>,
    pub status: PortfolioStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub creation_date: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub current_date: Option<DateTime<Utc>>,
}

/// Point-in-time capture of a portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHistory {
    pub portfolio_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub formatted_date: String,
    pub customer_id: String,
    pub portfolio: Holdings,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_update: Option<DateTime<Utc>>,
}

impl PortfolioHistory {
    /// Start of the trailing transaction window: three calendar months before
    /// the snapshot, at midnight UTC.
    pub fn three_months_before(&self) -> DateTime<Utc> {
        let shifted = self
            .timestamp
            .date_naive()
            .checked_sub_months(Months::new(3))
            .unwrap_or_else(|| self.timestamp.date_naive());
        Utc.from_utc_datetime(&shifted.and_time(chrono::NaiveTime::MIN))
    }
}
