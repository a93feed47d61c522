//! JSON fixture bundles loaded into the statement store by `eecc seed`.

use anyhow::{Context, Result};
use rusqlite::{params, Transaction as SqlTransaction};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use crate::models::{Customer, ExchangeRate, FundPrice, Portfolio, PortfolioHistory, Transaction};

/// Every record kind the store holds, as exported by the upstream services
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixtureBundle {
    pub customers: Vec<Customer>,
    pub portfolios: Vec<Portfolio>,
    pub snapshots: Vec<PortfolioHistory>,
    pub exchange_rates: Vec<ExchangeRate>,
    pub fund_prices: Vec<FundPrice>,
    /// Raw records; the `type` tag is validated when loading
    pub transactions: Vec<serde_json::Value>,
}

impl FixtureBundle {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file {:?}", path))?;
        Self::from_json(&content).with_context(|| format!("Invalid fixture file {:?}", path))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Rows written per table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub customers: usize,
    pub portfolios: usize,
    pub snapshots: usize,
    pub exchange_rates: usize,
    pub fund_prices: usize,
    pub transactions: usize,
}

pub(crate) fn write_bundle(tx: &SqlTransaction, bundle: &FixtureBundle) -> Result<SeedCounts> {
    let mut counts = SeedCounts::default();

    for customer in &bundle.customers {
        tx.execute(
            "INSERT OR REPLACE INTO customers (id, customer_type, payload) VALUES (?1, ?2, ?3)",
            params![
                customer.id,
                customer.customer_type.as_str(),
                serde_json::to_string(customer)?
            ],
        )?;
        counts.customers += 1;
    }

    for portfolio in &bundle.portfolios {
        let status = serde_json::to_value(portfolio.status)?;
        tx.execute(
            "INSERT OR REPLACE INTO portfolios
             (id, customer_id, customer_type, status, creation_date, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                portfolio.id,
                portfolio.customer_id,
                portfolio.customer_type.as_str(),
                status.as_str().unwrap_or_default(),
                portfolio.creation_date.timestamp_millis(),
                serde_json::to_string(portfolio)?
            ],
        )?;
        counts.portfolios += 1;
    }

    for snapshot in &bundle.snapshots {
        tx.execute(
            "INSERT OR REPLACE INTO portfolio_history
             (portfolio_id, timestamp, customer_id, formatted_date, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                snapshot.portfolio_id,
                snapshot.timestamp.timestamp_millis(),
                snapshot.customer_id,
                snapshot.formatted_date,
                serde_json::to_string(snapshot)?
            ],
        )?;
        counts.snapshots += 1;
    }

    for rate in &bundle.exchange_rates {
        tx.execute(
            "INSERT OR REPLACE INTO exchange_rates
             (date, formatted_date, buy_amount, buy_currency, sell_amount, sell_currency)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                rate.date.timestamp_millis(),
                rate.formatted_date,
                rate.buy.as_ref().map(|l| l.amount.to_string()),
                rate.buy.as_ref().map(|l| l.currency.code().to_string()),
                rate.sell.as_ref().map(|l| l.amount.to_string()),
                rate.sell.as_ref().map(|l| l.currency.code().to_string()),
            ],
        )?;
        counts.exchange_rates += 1;
    }

    for price in &bundle.fund_prices {
        tx.execute(
            "INSERT OR REPLACE INTO fund_history (fund_key, date, price, last_update)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                FundPrice::key(&price.id, &price.series),
                price.date.timestamp_millis(),
                price.price.to_string(),
                price.last_update.map(|d| d.timestamp_millis()),
            ],
        )?;
        counts.fund_prices += 1;
    }

    for record in &bundle.transactions {
        let transaction = Transaction::from_record(record.clone())
            .with_context(|| format!("Invalid transaction record: {}", record))?;
        tx.execute(
            "INSERT OR REPLACE INTO transactions
             (id, customer_id, transaction_type, creation_date, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                transaction.id,
                transaction.customer.id,
                transaction.transaction_type().as_str(),
                transaction.creation_date.timestamp_millis(),
                serde_json::to_string(&transaction)?
            ],
        )?;
        counts.transactions += 1;
    }

    debug!("Fixture bundle written: {:?}", counts);
    Ok(counts)
}

/// The bundled demo data set
#[cfg(test)]
pub(crate) fn sample_bundle() -> FixtureBundle {
    FixtureBundle::from_json(include_str!("../../demos/sample_statement.json"))
        .expect("demo fixture must parse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    #[test]
    fn test_sample_bundle_parses() {
        let bundle = sample_bundle();
        assert_eq!(bundle.customers.len(), 3);
        assert_eq!(bundle.portfolios.len(), 2);
        assert_eq!(bundle.snapshots.len(), 3);
        assert_eq!(bundle.transactions.len(), 7);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = store.seed(&sample_bundle()).unwrap();
        let second = store.seed(&sample_bundle()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.fund_prices, 4);
    }

    #[test]
    fn test_unknown_transaction_type_aborts_seed() {
        let bundle = FixtureBundle::from_json(
            r#"{"transactions": [{"id": "t-x", "type": "TRANSFER_IN",
                "customer": {"id": "c-1"}, "fund": {"id": "f"}, "status": "CONFIRMED",
                "amount": 1, "creationDate": 0, "transactionDate": 0}]}"#,
        )
        .unwrap();
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.seed(&bundle).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown transaction type"));
    }
}
