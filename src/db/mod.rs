// Database module - SQLite statement store

pub mod fixtures;
pub mod sources;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::EeccError;
use crate::models::{
    Customer, CustomerType, ExchangeRate, FundPrice, Period, Portfolio, PortfolioHistory,
    RateLeg, Transaction,
};
pub use fixtures::FixtureBundle;
pub use sources::{
    CustomerSource, ExchangeRateSource, FundPriceSource, PortfolioSource, SnapshotSource,
    StatementStore, TransactionSource,
};

/// Default number of transactions fetched per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Open database connection
pub fn open_db(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {:?}", db_path))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Create all tables and indexes (idempotent)
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")?;
    Ok(())
}

/// Initialize the database file with schema
pub fn init_database(db_path: &Path) -> Result<()> {
    info!("Initializing database at: {:?}", db_path);
    let conn = open_db(db_path)?;
    init_schema(&conn)?;
    info!("Database initialized successfully");
    Ok(())
}

/// SQLite-backed implementation of every statement lookup
pub struct SqliteStore {
    conn: Mutex<Connection>,
    page_size: usize,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = open_db(db_path)?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        init_schema(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Number of transactions fetched per query when draining a range
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, EeccError> {
        self.conn
            .lock()
            .map_err(|_| EeccError::Upstream("database connection lock poisoned".to_string()))
    }

    /// Load a fixture bundle in a single transaction (upserts)
    pub fn seed(&self, bundle: &FixtureBundle) -> Result<fixtures::SeedCounts> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let counts = fixtures::write_bundle(&tx, bundle)?;
        tx.commit().context("Failed to commit fixture bundle")?;
        info!(
            "Seeded {} customers, {} portfolios, {} snapshots, {} rates, {} prices, {} transactions",
            counts.customers,
            counts.portfolios,
            counts.snapshots,
            counts.exchange_rates,
            counts.fund_prices,
            counts.transactions
        );
        Ok(counts)
    }
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, EeccError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| EeccError::Upstream(format!("invalid timestamp {}", ms)))
}

/// Helper to read Decimal from SQLite (handles TEXT, INTEGER and REAL storage)
fn get_decimal_value(row: &rusqlite::Row, idx: usize) -> Result<Option<Decimal>, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) => {
            let s = std::str::from_utf8(bytes)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))?;
            Decimal::from_str(s).map(Some).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
            })
        }
        ValueRef::Integer(i) => Ok(Some(Decimal::from(i))),
        ValueRef::Real(f) => Decimal::try_from(f).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Real, Box::new(e))
        }),
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            rusqlite::types::Type::Blob,
        )),
    }
}

fn rate_leg(amount: Option<Decimal>, currency: Option<String>) -> Option<RateLeg> {
    match (amount, currency) {
        (Some(amount), Some(currency)) => Some(RateLeg {
            amount,
            currency: currency.into(),
        }),
        _ => None,
    }
}

#[async_trait]
impl CustomerSource for SqliteStore {
    async fn find_customer(&self, customer_id: &str) -> Result<Customer, EeccError> {
        let conn = self.lock()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM customers WHERE id = ?1",
                [customer_id],
                |row| row.get(0),
            )
            .optional()?;

        let payload = payload.ok_or_else(|| EeccError::not_found("customer", customer_id))?;
        Ok(serde_json::from_str(&payload)?)
    }
}

#[async_trait]
impl PortfolioSource for SqliteStore {
    async fn find_portfolio(
        &self,
        customer_id: &str,
        customer_type: CustomerType,
    ) -> Result<Portfolio, EeccError> {
        let conn = self.lock()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM portfolios
                 WHERE customer_id = ?1 AND customer_type = ?2 AND status = 'ACTIVE'
                 ORDER BY creation_date DESC
                 LIMIT 1",
                params![customer_id, customer_type.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let payload = payload.ok_or_else(|| {
            EeccError::not_found(
                "portfolio",
                format!("{} ({})", customer_id, customer_type.as_str()),
            )
        })?;
        Ok(serde_json::from_str(&payload)?)
    }
}

#[async_trait]
impl SnapshotSource for SqliteStore {
    async fn find_snapshot(
        &self,
        portfolio_id: &str,
        period: Period,
    ) -> Result<Option<PortfolioHistory>, EeccError> {
        let conn = self.lock()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM portfolio_history
                 WHERE portfolio_id = ?1 AND timestamp BETWEEN ?2 AND ?3
                 ORDER BY timestamp DESC
                 LIMIT 1",
                params![
                    portfolio_id,
                    period.start().timestamp_millis(),
                    period.end().timestamp_millis()
                ],
                |row| row.get(0),
            )
            .optional()?;

        debug!(
            "Snapshot lookup for {} in {}: {}",
            portfolio_id,
            period,
            if payload.is_some() { "found" } else { "absent" }
        );

        payload
            .map(|p| serde_json::from_str(&p).map_err(EeccError::from))
            .transpose()
    }
}

#[async_trait]
impl ExchangeRateSource for SqliteStore {
    async fn find_rate(&self, at: DateTime<Utc>) -> Result<ExchangeRate, EeccError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT date, formatted_date, buy_amount, buy_currency, sell_amount, sell_currency
                 FROM exchange_rates
                 WHERE date <= ?1
                 ORDER BY date DESC
                 LIMIT 1",
                [at.timestamp_millis()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        get_decimal_value(row, 2)?,
                        row.get::<_, Option<String>>(3)?,
                        get_decimal_value(row, 4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        let (date, formatted_date, buy_amount, buy_currency, sell_amount, sell_currency) = row
            .ok_or_else(|| EeccError::not_found("exchange rate", at.format("%Y-%m-%d").to_string()))?;

        Ok(ExchangeRate {
            date: millis_to_datetime(date)?,
            formatted_date,
            buy: rate_leg(buy_amount, buy_currency),
            sell: rate_leg(sell_amount, sell_currency),
        })
    }
}

#[async_trait]
impl FundPriceSource for SqliteStore {
    async fn find_price(
        &self,
        fund_id: &str,
        series: &str,
        at: DateTime<Utc>,
    ) -> Result<FundPrice, EeccError> {
        let key = FundPrice::key(fund_id, series);
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT date, price, last_update FROM fund_history
                 WHERE fund_key = ?1 AND date <= ?2
                 ORDER BY date DESC
                 LIMIT 1",
                params![key, at.timestamp_millis()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        get_decimal_value(row, 1)?,
                        row.get::<_, Option<i64>>(2)?,
                    ))
                },
            )
            .optional()?;

        let not_found = || {
            EeccError::not_found(
                "fund price",
                format!("{} at {}", key, at.format("%Y-%m-%d")),
            )
        };
        let (date, price, last_update) = row.ok_or_else(not_found)?;

        Ok(FundPrice {
            id: fund_id.to_string(),
            series: series.to_string(),
            date: millis_to_datetime(date)?,
            price: price.ok_or_else(not_found)?,
            last_update: last_update.map(millis_to_datetime).transpose()?,
        })
    }
}

#[async_trait]
impl TransactionSource for SqliteStore {
    async fn find_transactions(
        &self,
        customer_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, EeccError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT payload FROM transactions
             WHERE customer_id = ?1
               AND creation_date BETWEEN ?2 AND ?3
               AND transaction_type IN ('BUY', 'SELL')
             ORDER BY creation_date ASC, id ASC
             LIMIT ?4 OFFSET ?5",
        )?;

        let mut transactions = Vec::new();
        let mut offset = 0usize;
        loop {
            let page = stmt
                .query_map(
                    params![
                        customer_id,
                        start.timestamp_millis(),
                        end.timestamp_millis(),
                        self.page_size as i64,
                        offset as i64
                    ],
                    |row| row.get::<_, String>(0),
                )?
                .collect::<Result<Vec<_>, _>>()?;

            let fetched = page.len();
            for payload in page {
                let record: serde_json::Value = serde_json::from_str(&payload)?;
                transactions.push(Transaction::from_record(record)?);
            }
            debug!("Fetched transaction page at offset {} ({} rows)", offset, fetched);

            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }

        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::sample_bundle;
    use rust_decimal_macros::dec;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.seed(&sample_bundle()).unwrap();
        store
    }

    #[tokio::test]
    async fn test_customer_lookup() {
        let store = seeded();
        let customer = store.find_customer("c-100").await.unwrap();
        assert_eq!(customer.main_identity_document_number().as_deref(), Some("DNI 45678912"));

        let err = store.find_customer("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_portfolio_lookup_respects_customer_type() {
        let store = seeded();
        let portfolio = store
            .find_portfolio("c-100", CustomerType::Individual)
            .await
            .unwrap();
        assert_eq!(portfolio.id, "p-100");

        let err = store
            .find_portfolio("c-100", CustomerType::Business)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_snapshot_lookup_picks_latest_in_month() {
        let store = seeded();
        let october = Period::new(2025, 10).unwrap();
        let snapshot = store.find_snapshot("p-100", october).await.unwrap().unwrap();
        assert_eq!(snapshot.formatted_date, "2025-10-31");

        let august = Period::new(2025, 8).unwrap();
        assert!(store.find_snapshot("p-100", august).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_lookup_uses_nearest_earlier_date() {
        let store = seeded();
        let at = Period::new(2025, 10).unwrap().end();
        let rate = store.find_rate(at).await.unwrap();
        assert_eq!(rate.formatted_date, "2025-10-31");
        assert_eq!(rate.buy.map(|l| l.amount), Some(dec!(3.53)));

        let far_past = Period::new(2001, 1).unwrap().end();
        assert!(store.find_rate(far_past).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_price_lookup() {
        let store = seeded();
        let at = Period::new(2025, 10).unwrap().end();
        let price = store.find_price("usa500USD", "SERIES_B", at).await.unwrap();
        assert_eq!(price.price, dec!(11));

        let err = store.find_price("unknown", "", at).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_transaction_range_drains_all_pages() {
        let store = seeded().with_page_size(2);
        let start = Period::new(2025, 7).unwrap().start();
        let end = Period::new(2025, 10).unwrap().end();
        let transactions = store.find_transactions("c-100", start, end).await.unwrap();
        assert_eq!(transactions.len(), 5);
        assert!(transactions
            .windows(2)
            .all(|w| w[0].creation_date <= w[1].creation_date));
    }
}
