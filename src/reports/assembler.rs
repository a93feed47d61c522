//! Statement assembly: gathers every record a statement needs from the store.

use anyhow::Context;
use tracing::{debug, info, warn};

use super::profitability;
use crate::db::StatementStore;
use crate::error::{EeccError, Result};
use crate::models::{
    Fund, FundResume, Period, PortfolioHistory, Statement, PROFITABILITY_UNAVAILABLE,
};

/// Assemble the statement of `customer_id` for `period`.
///
/// Customer, portfolio, target-month snapshot and exchange rate are required;
/// a missing one aborts with [`EeccError::NotFound`] in the error chain. The
/// prior-month snapshot is optional. Per-fund profitability failures only
/// degrade the affected cell.
pub async fn assemble<S>(store: &S, customer_id: &str, period: Period) -> Result<Statement>
where
    S: StatementStore + ?Sized,
{
    info!("Assembling statement for {} ({})", customer_id, period);

    let customer = store
        .find_customer(customer_id)
        .await
        .context("Failed to load customer")?;

    let portfolio = store
        .find_portfolio(&customer.id, customer.customer_type)
        .await
        .context("Failed to load portfolio")?;

    let prior = period.prior();
    let (current_snapshot, prior_snapshot, exchange_rate) = tokio::try_join!(
        store.find_snapshot(&portfolio.id, period),
        store.find_snapshot(&portfolio.id, prior),
        store.find_rate(period.end()),
    )
    .context("Failed to load snapshots and exchange rate")?;

    let current_snapshot = current_snapshot
        .ok_or_else(|| EeccError::not_found("snapshot", format!("{} {}", portfolio.id, period)))
        .context("Failed to load snapshots and exchange rate")?;

    if prior_snapshot.is_none() {
        debug!("No snapshot for {} in {}, prior positions omitted", portfolio.id, prior);
    }

    let transactions = store
        .find_transactions(
            &customer.id,
            current_snapshot.three_months_before(),
            period.end(),
        )
        .await
        .context("Failed to load transactions")?;
    debug!("Loaded {} transactions", transactions.len());

    let resume = build_resume(store, &current_snapshot, period).await;

    Ok(Statement {
        period,
        customer,
        portfolio,
        current_snapshot,
        prior_snapshot,
        exchange_rate,
        transactions,
        resume,
    })
}

/// One resume row per invested fund of the snapshot, in portfolio order
async fn build_resume<S>(store: &S, snapshot: &PortfolioHistory, period: Period) -> Vec<FundResume>
where
    S: StatementStore + ?Sized,
{
    let mut resume = Vec::new();
    for fund in snapshot.portfolio.invested_funds() {
        let profitability = match fund_profitability(store, fund, period).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Profitability unavailable for {}: {}", fund.display_id(), e);
                PROFITABILITY_UNAVAILABLE.to_string()
            }
        };

        resume.push(FundResume {
            name: fund.display_id(),
            currency: fund.balance.currency.clone(),
            saves: fund.balance.amount,
            contribution: fund.cost_basis.unwrap_or_default(),
            profitability,
        });
    }
    resume
}

/// Return between the last price of the prior month and the last price of `period`
async fn fund_profitability<S>(
    store: &S,
    fund: &Fund,
    period: Period,
) -> std::result::Result<String, EeccError>
where
    S: StatementStore + ?Sized,
{
    let series = fund.series.as_deref().unwrap_or_default();
    let (end, start) = tokio::try_join!(
        store.find_price(&fund.id, series, period.end()),
        store.find_price(&fund.id, series, period.prior().end()),
    )?;
    profitability::format_return(end.price, start.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::sample_bundle;
    use crate::db::SqliteStore;
    use rust_decimal_macros::dec;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.seed(&sample_bundle()).unwrap();
        store
    }

    #[tokio::test]
    async fn test_assemble_october() {
        let store = store();
        let statement = assemble(&store, "c-100", Period::new(2025, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(statement.current_snapshot.formatted_date, "2025-10-31");
        assert_eq!(
            statement.prior_snapshot.as_ref().map(|s| s.formatted_date.as_str()),
            Some("2025-09-30")
        );
        assert_eq!(statement.exchange_rate.formatted_date, "2025-10-31");
        assert_eq!(statement.transactions.len(), 5);

        assert_eq!(statement.resume.len(), 2);
        let usa = &statement.resume[0];
        assert_eq!(usa.name, "usa500USD SERIES_B");
        assert_eq!(usa.saves, dec!(1100));
        assert_eq!(usa.contribution, dec!(1000));
        assert_eq!(usa.profitability, "10.00%");
        assert_eq!(statement.resume[1].profitability, "2.18%");
    }

    #[tokio::test]
    async fn test_missing_prior_price_degrades_to_unavailable() {
        let store = store();
        // September has a snapshot but no August prices
        let statement = assemble(&store, "c-100", Period::new(2025, 9).unwrap())
            .await
            .unwrap();
        assert!(statement.prior_snapshot.is_none());
        assert!(statement
            .resume
            .iter()
            .all(|r| r.profitability == PROFITABILITY_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_missing_snapshot_aborts() {
        let store = store();
        let err = assemble(&store, "c-200", Period::new(2025, 10).unwrap())
            .await
            .unwrap_err();
        let inner = err.downcast_ref::<EeccError>().unwrap();
        assert!(inner.is_not_found());
    }

    #[tokio::test]
    async fn test_customer_without_portfolio_aborts() {
        let store = store();
        let err = assemble(&store, "c-300", Period::new(2025, 10).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load portfolio"));
        assert!(matches!(
            err.downcast_ref::<EeccError>(),
            Some(EeccError::NotFound {
                entity: "portfolio",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_unknown_customer_aborts() {
        let store = store();
        let err = assemble(&store, "nobody", Period::new(2025, 10).unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load customer"));
        assert!(err.downcast_ref::<EeccError>().unwrap().is_not_found());
    }
}
